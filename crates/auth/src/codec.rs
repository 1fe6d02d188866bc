//! Unverified bearer-token payload extraction.
//!
//! The dashboard never verifies token signatures (the server does); this
//! module only lifts the embedded claims out of the middle segment so the
//! UI can route by role. Every failure mode collapses to `None`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

/// Decode the claims payload of a three-segment bearer token.
///
/// Returns the payload as a generic JSON object map, or `None` when the
/// token has the wrong segment count, the payload is not valid base64url,
/// not valid UTF-8 JSON, or not a JSON object. Never panics.
pub fn decode_payload(token: &str) -> Option<Map<String, Value>> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };

    let bytes = decode_segment(payload)?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Base64url-decode one token segment.
///
/// Tokens normally use the unpadded url-safe alphabet; segments minted with
/// the standard alphabet or with padding are normalized before decoding.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let normalized = segment
        .trim_end_matches('=')
        .replace('+', "-")
        .replace('/', "_");
    URL_SAFE_NO_PAD.decode(normalized.as_bytes()).ok()
}
