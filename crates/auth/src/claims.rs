use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use wisal_core::{EmployeeId, InstitutionId};

use crate::Role;
use crate::codec::decode_payload;

/// Claims lifted out of a bearer token **without signature verification**.
///
/// This is an advisory hint for UI concerns (which screen to land on, which
/// menu entries to show). It is deliberately a distinct type from anything
/// identity-shaped so it can never be mistaken for a verified principal;
/// the server re-checks every request on its side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnverifiedClaims {
    /// Subject claim (`sub`) — the employee identifier.
    pub subject: Option<EmployeeId>,

    /// Role claim, strictly parsed; unknown values collapse to `None`.
    pub role: Option<Role>,

    /// Institution the subject belongs to (`institutionId`).
    pub institution_id: Option<InstitutionId>,

    /// Issued-at (`iat`), epoch seconds.
    pub issued_at: Option<i64>,

    /// Expiration (`exp`), epoch seconds.
    pub expires_at: Option<i64>,
}

impl UnverifiedClaims {
    /// Extract claims from a bearer token, or `None` if the payload cannot
    /// be decoded at all. Individual missing/invalid claims are simply
    /// absent from the result.
    pub fn from_token(token: &str) -> Option<Self> {
        decode_payload(token).map(|payload| Self::from_payload(&payload))
    }

    /// Typed view over an already-decoded payload map.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            subject: non_empty_str(payload.get("sub"))
                .and_then(|raw| EmployeeId::new(raw).ok()),
            role: payload
                .get("role")
                .and_then(Value::as_str)
                .and_then(Role::parse),
            institution_id: non_empty_str(payload.get("institutionId"))
                .and_then(|raw| InstitutionId::new(raw).ok()),
            issued_at: payload.get("iat").and_then(Value::as_i64),
            expires_at: payload.get("exp").and_then(Value::as_i64),
        }
    }

    /// Whether the token's advisory expiry has passed.
    ///
    /// UI-only: an expired hint is still applied (the server is the judge);
    /// callers may use this for logging or proactive refresh.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now.timestamp() >= exp)
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;

    fn mint(claims: &Value) -> String {
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("header.{payload}.signature")
    }

    #[test]
    fn lifts_known_claims() {
        let token = mint(&serde_json::json!({
            "sub": "emp-1",
            "role": "ADMIN",
            "institutionId": "inst-9",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
        }));

        let claims = UnverifiedClaims::from_token(&token).unwrap();
        assert_eq!(claims.subject.unwrap().as_str(), "emp-1");
        assert_eq!(claims.role, Some(Role::Admin));
        assert_eq!(claims.institution_id.unwrap().as_str(), "inst-9");
        assert_eq!(claims.issued_at, Some(1_700_000_000));
        assert_eq!(claims.expires_at, Some(1_700_003_600));
    }

    #[test]
    fn unknown_role_and_empty_strings_are_absent() {
        let token = mint(&serde_json::json!({
            "sub": "",
            "role": "SUPERADMIN",
            "institutionId": "",
        }));

        let claims = UnverifiedClaims::from_token(&token).unwrap();
        assert_eq!(claims.subject, None);
        assert_eq!(claims.role, None);
        assert_eq!(claims.institution_id, None);
    }

    #[test]
    fn undecodable_token_yields_none() {
        assert!(UnverifiedClaims::from_token("not-a-token").is_none());
    }

    #[test]
    fn expiry_is_advisory_epoch_seconds() {
        let claims = UnverifiedClaims {
            expires_at: Some(1_700_000_000),
            ..Default::default()
        };

        let before = Utc.timestamp_opt(1_699_999_999, 0).unwrap();
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(!claims.is_expired(before));
        assert!(claims.is_expired(at));

        // No exp claim: never reported expired.
        assert!(!UnverifiedClaims::default().is_expired(at));
    }
}
