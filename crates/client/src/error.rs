//! Normalized API error shape.
//!
//! Every failure leaving the HTTP layer is one of these; callers never see
//! raw transport errors.

use serde_json::Value;
use thiserror::Error;

/// Fixed user-facing message when no response reached the client at all.
pub const UNREACHABLE_MESSAGE: &str = "تعذر الاتصال بالخادم";

/// Fixed fallback when an error response carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "حدث خطأ ما";

/// Error surfaced by every [`crate::ApiClient`] request.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// No response reached the client (DNS, connect, TLS, I/O failure).
    /// Carries no status code.
    #[error("تعذر الاتصال بالخادم")]
    Unreachable,

    /// The server answered with a non-success status. `message` is the
    /// best human-readable text the body offered; `payload` is the raw
    /// body for callers needing structured detail.
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// A success response carried a body this client could not decode.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Normalize an error response from its status and optional JSON body.
    ///
    /// The human message is the first non-empty string among the body's
    /// `message`, `error`, and `title` fields, falling back to a fixed
    /// generic localized string.
    pub fn rejected(status: u16, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|body| {
                ["message", "error", "title"]
                    .iter()
                    .filter_map(|field| body.get(*field))
                    .filter_map(Value::as_str)
                    .find(|text| !text.is_empty())
            })
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string();

        Self::Rejected {
            status,
            message,
            payload,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Unreachable | ApiError::Decode(_) => None,
        }
    }

    /// The human-readable message for inline display.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Raw server payload, when one was received.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Rejected { payload, .. } => payload.as_ref(),
            ApiError::Unreachable | ApiError::Decode(_) => None,
        }
    }
}
