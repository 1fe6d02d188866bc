//! Client configuration.

/// Locale stamped on every outgoing request (`Accept-Language`).
///
/// The dashboard is an Arabic-language product; the value is fixed rather
/// than negotiated, and the request layer always controls the header.
pub const LOCALE: &str = "ar";

/// Environment variable naming the API base URL.
pub const API_URL_VAR: &str = "WISAL_API_URL";

const DEV_API_URL: &str = "http://127.0.0.1:8080";

/// Configuration for the shared API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is joined onto (no trailing slash).
    pub base_url: String,
}

impl ClientConfig {
    /// Configuration pointing at an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Configuration from the environment (`WISAL_API_URL`).
    ///
    /// Falls back to the local development API with a logged warning.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| {
            tracing::warn!("{API_URL_VAR} not set; using local dev default");
            DEV_API_URL.to_string()
        });
        Self::new(base_url)
    }
}
