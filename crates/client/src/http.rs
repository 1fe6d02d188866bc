//! The single outgoing channel to the Wisal API.
//!
//! One shared client carries the fixed locale header, the in-memory bearer
//! credential, cookie transmission (the silent-refresh session rides on a
//! cookie), and a fresh correlation id per request. Responses are
//! normalized into [`ApiError`]; a 401 clears the credential before the
//! error is surfaced, so subsequent requests go out bare.

use std::sync::{Arc, RwLock};

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::config::{ClientConfig, LOCALE};
use crate::error::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared HTTP client for every API call the dashboard makes.
///
/// Cloning is cheap and all clones share one credential slot, so a 401 on
/// any path disarms every clone at once.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(LOCALE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.base_url.clone(),
            credential: Arc::new(RwLock::new(None)),
        }
    }

    /// Install or remove the bearer credential.
    ///
    /// This slot is the only place the credential lives and the request
    /// path below is the only place it is transmitted; it is never written
    /// to durable storage. `None` removes the header entirely.
    pub fn set_credential(&self, token: Option<String>) {
        *self.credential.write().unwrap() = token;
    }

    pub fn has_credential(&self) -> bool {
        self.credential.read().unwrap().is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST with no body (the refresh and logout endpoints).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            // The locale is fixed; re-setting it here keeps the wrapper in
            // control even if a default header was ever displaced.
            .header(ACCEPT_LANGUAGE, LOCALE);

        let credential = self.credential.read().unwrap().clone();
        if let Some(token) = credential {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|error| {
            tracing::debug!(%error, "request did not reach the server");
            ApiError::Unreachable
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|error| {
            tracing::debug!(%error, "response body could not be read");
            ApiError::Unreachable
        })?;

        if status.is_success() {
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)
                    .map_err(|error| ApiError::Decode(error.to_string()))?
            };
            return serde_json::from_value(value)
                .map_err(|error| ApiError::Decode(error.to_string()));
        }

        if status == StatusCode::UNAUTHORIZED {
            // Expired/revoked session: disarm the credential so requests
            // that follow go out without it. In-flight requests that
            // already carry the old header are not retried or cancelled.
            self.set_credential(None);
            tracing::debug!("credential cleared after 401");
        }

        let payload: Option<Value> = serde_json::from_slice(&bytes).ok();
        Err(ApiError::rejected(status.as_u16(), payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_slot_is_shared_across_clones() {
        let client = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9"));
        let clone = client.clone();

        assert!(!client.has_credential());
        clone.set_credential(Some("token".into()));
        assert!(client.has_credential());
        client.set_credential(None);
        assert!(!clone.has_credential());
    }
}
