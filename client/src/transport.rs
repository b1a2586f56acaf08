//! HTTP transport for the LoginLlama API.

use crate::error::{LoginLlamaError, Result};
use serde_json::Value;
use std::future::Future;

/// Base endpoint for the hosted LoginLlama API.
pub const API_ENDPOINT: &str = "https://loginllama.app/api/v1";

/// Header carrying the caller's API key.
const API_KEY_HEADER: &str = "X-API-KEY";
/// Header identifying the SDK flavor to the service.
const SOURCE_HEADER: &str = "X-LOGINLLAMA-SOURCE";
/// Header identifying the SDK wire version.
const VERSION_HEADER: &str = "X-LOGINLLAMA-VERSION";

const SDK_SOURCE: &str = "rust-sdk";
const SDK_VERSION: &str = "1";

/// Wire-level operations the client performs against the remote API.
///
/// Implementations must attach the JSON content type, the API key header,
/// and the SDK identification headers, and must fail with a transport
/// error on network failure or on any HTTP status >= 400. The client adds
/// no retry, backoff, or timeout policy of its own on top of this trait.
pub trait Transport: Send + Sync {
    /// Issue a GET against `path`, relative to the transport's base URL.
    ///
    /// # Errors
    ///
    /// Returns [`LoginLlamaError::RequestFailed`] on network failure and
    /// [`LoginLlamaError::ApiError`] on an HTTP status >= 400.
    fn get(&self, path: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Issue a POST with a JSON body against `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoginLlamaError::RequestFailed`] on network failure and
    /// [`LoginLlamaError::ApiError`] on an HTTP status >= 400.
    fn post(&self, path: &str, body: &Value) -> impl Future<Output = Result<Value>> + Send;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpTransport {
    /// Transport against the hosted endpoint.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, API_ENDPOINT.to_string())
    }

    /// Transport against a custom endpoint (self-hosted deployments, test
    /// servers).
    #[must_use]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        body: Option<&Value>,
    ) -> Result<Value> {
        // Default headers go on first; `json` only inserts a Content-Type
        // when none is present, so the header is never duplicated.
        let mut request = request
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .header(SOURCE_HEADER, SDK_SOURCE)
            .header(VERSION_HEADER, SDK_VERSION);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoginLlamaError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "api returned error status");
            return Err(LoginLlamaError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LoginLlamaError::RequestFailed(e.to_string()))?;

        // An undecodable success body decodes to null; the response
        // normalizer passes it through rather than raising.
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        self.execute(self.client.get(format!("{}{path}", self.base_url)), None)
            .await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(
            self.client.post(format!("{}{path}", self.base_url)),
            Some(body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_targets_hosted_endpoint() {
        let transport = HttpTransport::new("key".to_string());
        assert_eq!(transport.base_url, API_ENDPOINT);
        assert_eq!(transport.api_key, "key");
    }
}
