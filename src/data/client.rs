//! HTTP client for the Grok SDR backend
//!
//! Wraps reqwest with the backend's base URL and turns transport failures,
//! non-2xx responses and unexpected bodies into [`ApiError`].

use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Backend address used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, ...
    #[error("Failed to connect to server: {0}")]
    Connection(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Request failed with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The body did not match the expected shape
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend reported a failure inside a 2xx response
    #[error("{0}")]
    Rejected(String),

    /// The HTTP client could not be built
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Short message suitable for an inline error in the UI
    ///
    /// Server-provided details win over generic text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Connection(_) => "Failed to connect to server".to_string(),
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Status {
                status,
                detail: None,
            } => format!("Request failed with status {}", status),
            ApiError::Decode(_) => "Unexpected response from server".to_string(),
            ApiError::Rejected(message) => message.clone(),
            ApiError::Config(message) => message.clone(),
        }
    }
}

/// Error body returned by the backend (`{"detail": ...}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Extracts a human readable detail from an error body
///
/// `detail` is usually a string, but validation failures return a list of
/// `{loc, msg}` objects.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Client for the lead management REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::with_client(Client::new(), DEFAULT_API_URL)
    }
}

impl ApiClient {
    /// Creates a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).timeout(self.timeout)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).timeout(self.timeout)
    }

    pub(crate) fn patch(&self, path: &str) -> RequestBuilder {
        self.http.patch(self.url(path)).timeout(self.timeout)
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path)).timeout(self.timeout)
    }

    /// Sends a request and returns the raw body of a successful response
    async fn send_text(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!("Backend request failed: {}", e);
            ApiError::Connection(e)
        })?;

        let status = response.status();
        let url = response.url().clone();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = extract_detail(&text);
            warn!("{} returned {}: {:?}", url, status, detail);
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        debug!("{} returned {} ({} bytes)", url, status, text.len());
        Ok(text)
    }

    /// Sends a request and decodes a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = self.send_text(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sends a request whose body is not needed
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send_text(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Lead not found"}"#).as_deref(),
            Some("Lead not found")
        );
    }

    #[test]
    fn test_extract_detail_validation_list() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "field required"},
            {"loc": ["body", "company"], "msg": "field required"}
        ]}"#;

        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn test_extract_detail_missing_or_garbage() {
        assert!(extract_detail("Internal Server Error").is_none());
        assert!(extract_detail(r#"{"error": "x"}"#).is_none());
        assert!(extract_detail(r#"{"detail": ""}"#).is_none());
    }

    #[test]
    fn test_user_message_prefers_server_detail() {
        let with_detail = ApiError::Status {
            status: 400,
            detail: Some("Email already exists".to_string()),
        };
        let without_detail = ApiError::Status {
            status: 500,
            detail: None,
        };

        assert_eq!(with_detail.user_message(), "Email already exists");
        assert_eq!(
            without_detail.user_message(),
            "Request failed with status 500"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/leads"), "http://localhost:8000/leads");
    }
}
