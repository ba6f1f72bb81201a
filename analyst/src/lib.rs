//! Minimal client for the material analysis service.
//!
//! The service takes a text fragment and an optional base64 image and
//! answers with one JSON object per worldbuilding category:
//!
//! ```text
//! POST {endpoint}
//! { "text": "...", "image": "data:image/png;base64,...", "categories": [...] }
//!
//! 200 OK
//! { "character": {...}, "worldview": {...}, "geography": {...}, "items": {...} }
//! ```
//!
//! The client does not interpret the categories; callers map the returned
//! object onto their own record types.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Categories requested when the caller does not narrow them.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["character", "worldview", "geography", "items"];

const ENDPOINT_VAR: &str = "COSMO_ANALYZER_URL";
const API_KEY_VAR: &str = "COSMO_ANALYZER_KEY";

/// Errors that can occur when using the analysis client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Analysis endpoint not configured")]
    NoEndpoint,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Analysis service client.
#[derive(Clone)]
pub struct Analyst {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for Analyst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyst")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Analyst {
    /// Create a client for the given endpoint with the default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, Error> {
        Self::with_timeouts(endpoint, Duration::from_secs(120), Duration::from_secs(30))
    }

    /// Create a client with explicit request and connect timeouts.
    pub fn with_timeouts(
        endpoint: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, Error> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(Error::NoEndpoint);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: None,
        })
    }

    /// Create a client from `COSMO_ANALYZER_URL` and, if set, `COSMO_ANALYZER_KEY`.
    pub fn from_env() -> Result<Self, Error> {
        let endpoint = std::env::var(ENDPOINT_VAR).map_err(|_| Error::NoEndpoint)?;
        let client = Self::new(endpoint)?;
        Ok(match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.is_empty() => client.with_api_key(key),
            _ => client,
        })
    }

    /// Send requests with a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The endpoint requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit material for analysis and return the raw category object.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<serde_json::Value, Error> {
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        if !body.is_object() {
            return Err(Error::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&body)
            )));
        }

        Ok(body)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
            );
        }
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// Body of an analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Base64 data URL of an attached image.
    pub image: Option<String>,
    pub categories: Vec<String>,
}

impl AnalyzeRequest {
    /// Create a request for all default categories.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_image(mut self, data_url: impl Into<String>) -> Self {
        self.image = Some(data_url.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Analyst::new("http://localhost:9000/v1/analyze").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/analyze");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        assert!(matches!(Analyst::new("  "), Err(Error::NoEndpoint)));
    }

    #[test]
    fn test_bearer_header() {
        let client = Analyst::new("http://localhost/analyze")
            .unwrap()
            .with_api_key("secret");
        let headers = client.build_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = Analyst::new("http://localhost/analyze")
            .unwrap()
            .with_api_key("secret");
        let printed = format!("{client:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_request_shape() {
        let request = AnalyzeRequest::new("A frozen forest").with_image("data:image/png;base64,AAAA");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "A frozen forest");
        assert_eq!(json["image"], "data:image/png;base64,AAAA");
        assert_eq!(json["categories"].as_array().unwrap().len(), 4);
        assert_eq!(json["categories"][3], "items");
    }

    #[test]
    fn test_request_without_image_serializes_null() {
        let request = AnalyzeRequest::new("text only").with_categories(["character"]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["image"].is_null());
        assert_eq!(json["categories"], serde_json::json!(["character"]));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = Analyst::with_timeouts(
            "http://127.0.0.1:9/analyze",
            Duration::from_secs(2),
            Duration::from_secs(1),
        )
        .unwrap();
        let result = client.analyze(&AnalyzeRequest::new("hello")).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
