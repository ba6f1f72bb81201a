//! Analyzer backed by the HTTP analysis service.

use super::{AnalysisError, Analyzer};
use crate::ingest::ImageData;
use crate::record::Record;
use analyst::{AnalyzeRequest, Analyst};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct RemoteAnalyzer {
    client: Analyst,
}

impl RemoteAnalyzer {
    pub fn new(client: Analyst) -> Self {
        Self { client }
    }

    /// Connect to `endpoint`, optionally authenticating with `api_key`.
    pub fn connect(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, AnalysisError> {
        let mut client = Analyst::new(endpoint)?;
        if let Some(key) = api_key {
            client = client.with_api_key(key);
        }
        Ok(Self::new(client))
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    async fn analyze(&self, text: &str, image: Option<&ImageData>) -> Result<Record, AnalysisError> {
        let mut request = AnalyzeRequest::new(text);
        if let Some(image) = image {
            request = request.with_image(image.data_url.clone());
        }

        tracing::debug!(endpoint = self.endpoint(), has_image = image.is_some(), "remote analysis");
        let payload = self.client.analyze(&request).await?;
        let record = Record::from_payload(&payload)
            .ok_or_else(|| AnalysisError::Malformed("response is not a JSON object".to_string()))?;
        Ok(record)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
