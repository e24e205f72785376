//! Conversion service HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ConvertRequest, ConvertResponse};

/// Configuration for the conversion client.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Base URL of the conversion service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl ConvertConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CONVERT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            timeout: Duration::from_secs(
                std::env::var("CONVERT_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

/// Client for the document-to-PDF conversion service.
#[derive(Clone)]
pub struct ConvertClient {
    http: Client,
    config: ConvertConfig,
}

impl ConvertClient {
    /// Create a new conversion client.
    pub fn new(config: ConvertConfig) -> ConvertResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConvertError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ConvertResult<Self> {
        Self::new(ConvertConfig::from_env())
    }

    /// Convert an office document to PDF.
    ///
    /// One synchronous call per request; any retrying is the service's
    /// own business.
    pub async fn convert(&self, request: &ConvertRequest) -> ConvertResult<ConvertResponse> {
        let url = format!("{}/convert", self.config.base_url);
        debug!("Sending conversion request for {} to {}", request.key, url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ConvertError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ConvertError::RequestFailed(format!(
                "Conversion service returned {}: {}",
                status, body
            )));
        }

        let converted: ConvertResponse = response
            .json()
            .await
            .map_err(|e| ConvertError::InvalidResponse(e.to_string()))?;

        Ok(converted)
    }
}
