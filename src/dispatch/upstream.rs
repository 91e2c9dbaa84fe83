//! Gateway to the remote extraction API.
//!
//! The API is a JSON-over-HTTP service that does the actual yt-dlp work:
//! `/extract` returns the tweet's rendition metadata, `/download-with-audio`
//! returns the merged file as a base64 payload. Errors arrive as a non-200
//! status with an `error` string in the body.

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::core::config;

/// Errors talking to the extraction API. Display strings are what the
/// dispatcher forwards to the widget when it has nothing better.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Could not reach the API at all
    #[error("Failed to connect to video service")]
    Connection(String),

    /// The API answered non-200; the payload is its error message
    #[error("{0}")]
    Api(String),

    /// The API answered 200 with a body that is not JSON
    #[error("Invalid response from video service")]
    Malformed,
}

/// HTTP client for the extraction API.
#[derive(Debug, Clone)]
pub struct ExtractorApi {
    http: reqwest::Client,
    base_url: String,
}

impl ExtractorApi {
    /// Gateway for the configured API base URL.
    pub fn from_env() -> Self {
        Self::new(config::API_BASE_URL.clone())
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if let Err(err) = Url::parse(&base_url) {
            log::warn!("Invalid extraction API base URL {:?}: {}", base_url, err);
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Fetches the rendition metadata for a tweet URL.
    pub async fn extract(&self, url: &str) -> Result<Value, UpstreamError> {
        self.post_json(
            "/extract",
            json!({ "url": url }),
            config::network::extract_timeout(),
            "Failed to extract video",
        )
        .await
    }

    /// Downloads one rendition; the response carries the file as base64.
    pub async fn download(&self, url: &str, quality: &str, video_number: u32) -> Result<Value, UpstreamError> {
        self.post_json(
            "/download-with-audio",
            json!({
                "url": url,
                "quality": quality,
                "video_number": video_number,
            }),
            config::network::download_timeout(),
            "Download failed",
        )
        .await
    }

    async fn post_json(
        &self,
        path: &str,
        body: Value,
        timeout: Duration,
        fallback_error: &str,
    ) -> Result<Value, UpstreamError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&endpoint)
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::Connection(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Connection(e.to_string()))?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(|body| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or(fallback_error)
                .to_string();
            log::warn!("extraction API {} answered {}: {}", endpoint, status, message);
            return Err(UpstreamError::Api(message));
        }

        parsed.ok_or(UpstreamError::Malformed)
    }
}
