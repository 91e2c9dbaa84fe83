//! Extraction workflow: turn a tweet URL into the set of renditions the
//! remote extractor knows about.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::core::config;
use crate::core::validation::{validate_tweet_url, ValidationError};
use crate::widget::events::{EventSink, WidgetEvent};
use crate::widget::transport::{actions, Dispatch, TransportError};

/// Tweet-level metadata returned by the extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TweetInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
}

/// One downloadable quality variant of a source video.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormatVariant {
    /// Free-form quality label as reported by the extractor (e.g. "720p")
    pub quality: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Container / format tag (e.g. "mp4")
    #[serde(default)]
    pub format: Option<String>,
    /// Human-readable size label; the extractor sends a string, a number
    /// of bytes, or nothing depending on what it learned upstream
    #[serde(default, deserialize_with = "size_label")]
    pub filesize: Option<String>,
}

/// One source video within a tweet. A single tweet can carry several.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceVideo {
    #[serde(default)]
    pub thumbnail: String,
    /// Duration in seconds, fractional
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub video_formats: Vec<FormatVariant>,
}

/// Result of a successful extract call.
///
/// `videos` is required: a success payload without the field is a
/// malformed response, while an explicit empty array is the valid
/// "tweet has no renditions" answer. The two must stay distinguishable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub tweet_info: Option<TweetInfo>,
    pub videos: Vec<SourceVideo>,
}

/// Accepts a string, a number, or nothing for the size field. Zero and the
/// empty string mean "unknown" upstream and collapse to `None` so the
/// catalog never renders them.
fn size_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        Some(Value::Number(number)) => match number.as_u64() {
            Some(0) | None => None,
            Some(bytes) => Some(bytes.to_string()),
        },
        _ => None,
    })
}

/// Errors from the extraction workflow.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Success envelope whose payload does not match the extract schema
    #[error("Invalid response from video service")]
    MalformedResponse,
}

/// Client-side extraction workflow.
///
/// Validates the URL before any network traffic, then asks the dispatcher
/// for the tweet's renditions. Loading signals bracket the network call on
/// every path so the surface can disable input and show a spinner.
pub struct ExtractWorkflow<D: Dispatch> {
    transport: Arc<D>,
    events: Arc<dyn EventSink>,
}

impl<D: Dispatch> ExtractWorkflow<D> {
    pub fn new(transport: Arc<D>, events: Arc<dyn EventSink>) -> Self {
        Self { transport, events }
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, ExtractError> {
        let url = match validate_tweet_url(url) {
            Ok(url) => url,
            Err(err) => {
                self.events.emit(WidgetEvent::error(err.to_string()));
                return Err(err.into());
            }
        };

        self.events.emit(WidgetEvent::LoadingStarted);
        let outcome = self
            .transport
            .call(
                actions::EXTRACT_VIDEO,
                &[("url", url.to_string())],
                config::network::extract_timeout(),
            )
            .await;
        self.events.emit(WidgetEvent::LoadingFinished);

        let payload = match outcome {
            Ok(payload) => payload,
            Err(err) => {
                self.events.emit(WidgetEvent::error(err.to_string()));
                return Err(err.into());
            }
        };

        match serde_json::from_value::<ExtractionResult>(payload) {
            Ok(result) => {
                log::info!("extracted {} video(s) for {}", result.videos.len(), url);
                self.events
                    .emit(WidgetEvent::success("Video information extracted successfully!"));
                Ok(result)
            }
            Err(_) => {
                let err = ExtractError::MalformedResponse;
                self.events.emit(WidgetEvent::error(err.to_string()));
                Err(err)
            }
        }
    }
}
