//! Download workflow: a two-state machine around the download operation.
//!
//! `Idle -> InFlight` on download, back to `Idle` on every exit path
//! (success, failure, timeout). One download at a time per workflow
//! instance; a second request while in flight is rejected immediately
//! instead of queued. The deadline aborts the in-flight transport task,
//! so a late result can never reach the catalog or delivery.

use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::config;
use crate::widget::catalog::RenditionCard;
use crate::widget::events::{EventSink, WidgetEvent};
use crate::widget::transport::{actions, Dispatch, TransportError};

/// What the user selected: source URL, quality label, 1-based video number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub quality_label: String,
    pub video_number: usize,
}

impl DownloadRequest {
    pub fn from_card(card: &RenditionCard) -> Self {
        Self {
            url: card.source_url.clone(),
            quality_label: card.quality_label.clone(),
            video_number: card.video_index,
        }
    }

    /// First whitespace-delimited token of the label; the remote API keys
    /// downloads on it, not on the full display label.
    fn quality_token(&self) -> &str {
        self.quality_label
            .split_whitespace()
            .next()
            .unwrap_or(self.quality_label.as_str())
    }
}

/// Payload handed to binary delivery after a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    /// Base64-encoded video bytes
    pub video_data: String,
    pub filename: String,
    pub file_size: Option<u64>,
}

/// Errors from the download workflow. Every variant leaves the workflow
/// back in `Idle`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DownloadError {
    /// Another download from this widget instance is still in flight
    #[error("A download is already in progress")]
    AlreadyInProgress,

    /// Deadline elapsed before the transport resolved
    #[error("Download timed out")]
    Timeout,

    /// Connection-level failure reaching the dispatcher
    #[error("Failed to connect to download service")]
    TransportFailure(String),

    /// Failure envelope; the payload is the dispatcher's message
    #[error("{0}")]
    Rejected(String),

    /// Envelope arrived but its shape is not a usable download result
    #[error("Invalid response from download service")]
    MalformedResponse,
}

impl From<TransportError> for DownloadError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionFailed(detail) => DownloadError::TransportFailure(detail),
            TransportError::HttpStatus(status) => DownloadError::TransportFailure(status.to_string()),
            TransportError::Rejected(message) => DownloadError::Rejected(message),
            TransportError::InvalidEnvelope => DownloadError::MalformedResponse,
        }
    }
}

/// Success payload shape on the wire. `video_data` is validated separately
/// because an empty string is as useless as a missing field.
#[derive(Debug, Deserialize)]
struct DownloadData {
    #[serde(default)]
    video_data: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    file_size: Option<u64>,
}

/// Resets the in-flight flag on every exit path of `download`.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Client-side download workflow. Each widget instance owns one.
pub struct DownloadWorkflow<D: Dispatch + 'static> {
    transport: Arc<D>,
    events: Arc<dyn EventSink>,
    in_flight: AtomicBool,
    deadline: Duration,
}

impl<D: Dispatch + 'static> DownloadWorkflow<D> {
    pub fn new(transport: Arc<D>, events: Arc<dyn EventSink>) -> Self {
        Self::with_deadline(transport, events, config::network::download_timeout())
    }

    /// Same workflow with a custom deadline; tests shrink it.
    pub fn with_deadline(transport: Arc<D>, events: Arc<dyn EventSink>, deadline: Duration) -> Self {
        Self {
            transport,
            events,
            in_flight: AtomicBool::new(false),
            deadline,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Runs the download operation for `request`.
    ///
    /// Rejected with `AlreadyInProgress` while a previous call is still in
    /// flight; the running call and its deadline are left untouched.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadPayload, DownloadError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DownloadError::AlreadyInProgress);
        }
        let _guard = InFlightGuard { flag: &self.in_flight };

        self.events.emit(WidgetEvent::DownloadStarted);
        self.events.emit(WidgetEvent::success("Starting download..."));

        let quality_token = request.quality_token().to_string();
        let fields = vec![
            ("url", request.url.clone()),
            ("quality", quality_token.clone()),
            ("video_number", request.video_number.to_string()),
        ];

        let transport = Arc::clone(&self.transport);
        let deadline = self.deadline;
        let mut call = tokio::spawn(async move {
            transport.call(actions::DOWNLOAD_VIDEO, &fields, deadline).await
        });

        let outcome = tokio::select! {
            joined = &mut call => match joined {
                Ok(result) => result,
                Err(join_err) => Err(TransportError::ConnectionFailed(join_err.to_string())),
            },
            _ = tokio::time::sleep(self.deadline) => {
                // stop waiting; the task (and its request) is torn down
                call.abort();
                log::warn!("download of {} timed out after {:?}", request.url, self.deadline);
                self.events.emit(WidgetEvent::DownloadFinished);
                self.events.emit(WidgetEvent::error(DownloadError::Timeout.to_string()));
                return Err(DownloadError::Timeout);
            }
        };
        self.events.emit(WidgetEvent::DownloadFinished);

        let payload = match outcome {
            Ok(payload) => payload,
            Err(err) => {
                let err = DownloadError::from(err);
                self.events.emit(WidgetEvent::error(err.to_string()));
                return Err(err);
            }
        };

        let data = match serde_json::from_value::<DownloadData>(payload) {
            Ok(data) if !data.video_data.is_empty() => data,
            _ => {
                let err = DownloadError::MalformedResponse;
                self.events.emit(WidgetEvent::error(err.to_string()));
                return Err(err);
            }
        };

        Ok(DownloadPayload {
            video_data: data.video_data,
            filename: data
                .filename
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("twitter_video_{}.mp4", quality_token)),
            file_size: data.file_size,
        })
    }
}
