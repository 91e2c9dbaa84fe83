//! UI signals emitted by the widget workflows.
//!
//! The embedding surface (a web page, a terminal, a test) decides how to
//! render these; the workflows only promise when they fire. Loading signals
//! bracket every extract call so the surface can disable input and show a
//! spinner; download signals bracket every download so the surface can show
//! a dismissible progress indicator. Dismissing the indicator does not
//! cancel the underlying call.

use tokio::sync::mpsc;

/// Kind of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// A signal from a workflow to the embedding surface.
///
/// `Status` messages are transient; surfaces dismiss them after
/// `config::ui::MESSAGE_DISMISS_SECS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Extraction started: disable input, show the spinner
    LoadingStarted,
    /// Extraction finished (any outcome): re-enable input, hide the spinner
    LoadingFinished,
    /// Download started: show the progress indicator
    DownloadStarted,
    /// Download finished (any outcome): hide the progress indicator
    DownloadFinished,
    /// Transient status message for the user
    Status { kind: StatusKind, text: String },
}

impl WidgetEvent {
    pub fn success(text: impl Into<String>) -> Self {
        WidgetEvent::Status {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        WidgetEvent::Status {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Sink for widget events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: WidgetEvent);
}

/// Sink that drops every event, for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: WidgetEvent) {}
}

/// Sink that forwards events into an unbounded channel. The receiving half
/// is handed to the surface; a dropped receiver silently discards events,
/// matching a page that has navigated away mid-download.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<WidgetEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WidgetEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: WidgetEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(WidgetEvent::LoadingStarted);
        sink.emit(WidgetEvent::success("done"));
        assert_eq!(rx.recv().await, Some(WidgetEvent::LoadingStarted));
        assert_eq!(
            rx.recv().await,
            Some(WidgetEvent::Status {
                kind: StatusKind::Success,
                text: "done".to_string()
            })
        );
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(WidgetEvent::LoadingStarted);
    }
}
