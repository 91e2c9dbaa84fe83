//! One embedded widget instance.
//!
//! Owns its extraction and download workflows, the currently displayed
//! catalog and the captured source URL. Pages embedding several widgets
//! create one session per container; sessions share nothing, so one
//! widget's in-flight download never blocks another's.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config;
use crate::core::error::AppError;
use crate::widget::catalog::{build_catalog, RenditionCard};
use crate::widget::delivery::{self, SavedFile};
use crate::widget::download::{DownloadRequest, DownloadWorkflow};
use crate::widget::events::{EventSink, WidgetEvent};
use crate::widget::extract::{ExtractError, ExtractWorkflow, ExtractionResult};
use crate::widget::transport::Dispatch;

pub struct WidgetSession<D: Dispatch + 'static> {
    extract: ExtractWorkflow<D>,
    download: DownloadWorkflow<D>,
    events: Arc<dyn EventSink>,
    download_dir: PathBuf,
    source_url: Option<String>,
    extraction: Option<ExtractionResult>,
    catalog: Vec<RenditionCard>,
}

impl<D: Dispatch + 'static> WidgetSession<D> {
    pub fn new(transport: D, events: Arc<dyn EventSink>) -> Self {
        let transport = Arc::new(transport);
        Self {
            extract: ExtractWorkflow::new(Arc::clone(&transport), Arc::clone(&events)),
            download: DownloadWorkflow::new(transport, Arc::clone(&events)),
            events,
            download_dir: PathBuf::from(config::DOWNLOAD_DIR.as_str()),
            source_url: None,
            extraction: None,
            catalog: Vec::new(),
        }
    }

    /// Saves downloads under `dir` instead of the configured directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Runs extraction for `url` and replaces the displayed catalog.
    /// The URL is captured alongside the catalog because every card feeds
    /// it back to the download operation.
    pub async fn load(&mut self, url: &str) -> Result<(), ExtractError> {
        let result = self.extract.extract(url).await?;
        let source = url.trim().to_string();
        self.catalog = build_catalog(&result, &source);
        self.extraction = Some(result);
        self.source_url = Some(source);
        Ok(())
    }

    /// The currently displayed rendition cards, in selection order.
    pub fn catalog(&self) -> &[RenditionCard] {
        &self.catalog
    }

    /// The extraction result behind the current catalog.
    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Downloads the rendition behind `card` and saves it to disk.
    pub async fn grab(&self, card: &RenditionCard) -> Result<SavedFile, AppError> {
        let request = DownloadRequest::from_card(card);
        let payload = self.download.download(&request).await?;

        let saved = match delivery::save_to(&self.download_dir, &payload.video_data, &payload.filename) {
            Ok(saved) => saved,
            Err(err) => {
                self.events.emit(WidgetEvent::error(err.to_string()));
                return Err(err.into());
            }
        };
        self.events
            .emit(WidgetEvent::success("Download completed successfully!"));
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::events::NullSink;
    use crate::widget::testing::ScriptedDispatch;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_then_grab_round_trip() {
        let transport = ScriptedDispatch::new();
        transport.push_success(json!({
            "videos": [{
                "thumbnail": "t",
                "video_formats": [{"quality": "720p", "width": 1280, "height": 720}]
            }]
        }));
        transport.push_success(json!({
            "video_data": BASE64.encode(b"media bytes"),
            "filename": "clip.mp4"
        }));

        let dir = tempfile::tempdir().unwrap();
        let mut session =
            WidgetSession::new(transport, Arc::new(NullSink)).with_download_dir(dir.path());

        session.load(" https://x.com/user/status/123 ").await.unwrap();
        assert_eq!(session.source_url(), Some("https://x.com/user/status/123"));
        assert_eq!(session.catalog().len(), 1);
        assert_eq!(session.catalog()[0].quality_label, "720p (1280x720)");

        let card = session.catalog()[0].clone();
        let saved = session.grab(&card).await.unwrap();
        assert_eq!(saved.bytes_written, 11);
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"media bytes");
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let transport_a = ScriptedDispatch::new();
        transport_a.push_success(json!({"videos": []}));
        let transport_b = ScriptedDispatch::new();
        transport_b.push_success(json!({"videos": [{"thumbnail": "t", "video_formats": []}]}));

        let mut a = WidgetSession::new(transport_a, Arc::new(NullSink));
        let mut b = WidgetSession::new(transport_b, Arc::new(NullSink));
        a.load("https://x.com/u/status/1").await.unwrap();
        b.load("https://x.com/u/status/2").await.unwrap();

        assert!(a.catalog().is_empty());
        assert!(b.catalog().is_empty());
        assert_eq!(b.extraction().unwrap().videos.len(), 1);
        assert_eq!(a.extraction().unwrap().videos.len(), 0);
    }
}
