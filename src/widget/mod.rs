//! Client-side widget orchestration: the extract, select, download, save
//! flow that runs against the action dispatcher.

pub mod catalog;
pub mod delivery;
pub mod download;
pub mod events;
pub mod extract;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{build_catalog, tweet_summary, RenditionCard};
pub use delivery::SavedFile;
pub use download::{DownloadRequest, DownloadWorkflow};
pub use events::{ChannelSink, EventSink, NullSink, StatusKind, WidgetEvent};
pub use extract::{ExtractWorkflow, ExtractionResult};
pub use session::WidgetSession;
pub use transport::AjaxClient;
