//! tweetclip - self-hosted Twitter/X video download widget service.
//!
//! A user pastes a tweet URL, previews the available renditions and saves
//! the one they pick. The heavy lifting (extraction, transcoding) happens
//! on a remote yt-dlp API; this crate is the orchestration around it:
//!
//! - `widget`: the client-side flow (validate, extract, catalog, download,
//!   deliver) with its UI signals
//! - `dispatch`: the same-origin action dispatcher the widget posts to,
//!   which checks the anti-forgery token and proxies to the API
//! - `core`: configuration, errors, logging, validation, tokens

pub mod cli;
pub mod core;
pub mod dispatch;
pub mod widget;

pub use crate::core::{AppError, AppResult};
pub use crate::widget::WidgetSession;
