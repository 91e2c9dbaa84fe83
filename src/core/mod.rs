//! Core utilities: configuration, errors, logging, validation and
//! anti-forgery tokens.

pub mod config;
pub mod error;
pub mod logging;
pub mod nonce;
pub mod validation;

pub use error::{AppError, AppResult};
pub use logging::init_logger;
