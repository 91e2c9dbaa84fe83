use thiserror::Error;

use crate::core::validation::ValidationError;
use crate::widget::delivery::DeliveryError;
use crate::widget::download::DownloadError;
use crate::widget::extract::ExtractError;
use crate::widget::transport::TransportError;

/// Centralized error type for the application boundary.
///
/// The workflow modules keep their own focused error enums; this aggregator
/// exists for call sites (CLI, embedding code) that drive several workflows
/// in sequence and want a single `?`-able type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Widget input validation failures
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport-level failures talking to the dispatcher
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Extraction workflow failures
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Download workflow failures
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Binary delivery failures
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Raw HTTP errors (widget bootstrap fetch)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
