//! Binary delivery: turn a base64 payload into a file on disk.
//!
//! The write is staged: bytes land in a `.part` file next to the final
//! name and are renamed into place, so a crash or a full disk never leaves
//! a half-written video behind under the final name, and the stage file is
//! removed on every failure path.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config;
use crate::core::validation::sanitize_filename;

/// Fallback name when sanitization eats the whole filename.
const FALLBACK_FILENAME: &str = "twitter_video.mp4";

/// A file written to the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// Errors from binary delivery. No variant leaves a partial file behind.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Payload was not valid base64
    #[error("Error processing download data: {0}")]
    DecodeFailed(#[from] base64::DecodeError),

    /// Decoded payload contained no bytes
    #[error("Downloaded file is empty")]
    EmptyPayload,

    /// Filesystem failure writing the file
    #[error("Could not save file: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes `payload_b64` and writes it as `filename` under `dir`.
pub fn save_to(dir: &Path, payload_b64: &str, filename: &str) -> Result<SavedFile, DeliveryError> {
    let bytes = BASE64.decode(payload_b64.trim())?;
    if bytes.is_empty() {
        return Err(DeliveryError::EmptyPayload);
    }

    let name = sanitize_filename(filename);
    let name = if name.is_empty() { FALLBACK_FILENAME.to_string() } else { name };

    fs::create_dir_all(dir)?;
    let final_path = dir.join(&name);
    let stage_path = dir.join(format!("{}.part", name));

    if let Err(err) = fs::write(&stage_path, &bytes) {
        let _ = fs::remove_file(&stage_path);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&stage_path, &final_path) {
        let _ = fs::remove_file(&stage_path);
        return Err(err.into());
    }

    log::info!("saved {} ({} bytes)", final_path.display(), bytes.len());
    Ok(SavedFile {
        path: final_path,
        bytes_written: bytes.len() as u64,
    })
}

/// Saves into the configured download directory.
pub fn save(payload_b64: &str, filename: &str) -> Result<SavedFile, DeliveryError> {
    save_to(Path::new(config::DOWNLOAD_DIR.as_str()), payload_b64, filename)
}
