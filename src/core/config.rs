use once_cell::sync::Lazy;
use rand::Rng;
use std::env;
use std::time::Duration;

/// Configuration constants for the widget service

/// Base URL of the remote extraction API.
/// Read once at startup from the TVD_API_BASE_URL environment variable.
/// The default points at the hosted extractor; self-hosters override it
/// with their own deployment (e.g. http://127.0.0.1:5000).
pub static API_BASE_URL: Lazy<String> =
    Lazy::new(|| env::var("TVD_API_BASE_URL").unwrap_or_else(|_| "http://52.71.21.240/yt-api".to_string()));

/// Base URL of the action dispatcher the client-side workflows talk to.
/// Read from TVD_DISPATCHER_URL; defaults to a dispatcher on this machine.
pub static DISPATCHER_URL: Lazy<String> =
    Lazy::new(|| env::var("TVD_DISPATCHER_URL").unwrap_or_else(|_| "http://127.0.0.1:4000".to_string()));

/// Externally visible base URL the dispatcher announces in the widget
/// bootstrap (behind a reverse proxy this differs from the bind address).
/// Read from TVD_PUBLIC_URL; when unset the server falls back to its own
/// listen address.
pub static PUBLIC_URL: Lazy<Option<String>> = Lazy::new(|| env::var("TVD_PUBLIC_URL").ok());

/// Secret key for anti-forgery tokens.
/// Read from TVD_NONCE_SECRET. When unset a random per-process secret is
/// generated, which means outstanding tokens stop verifying after a restart.
pub static NONCE_SECRET: Lazy<Vec<u8>> = Lazy::new(|| match env::var("TVD_NONCE_SECRET") {
    Ok(secret) if !secret.is_empty() => secret.into_bytes(),
    _ => {
        let generated: [u8; 32] = rand::thread_rng().gen();
        generated.to_vec()
    }
});

/// Directory downloaded files are saved into.
/// Read from TVD_DOWNLOAD_DIR, defaults to ~/downloads.
/// Supports tilde (~) expansion for the home directory.
pub static DOWNLOAD_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("TVD_DOWNLOAD_DIR").unwrap_or_else(|_| "~/downloads".to_string());
    shellexpand::tilde(&raw).to_string()
});

/// Log file path, next to the console output.
/// Read from TVD_LOG_FILE, defaults to tweetclip.log in the working directory.
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("TVD_LOG_FILE").unwrap_or_else(|_| "tweetclip.log".to_string()));

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for extract calls (in seconds)
    pub const EXTRACT_TIMEOUT_SECS: u64 = 30;

    /// End-to-end budget for download calls (in seconds). Remote extraction
    /// plus transcoding of a long video can legitimately take minutes.
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

    /// Extract call timeout duration
    pub fn extract_timeout() -> Duration {
        Duration::from_secs(EXTRACT_TIMEOUT_SECS)
    }

    /// Download call timeout duration
    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Widget UI timings
pub mod ui {
    /// Delay before transient status messages are dismissed (in seconds)
    pub const MESSAGE_DISMISS_SECS: u64 = 5;
}

/// Anti-forgery token configuration
pub mod nonce {
    use super::Duration;

    /// Token lifetime (in seconds). Verification also accepts tokens from
    /// the previous half-lifetime tick, so a token issued just before a
    /// tick boundary stays valid.
    pub const LIFETIME_SECS: u64 = 86_400;

    /// Token lifetime duration
    pub fn lifetime() -> Duration {
        Duration::from_secs(LIFETIME_SECS)
    }
}
