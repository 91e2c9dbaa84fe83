//! Source-URL validation and filename sanitization.
//!
//! The URL check mirrors the wire contract the dispatcher enforces: a tweet
//! URL is accepted when it references one of the recognized hosts. It is a
//! substring match on purpose; the remote extractor accepts mobile, embed
//! and share-parameter variants that a strict parser would reject.

use thiserror::Error;

/// Host substrings a source URL must contain to be accepted.
pub const RECOGNIZED_HOSTS: [&str; 2] = ["twitter.com", "x.com"];

/// Widget-level input validation errors. The display strings are the
/// user-facing messages, surfaced verbatim as status events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty or whitespace-only input
    #[error("Please enter a Twitter URL")]
    Empty,

    /// Input does not reference a recognized host
    #[error("Please enter a valid Twitter URL")]
    UnrecognizedHost,
}

/// Checks the preconditions for a source URL before any network call.
///
/// # Returns
///
/// The trimmed URL on success, so callers capture the canonical form.
pub fn validate_tweet_url(url: &str) -> Result<&str, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !RECOGNIZED_HOSTS.iter().any(|host| trimmed.contains(host)) {
        return Err(ValidationError::UnrecognizedHost);
    }
    Ok(trimmed)
}

/// Sanitizes a filename by removing filesystem-unsafe characters.
///
/// Removes path separators (`/`, `\`), reserved characters
/// (`:`, `*`, `?`, `"`, `<`, `>`, `|`) and control characters, so a
/// filename taken from a remote response can never escape the download
/// directory.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !['/', '\\', ':', '*', '?', '"', '<', '>', '|'].contains(c))
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_and_whitespace() {
        for input in ["", "   ", "\t", "\n  \n"] {
            assert_eq!(validate_tweet_url(input), Err(ValidationError::Empty), "input: {:?}", input);
        }
    }

    #[test]
    fn test_validate_rejects_unrecognized_hosts() {
        let inputs = [
            "https://youtube.com/watch?v=abc",
            "https://example.com/user/status/123",
            "not a url at all",
            "https://xcom.evil.org/status/1",
        ];
        for input in inputs {
            assert_eq!(
                validate_tweet_url(input),
                Err(ValidationError::UnrecognizedHost),
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_validate_accepts_recognized_hosts() {
        let inputs = [
            "https://twitter.com/user/status/123",
            "https://x.com/user/status/123",
            "https://mobile.twitter.com/user/status/123?s=20",
            "  https://x.com/user/status/123  ",
        ];
        for input in inputs {
            let validated = validate_tweet_url(input);
            assert!(validated.is_ok(), "input: {:?}", input);
            assert_eq!(validated.unwrap(), input.trim());
        }
    }

    #[test]
    fn test_sanitize_filename_removes_unsafe_chars() {
        let cases = [
            ("clip.mp4", "clip.mp4"),
            ("twitter_video_720p.mp4", "twitter_video_720p.mp4"),
            ("a/b\\c.mp4", "abc.mp4"),
            ("clip:*?\"<>|.mp4", "clip.mp4"),
            ("clip\x00\x1f.mp4", "clip.mp4"),
            ("../escape.mp4", "..escape.mp4"),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize_filename(input), expected, "input: {:?}", input);
        }
    }
}
