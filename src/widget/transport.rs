//! Transport client for the same-origin action dispatcher.
//!
//! Every widget operation is a form-encoded POST of
//! `{action, nonce, ...fields}` to one dispatch endpoint, answered by a
//! `{success, data}` envelope. The envelope rules live here so the
//! workflows above never see wire shapes: a failure envelope carries its
//! user-facing message as a string in `data`, a success envelope carries
//! the operation payload.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Operation names understood by the dispatcher.
pub mod actions {
    pub const EXTRACT_VIDEO: &str = "tvd_extract_video";
    pub const DOWNLOAD_VIDEO: &str = "tvd_download_video";
}

/// Errors produced at the transport boundary. Display strings are the
/// user-facing fallbacks surfaced as status messages.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// Connection-level failure: DNS, refused, reset, request timed out
    #[error("Failed to connect to server")]
    ConnectionFailed(String),

    /// Dispatcher answered with a non-success HTTP status
    #[error("Server responded with status {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Failure envelope; the payload is the dispatcher's message
    #[error("{0}")]
    Rejected(String),

    /// Body was not a well-formed success/failure envelope
    #[error("Invalid response from server")]
    InvalidEnvelope,
}

/// Seam between the widget workflows and the wire. Workflows call named
/// operations; implementations decide how the bytes move.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Sends `action` with `fields` to the dispatcher and returns the
    /// success payload.
    async fn call(
        &self,
        action: &str,
        fields: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, TransportError>;
}

/// The outer success/failure wrapper around every dispatcher response.
/// `success` must be a JSON boolean; anything looser is an invalid
/// envelope rather than guessed at.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Value,
}

/// Unwraps a response body into the success payload or the rejection
/// message.
pub(crate) fn parse_envelope(body: Value) -> Result<Value, TransportError> {
    let envelope: Envelope = serde_json::from_value(body).map_err(|_| TransportError::InvalidEnvelope)?;
    if envelope.success {
        Ok(envelope.data)
    } else {
        let message = match envelope.data {
            Value::String(text) if !text.is_empty() => text,
            _ => "Request rejected by server".to_string(),
        };
        Err(TransportError::Rejected(message))
    }
}

/// HTTP client for the dispatch endpoint.
///
/// Holds the endpoint URL and the anti-forgery token issued with the page
/// render; the token rides along on every call.
#[derive(Debug, Clone)]
pub struct AjaxClient {
    http: reqwest::Client,
    dispatch_url: String,
    nonce: String,
}

impl AjaxClient {
    pub fn new(dispatch_url: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            dispatch_url: dispatch_url.into(),
            nonce: nonce.into(),
        }
    }
}

#[async_trait]
impl Dispatch for AjaxClient {
    async fn call(
        &self,
        action: &str,
        fields: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let mut form: Vec<(&str, &str)> = vec![("action", action), ("nonce", &self.nonce)];
        for (name, value) in fields {
            form.push((name, value.as_str()));
        }

        let response = self
            .http
            .post(&self.dispatch_url)
            .form(&form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| TransportError::InvalidEnvelope)?;
        parse_envelope(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_envelope_success_returns_payload() {
        let payload = parse_envelope(json!({"success": true, "data": {"videos": []}})).unwrap();
        assert_eq!(payload, json!({"videos": []}));
    }

    #[test]
    fn test_parse_envelope_success_without_data_is_null() {
        let payload = parse_envelope(json!({"success": true})).unwrap();
        assert_eq!(payload, Value::Null);
    }

    #[test]
    fn test_parse_envelope_failure_carries_message() {
        let err = parse_envelope(json!({"success": false, "data": "Tweet has no video"})).unwrap_err();
        assert_eq!(err, TransportError::Rejected("Tweet has no video".to_string()));
    }

    #[test]
    fn test_parse_envelope_failure_without_message_uses_fallback() {
        let err = parse_envelope(json!({"success": false})).unwrap_err();
        assert_eq!(err, TransportError::Rejected("Request rejected by server".to_string()));

        let err = parse_envelope(json!({"success": false, "data": {"code": 3}})).unwrap_err();
        assert!(matches!(err, TransportError::Rejected(_)));
    }

    #[test]
    fn test_parse_envelope_rejects_loose_shapes() {
        for body in [json!({"data": "x"}), json!({"success": 1, "data": "x"}), json!("plain"), json!(null)] {
            assert_eq!(parse_envelope(body).unwrap_err(), TransportError::InvalidEnvelope);
        }
    }
}
