//! Anti-forgery tokens for the action dispatcher.
//!
//! A token is an HMAC-SHA256 over the current time tick and a scope name,
//! truncated to 12 hex characters. The tick is half the configured token
//! lifetime, and verification accepts the previous tick as well, so a token
//! issued with the page render stays valid for at least one full lifetime.
//! The token guards against cross-site request forgery, not authentication;
//! the dispatch endpoint is otherwise public by design.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::config;

type HmacSha256 = Hmac<Sha256>;

/// Scope under which the widget bootstrap issues its token. One token
/// covers both dispatch actions for the lifetime of the rendered page.
pub const WIDGET_SCOPE: &str = "tvd_nonce";

/// Number of hex characters kept from the HMAC output.
const TOKEN_LEN: usize = 12;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn current_tick() -> u64 {
    unix_now() / (config::nonce::LIFETIME_SECS / 2)
}

fn sign(scope: &str, tick: u64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(&config::NONCE_SECRET).expect("HMAC accepts keys of any length");
    mac.update(scope.as_bytes());
    mac.update(b"|");
    mac.update(tick.to_be_bytes().as_slice());
    let digest = hex::encode(mac.finalize().into_bytes());
    digest[..TOKEN_LEN].to_string()
}

/// Issues a token for `scope`, valid for the configured lifetime.
pub fn issue(scope: &str) -> String {
    sign(scope, current_tick())
}

/// Verifies a token for `scope`, accepting the current and previous tick.
pub fn verify(scope: &str, token: &str) -> bool {
    let tick = current_tick();
    token == sign(scope, tick) || token == sign(scope, tick.wrapping_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let token = issue(WIDGET_SCOPE);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(verify(WIDGET_SCOPE, &token));
    }

    #[test]
    fn test_previous_tick_still_verifies() {
        let stale = sign(WIDGET_SCOPE, current_tick().wrapping_sub(1));
        assert!(verify(WIDGET_SCOPE, &stale));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let mut token = issue(WIDGET_SCOPE);
        // flip the first character to any other hex digit
        let flipped = if token.starts_with('0') { "1" } else { "0" };
        token.replace_range(0..1, flipped);
        assert!(!verify(WIDGET_SCOPE, &token));
    }

    #[test]
    fn test_scope_is_part_of_the_token() {
        let token = issue("some_other_scope");
        assert!(!verify(WIDGET_SCOPE, &token));
    }

    #[test]
    fn test_expired_tick_rejected() {
        let expired = sign(WIDGET_SCOPE, current_tick().wrapping_sub(2));
        assert!(!verify(WIDGET_SCOPE, &expired));
    }
}
