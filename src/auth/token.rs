//! Opaque bearer tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A lifetime too large to represent never expires.
pub fn is_expired(created_at: DateTime<Utc>, lifetime_seconds: u64, now: DateTime<Utc>) -> bool {
    let expires_at = i64::try_from(lifetime_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| created_at.checked_add_signed(lifetime));
    match expires_at {
        Some(expires_at) => now >= expires_at,
        None => false,
    }
}

/// `Authorization: Bearer <token>` → `<token>`.
pub fn bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
