//! Session cookies.
//!
//! OAuth tokens are kept client-side in an encrypted, HTTP-only cookie that
//! lasts a week. A short-lived second cookie carries the OAuth `state` value
//! between the login redirect and the callback.

use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use rand::Rng;
use sha2::{Digest, Sha512};

use super::error::ApiError;
use super::AppState;
use crate::google::Tokens;

pub const TOKENS_COOKIE: &str = "google_tokens";
pub const STATE_COOKIE: &str = "oauth_state";

const SESSION_MAX_AGE_DAYS: i64 = 7;
const STATE_MAX_AGE_MINUTES: i64 = 10;

/// Derives the cookie encryption key from the application secret.
pub fn derive_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

/// Tokens stored in the session cookie, if present and readable.
pub fn read_tokens(jar: &PrivateCookieJar) -> Option<Tokens> {
    let cookie = jar.get(TOKENS_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(tokens) => Some(tokens),
        Err(e) => {
            tracing::warn!("Ignoring unreadable session cookie: {}", e);
            None
        }
    }
}

pub fn store_tokens(jar: PrivateCookieJar, tokens: &Tokens, secure: bool) -> PrivateCookieJar {
    let value = match serde_json::to_string(tokens) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to encode session tokens: {}", e);
            return jar;
        }
    };

    jar.add(
        Cookie::build((TOKENS_COOKIE, value))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS)),
    )
}

pub fn clear_tokens(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(TOKENS_COOKIE).path("/"))
}

pub fn store_state(jar: PrivateCookieJar, state: &str, secure: bool) -> PrivateCookieJar {
    jar.add(
        Cookie::build((STATE_COOKIE, state.to_string()))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::minutes(STATE_MAX_AGE_MINUTES)),
    )
}

/// Removes the OAuth state cookie, returning its value.
pub fn take_state(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<String>) {
    let state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));
    (jar, state)
}

/// Generates an OAuth state value.
///
/// Returns 32 random bytes encoded as base64url (no padding).
pub fn new_state() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Tokens for the current request, refreshed when expired.
///
/// The returned jar carries the refreshed tokens and must be sent back with
/// the response.
pub async fn authorize(
    state: &AppState,
    jar: PrivateCookieJar,
) -> Result<(Tokens, PrivateCookieJar), ApiError> {
    let tokens = read_tokens(&jar).ok_or(ApiError::Unauthorized)?;

    match state.google.ensure_fresh(tokens).await {
        Ok((tokens, false)) => Ok((tokens, jar)),
        Ok((tokens, true)) => {
            let jar = store_tokens(jar, &tokens, state.secure_cookies);
            Ok((tokens, jar))
        }
        Err(e) if e.is_auth_error() => {
            tracing::info!("Session no longer valid: {}", e);
            Err(ApiError::Unauthorized)
        }
        Err(e) => {
            tracing::error!("Failed to refresh access token: {}", e);
            Err(ApiError::Upstream("Failed to refresh access token"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_format() {
        let state = new_state();
        assert_eq!(state.len(), 43);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(state, new_state());
    }

    #[test]
    fn test_tokens_cookie_roundtrip() {
        let jar = PrivateCookieJar::new(derive_key("secret"));
        let tokens = Tokens {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            scope: None,
            token_type: Some("Bearer".to_string()),
            id_token: None,
            expiry_date: Some(42),
        };

        let jar = store_tokens(jar, &tokens, false);
        assert_eq!(read_tokens(&jar), Some(tokens));

        let jar = clear_tokens(jar);
        assert!(read_tokens(&jar).is_none());
    }

    #[test]
    fn test_take_state_removes_cookie() {
        let jar = store_state(PrivateCookieJar::new(derive_key("secret")), "abc", false);

        let (jar, state) = take_state(jar);

        assert_eq!(state.as_deref(), Some("abc"));
        assert!(jar.get(STATE_COOKIE).is_none());
    }
}
