//! Minimal Google API client: OAuth2, Drive and Calendar.
//!
//! Only the calls StudyTrack needs are implemented. Endpoint base URLs are
//! part of [`GoogleConfig`] so they can be pointed at a local server.

mod calendar;
mod drive;
mod error;
mod oauth;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use calendar::{study_slot, EventRequest};
pub use drive::DATA_FILENAME;
pub use error::GoogleError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

/// Scopes requested at login.
pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/calendar.events",
];

/// OAuth client settings and endpoint locations.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base: String,
}

impl GoogleConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// OAuth tokens as stored in the session cookie.
///
/// `expiry_date` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_SKEW_MS: i64 = 60_000;

impl Tokens {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry - EXPIRY_SKEW_MS <= now_ms,
            None => false,
        }
    }

    pub fn is_expired_now(&self) -> bool {
        self.is_expired(Utc::now().timestamp_millis())
    }
}

/// HTTP client for the Google endpoints StudyTrack talks to.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }
}
