//! StudyTrack HTTP server.
//!
//! Holds the user's Google session and exposes the remote-store endpoints the
//! client syncs its curriculum through, plus the calendar and assignment
//! check endpoints.
//!
//! # Endpoints
//!
//! - `GET /health`: health check
//! - `GET /api/auth/login`, `GET /api/auth/callback`: OAuth flow
//! - `GET /api/auth/user`, `POST /api/auth/logout`: session
//! - `GET|POST /api/drive/data`: curriculum document in Drive
//! - `POST /api/calendar/event`: schedule a study session
//! - `POST /api/assignment/check`: review a submitted repository link

pub mod config;
pub mod error;
pub mod handlers;
pub mod session;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

use crate::google::GoogleClient;
pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub google: Arc<GoogleClient>,
    /// Key for the encrypted session cookies
    pub key: Key,
    /// Mark cookies `Secure`
    pub secure_cookies: bool,
    /// Assignment review is enabled when set
    pub review_key: Option<String>,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        if config.app_secret.is_empty() {
            tracing::warn!(
                "APP_SECRET is not set; session cookies are encrypted with a well-known key (development only)"
            );
        }
        if config.google.client_id.is_empty() {
            tracing::warn!("GOOGLE_CLIENT_ID is not set; login will fail");
        }

        Self {
            google: Arc::new(GoogleClient::new(config.google.clone())),
            key: session::derive_key(&config.app_secret),
            secure_cookies: config.production,
            review_key: config.gemini_api_key.clone(),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/login", get(handlers::auth::login))
        .route("/api/auth/callback", get(handlers::auth::callback))
        .route("/api/auth/user", get(handlers::auth::user))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/drive/data",
            get(handlers::drive::load).post(handlers::drive::save),
        )
        .route("/api/calendar/event", post(handlers::calendar::create_event))
        .route("/api/assignment/check", post(handlers::assignment::check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
