//! OAuth login flow and session endpoints.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SuccessResponse;
use crate::server::{error::ApiError, session, AppState};

/// Redirects to the Google consent screen.
pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    let csrf = session::new_state();
    let url = state.google.auth_url(&csrf);
    let jar = session::store_state(jar, &csrf, state.secure_cookies);
    (jar, Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// Completes the OAuth flow and stores the tokens in the session cookie.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), ApiError> {
    let (jar, expected) = session::take_state(jar);

    let code = params
        .code
        .ok_or(ApiError::BadRequest("Missing authorization code"))?;
    if expected.is_none() || params.state != expected {
        tracing::warn!("OAuth callback with mismatched state");
        return Err(ApiError::BadRequest("Invalid OAuth state"));
    }

    let tokens = state.google.exchange_code(&code).await.map_err(|e| {
        tracing::error!("Failed to exchange authorization code: {}", e);
        ApiError::Internal("Authentication failed")
    })?;

    tracing::info!("User signed in");
    let jar = session::store_tokens(jar, &tokens, state.secure_cookies);
    Ok((jar, Redirect::to("/")))
}

#[derive(Serialize)]
pub struct UserResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Value>,
}

impl UserResponse {
    fn anonymous() -> Json<Self> {
        Json(Self {
            authenticated: false,
            user: None,
        })
    }
}

/// Profile of the signed-in user, or `{authenticated: false}`.
pub async fn user(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    let (tokens, jar) = match session::authorize(&state, jar).await {
        Ok(authorized) => authorized,
        Err(_) => return UserResponse::anonymous().into_response(),
    };

    match state.google.user_info(&tokens).await {
        Ok(user) => (
            jar,
            Json(UserResponse {
                authenticated: true,
                user: Some(user),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::info!("Failed to fetch user info: {}", e);
            UserResponse::anonymous().into_response()
        }
    }
}

pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Json<SuccessResponse>) {
    (session::clear_tokens(jar), SuccessResponse::ok())
}
