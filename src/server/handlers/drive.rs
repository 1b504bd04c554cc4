//! Remote store endpoints: the curriculum document kept in Drive.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Serialize;
use serde_json::Value;

use super::{google_failure, SuccessResponse};
use crate::server::{error::ApiError, session, AppState};

#[derive(Serialize)]
pub struct DataResponse {
    data: Option<Value>,
}

/// Returns the stored document, `{data: null}` when none exists yet.
pub async fn load(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<DataResponse>), ApiError> {
    let (tokens, jar) = session::authorize(&state, jar).await?;

    let data = state.google.load_document(&tokens).await.map_err(|e| {
        google_failure(
            e,
            "Failed to load document from Drive",
            ApiError::Upstream("Failed to load data"),
        )
    })?;

    tracing::debug!(found = data.is_some(), "Loaded document");
    Ok((jar, Json(DataResponse { data })))
}

/// Overwrites the stored document with the request body.
pub async fn save(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(doc): Json<Value>,
) -> Result<(PrivateCookieJar, Json<SuccessResponse>), ApiError> {
    let (tokens, jar) = session::authorize(&state, jar).await?;

    state.google.save_document(&tokens, &doc).await.map_err(|e| {
        google_failure(
            e,
            "Failed to save document to Drive",
            ApiError::Internal("Failed to save data"),
        )
    })?;

    tracing::debug!("Saved document");
    Ok((jar, SuccessResponse::ok()))
}
