use axum::{extract::State, Json};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Local;
use serde_json::Value;

use super::google_failure;
use crate::google::EventRequest;
use crate::server::{error::ApiError, session, AppState};

/// Schedules a one-hour study session today and returns the created event.
pub async fn create_event(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(request): Json<EventRequest>,
) -> Result<(PrivateCookieJar, Json<Value>), ApiError> {
    let (tokens, jar) = session::authorize(&state, jar).await?;

    let event = state
        .google
        .create_study_event(&tokens, &request, Local::now())
        .await
        .map_err(|e| {
            google_failure(
                e,
                "Failed to create calendar event",
                ApiError::Internal("Failed to create event"),
            )
        })?;

    tracing::info!("Scheduled study session for {}", request.title);
    Ok((jar, Json(event)))
}
