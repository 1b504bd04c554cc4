use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error returned by API handlers.
///
/// Rendered as `{"error": <code>, "message": <text>}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    /// No usable session
    Unauthorized,
    /// Request was missing something or carried something invalid
    BadRequest(&'static str),
    /// A Google API call failed
    Upstream(&'static str),
    /// The server could not complete the operation
    Internal(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: &'static str,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &'static str) {
        match *self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, "upstream_error", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (status, _, message) = self.parts();
        write!(f, "{}: {}", status.as_u16(), message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        (status, Json(ErrorBody { error, message })).into_response()
    }
}
