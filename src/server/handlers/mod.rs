//! Request handlers.

pub mod assignment;
pub mod auth;
pub mod calendar;
pub mod drive;

use axum::Json;
use serde::Serialize;

use super::error::ApiError;
use crate::google::GoogleError;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct SuccessResponse {
    success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Maps a failed Google call to an API error.
///
/// A 401 from Google means the session's access token was rejected, which the
/// client should see as an expired session rather than a server fault.
fn google_failure(e: GoogleError, context: &'static str, fallback: ApiError) -> ApiError {
    if let GoogleError::Api { status: 401, .. } = e {
        tracing::info!("{}: access token rejected", context);
        return ApiError::Unauthorized;
    }
    tracing::error!("{}: {}", context, e);
    fallback
}

/// In-process stand-in for the Google endpoints, plus request helpers.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        extract::{Path, Query, State},
        http::{header, HeaderMap, Request, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, patch, post},
        Form, Json, Router,
    };
    use axum_extra::extract::cookie::PrivateCookieJar;
    use serde_json::{json, Value};

    use crate::google::{GoogleClient, GoogleConfig, Tokens, DATA_FILENAME};
    use crate::server::{session, AppState};

    pub const GOOD_TOKEN: &str = "good-token";
    const FILE_ID: &str = "file-1";

    #[derive(Default)]
    pub struct MockGoogle {
        /// Raw contents of the data file; `None` while it does not exist
        pub file: Option<String>,
        pub fail_drive: bool,
        /// Media uploads answer 503, as Drive does when a backend is down
        pub fail_upload: bool,
        pub creates: usize,
    }

    impl MockGoogle {
        pub fn with_document(doc: Value) -> Self {
            Self {
                file: Some(doc.to_string()),
                ..Default::default()
            }
        }
    }

    pub type SharedMock = Arc<Mutex<MockGoogle>>;

    fn authorized(headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", GOOD_TOKEN);
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some(expected.as_str())
    }

    fn drive_guard(mock: &MockGoogle, headers: &HeaderMap) -> Option<Response> {
        if !authorized(headers) {
            return Some(StatusCode::UNAUTHORIZED.into_response());
        }
        if mock.fail_drive {
            return Some((StatusCode::INTERNAL_SERVER_ERROR, "backend error").into_response());
        }
        None
    }

    fn upload_guard(mock: &MockGoogle, headers: &HeaderMap) -> Option<Response> {
        if let Some(rejection) = drive_guard(mock, headers) {
            return Some(rejection);
        }
        if mock.fail_upload {
            return Some((StatusCode::SERVICE_UNAVAILABLE, "upload failed").into_response());
        }
        None
    }

    async fn list_files(State(mock): State<SharedMock>, headers: HeaderMap) -> Response {
        let mock = mock.lock().unwrap();
        if let Some(rejection) = drive_guard(&mock, &headers) {
            return rejection;
        }
        let files = match mock.file {
            Some(_) => json!([{ "id": FILE_ID, "name": DATA_FILENAME }]),
            None => json!([]),
        };
        Json(json!({ "files": files })).into_response()
    }

    async fn get_file(
        State(mock): State<SharedMock>,
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> Response {
        let mock = mock.lock().unwrap();
        if let Some(rejection) = drive_guard(&mock, &headers) {
            return rejection;
        }
        match (&mock.file, id == FILE_ID) {
            (Some(contents), true) => (
                [(header::CONTENT_TYPE, "application/json")],
                contents.clone(),
            )
                .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// Media part of a `multipart/related` body: the second part's payload.
    fn media_part(headers: &HeaderMap, body: &str) -> Option<String> {
        let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
        let boundary = content_type.split("boundary=").nth(1)?;
        let delimiter = format!("--{}", boundary);
        let mut parts = body
            .split(delimiter.as_str())
            .filter_map(|part| part.split_once("\r\n\r\n"))
            .map(|(_, payload)| payload.trim_end_matches("\r\n"));
        let metadata: Value = serde_json::from_str(parts.next()?).ok()?;
        if metadata["name"] != DATA_FILENAME {
            return None;
        }
        parts.next().map(str::to_string)
    }

    async fn create_file(
        State(mock): State<SharedMock>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        let mut mock = mock.lock().unwrap();
        if let Some(rejection) = upload_guard(&mock, &headers) {
            return rejection;
        }
        if query.get("uploadType").map(String::as_str) != Some("multipart") {
            return StatusCode::BAD_REQUEST.into_response();
        }
        let Some(contents) = media_part(&headers, &body) else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        mock.file = Some(contents);
        mock.creates += 1;
        Json(json!({ "id": FILE_ID })).into_response()
    }

    async fn upload_file(
        State(mock): State<SharedMock>,
        Path(id): Path<String>,
        headers: HeaderMap,
        body: String,
    ) -> Response {
        let mut mock = mock.lock().unwrap();
        if let Some(rejection) = upload_guard(&mock, &headers) {
            return rejection;
        }
        if id != FILE_ID || mock.file.is_none() {
            return StatusCode::NOT_FOUND.into_response();
        }
        mock.file = Some(body);
        Json(json!({ "id": FILE_ID })).into_response()
    }

    async fn user_info(headers: HeaderMap) -> Response {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!({ "email": "learner@example.com", "name": "Learner" })).into_response()
    }

    async fn insert_event(headers: HeaderMap, Json(mut event): Json<Value>) -> Response {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        event["id"] = json!("event-1");
        Json(event).into_response()
    }

    async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
        let grant = form.get("grant_type").map(String::as_str);
        let accepted = match grant {
            Some("authorization_code") => form.get("code").map(String::as_str) == Some("good-code"),
            Some("refresh_token") => {
                form.get("refresh_token").map(String::as_str) == Some("good-refresh")
            }
            _ => false,
        };
        if !accepted {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_grant" })),
            )
                .into_response();
        }

        let mut body = json!({
            "access_token": GOOD_TOKEN,
            "expires_in": 3600,
            "token_type": "Bearer",
        });
        if grant == Some("authorization_code") {
            body["refresh_token"] = json!("good-refresh");
        }
        Json(body).into_response()
    }

    /// Serves the mock on an ephemeral local port and returns its base URL.
    pub async fn spawn_mock(mock: SharedMock) -> String {
        let app = Router::new()
            .route("/token", post(token))
            .route("/oauth2/v2/userinfo", get(user_info))
            .route("/drive/v3/files", get(list_files))
            .route("/drive/v3/files/{id}", get(get_file))
            .route("/upload/drive/v3/files", post(create_file))
            .route("/upload/drive/v3/files/{id}", patch(upload_file))
            .route("/calendar/v3/calendars/primary/events", post(insert_event))
            .with_state(mock);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// App state whose Google endpoints all live under `base`.
    pub fn test_state(base: &str, review_key: Option<&str>) -> AppState {
        let mut google = GoogleConfig::new(
            "client-id",
            "client-secret",
            "http://localhost:3008/api/auth/callback",
        );
        google.auth_url = format!("{}/auth", base);
        google.token_url = format!("{}/token", base);
        google.api_base = base.to_string();

        AppState {
            google: Arc::new(GoogleClient::new(google)),
            key: session::derive_key("test-secret"),
            secure_cookies: false,
            review_key: review_key.map(str::to_string),
        }
    }

    /// Base URL nothing listens on, for tests that must not reach Google.
    pub const UNREACHABLE: &str = "http://127.0.0.1:9";

    pub fn valid_tokens() -> Tokens {
        Tokens {
            access_token: GOOD_TOKEN.to_string(),
            refresh_token: Some("good-refresh".to_string()),
            scope: None,
            token_type: Some("Bearer".to_string()),
            id_token: None,
            expiry_date: Some(chrono::Utc::now().timestamp_millis() + 3_600_000),
        }
    }

    pub fn expired_tokens(refresh_token: &str) -> Tokens {
        Tokens {
            access_token: "stale-token".to_string(),
            refresh_token: Some(refresh_token.to_string()),
            expiry_date: Some(0),
            ..valid_tokens()
        }
    }

    /// First `name=value` pair of a `Set-Cookie` header on `response`.
    pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
            .find(|pair| pair.starts_with(&format!("{}=", name)))
    }

    /// `Cookie` header value carrying `tokens` encrypted with the state's key.
    pub fn session_cookie(state: &AppState, tokens: &Tokens) -> String {
        let jar = session::store_tokens(PrivateCookieJar::new(state.key.clone()), tokens, false);
        let response = (jar, ()).into_response();
        set_cookie(&response, session::TOKENS_COOKIE).unwrap()
    }

    pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
