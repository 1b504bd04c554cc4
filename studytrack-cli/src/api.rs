//! Client for the server endpoints outside the remote store: session info,
//! calendar scheduling and assignment checks.

use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use studytrack_core::SESSION_COOKIE;

/// Errors from server API calls
#[derive(Debug)]
pub enum ApiError {
    /// No session, or the server rejected it
    NotLoggedIn,
    /// HTTP request error
    HttpError(String),
    /// Server returned an error
    ServerError { error: String, message: String },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotLoggedIn => {
                write!(f, "Not logged in. Run 'study auth login' to authenticate.")
            }
            ApiError::HttpError(e) => write!(f, "HTTP error: {}", e),
            ApiError::ServerError { error, message } => write!(f, "{}: {}", error, message),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::HttpError(e.to_string())
    }
}

/// `GET /api/auth/user` response
#[derive(Debug, Deserialize)]
pub struct UserStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<Value>,
}

impl UserStatus {
    /// Best display name for the signed-in user.
    pub fn display_name(&self) -> Option<String> {
        let user = self.user.as_ref()?;
        user["email"]
            .as_str()
            .or_else(|| user["name"].as_str())
            .map(str::to_string)
    }
}

/// `POST /api/assignment/check` response
#[derive(Debug, Deserialize)]
pub struct Review {
    pub status: String,
    pub message: String,
}

impl Review {
    /// A warning means the link was not accepted.
    pub fn accepted(&self) -> bool {
        self.status != "warning"
    }
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL to open in a browser to sign in.
    pub fn login_url(&self) -> String {
        self.url("/api/auth/login")
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.session {
            Some(session) => {
                request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session))
            }
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::NotLoggedIn);
        }
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            return Err(ApiError::ServerError {
                error: body["error"].as_str().unwrap_or("unknown").to_string(),
                message: body["message"]
                    .as_str()
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error"))
                    .to_string(),
            });
        }
        Ok(response)
    }

    pub async fn user(&self) -> Result<UserStatus, ApiError> {
        let response = self
            .send(self.request(reqwest::Method::GET, "/api/auth/user"))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.request(reqwest::Method::POST, "/api/auth/logout"))
            .await?;
        Ok(())
    }

    /// Creates a calendar event for a study session and returns it.
    pub async fn schedule(&self, title: &str, description: Option<&str>) -> Result<Value, ApiError> {
        if self.session.is_none() {
            return Err(ApiError::NotLoggedIn);
        }
        let request = self
            .request(reqwest::Method::POST, "/api/calendar/event")
            .json(&json!({ "title": title, "description": description }));
        Ok(self.send(request).await?.json().await?)
    }

    pub async fn check_assignment(&self, repo_link: &str, topic_title: &str) -> Result<Review, ApiError> {
        let request = self
            .request(reqwest::Method::POST, "/api/assignment/check")
            .json(&json!({ "repoLink": repo_link, "topicTitle": topic_title }));
        Ok(self.send(request).await?.json().await?)
    }
}
