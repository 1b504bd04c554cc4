//! Remote store backed by the StudyTrack server's `/api/drive/data` endpoint.

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;

use super::{RemoteError, RemoteStore};
use crate::models::Curriculum;

/// Name of the cookie carrying the server session.
pub const SESSION_COOKIE: &str = "google_tokens";

const DATA_PATH: &str = "/api/drive/data";

#[derive(Deserialize)]
struct DataResponse {
    data: Option<Curriculum>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, session: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn data_url(&self) -> String {
        format!("{}{}", self.base_url, DATA_PATH)
    }

    fn with_session(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => {
                request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session))
            }
            None => request,
        }
    }
}

/// Maps a non-success response to a [`RemoteError`].
async fn error_for(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return RemoteError::Unauthorized;
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
    RemoteError::Status(status.as_u16(), message)
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self) -> Result<Option<Curriculum>, RemoteError> {
        if self.session.is_none() {
            return Err(RemoteError::Unauthorized);
        }

        let response = self
            .with_session(self.client.get(self.data_url()))
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for(response).await);
        }

        let body: DataResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(body.data)
    }

    async fn save(&self, doc: &Curriculum) -> Result<(), RemoteError> {
        if self.session.is_none() {
            return Err(RemoteError::Unauthorized);
        }

        let response = self
            .with_session(self.client.post(self.data_url()))
            .json(doc)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_trims_trailing_slash() {
        let store = HttpRemoteStore::new("http://localhost:3008/", None);
        assert_eq!(store.data_url(), "http://localhost:3008/api/drive/data");
    }

    #[tokio::test]
    async fn test_fetch_without_session_is_unauthorized() {
        let store = HttpRemoteStore::new("http://127.0.0.1:9", None);
        let result = store.fetch().await;
        assert!(matches!(result, Err(RemoteError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_save_without_session_is_unauthorized() {
        let store = HttpRemoteStore::new("http://127.0.0.1:9", None);
        let result = store.save(&Curriculum::bundled()).await;
        assert!(matches!(result, Err(RemoteError::Unauthorized)));
    }

    #[test]
    fn test_data_response_null() {
        let body: DataResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(body.data.is_none());
    }
}
