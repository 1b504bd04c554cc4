//! OAuth2 authorization-code flow and token refresh.

use chrono::Utc;
use serde::Deserialize;

use super::error::check;
use super::{GoogleClient, GoogleError, Tokens, SCOPES};

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl TokenResponse {
    fn into_tokens(self, now_ms: i64) -> Tokens {
        Tokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scope: self.scope,
            token_type: self.token_type,
            id_token: self.id_token,
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
        }
    }
}

impl GoogleClient {
    /// Consent screen URL. Requests offline access so a refresh token is issued.
    pub fn auth_url(&self, state: &str) -> String {
        let config = &self.config;
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            config.auth_url,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
            urlencoding::encode(state),
        )
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<Tokens, GoogleError> {
        let config = &self.config;
        let response = self
            .http
            .post(&config.token_url)
            .form(&[
                ("code", code),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let body: TokenResponse = check(response).await?.json().await?;
        Ok(body.into_tokens(Utc::now().timestamp_millis()))
    }

    /// Obtains a new access token. The refresh token is kept when Google
    /// does not issue a new one.
    pub async fn refresh(&self, tokens: &Tokens) -> Result<Tokens, GoogleError> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or(GoogleError::NoRefreshToken)?;

        let config = &self.config;
        let response = self
            .http
            .post(&config.token_url)
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let body: TokenResponse = check(response).await?.json().await?;
        let mut fresh = body.into_tokens(Utc::now().timestamp_millis());
        if fresh.refresh_token.is_none() {
            fresh.refresh_token = tokens.refresh_token.clone();
        }
        Ok(fresh)
    }

    /// Returns usable tokens, refreshing them first if they have expired.
    ///
    /// The flag is true when the tokens changed and should be stored again.
    pub async fn ensure_fresh(&self, tokens: Tokens) -> Result<(Tokens, bool), GoogleError> {
        if !tokens.is_expired_now() {
            return Ok((tokens, false));
        }
        tracing::debug!("Access token expired, refreshing");
        let fresh = self.refresh(&tokens).await?;
        Ok((fresh, true))
    }

    /// Profile of the signed-in user.
    pub async fn user_info(&self, tokens: &Tokens) -> Result<serde_json::Value, GoogleError> {
        let response = self
            .http
            .get(self.api_url("/oauth2/v2/userinfo"))
            .bearer_auth(&tokens.access_token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::GoogleConfig;

    #[test]
    fn test_auth_url_contains_flow_parameters() {
        let client = GoogleClient::new(GoogleConfig::new(
            "client-123",
            "secret",
            "http://localhost:3008/api/auth/callback",
        ));

        let url = client.auth_url("state-abc");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3008%2Fapi%2Fauth%2Fcallback"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=state-abc"));
        assert!(url.contains("drive.file"));
        assert!(url.contains("calendar.events"));
    }

    #[test]
    fn test_token_response_sets_expiry() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "a", "expires_in": 3600, "token_type": "Bearer"}"#,
        )
        .unwrap();

        let tokens = response.into_tokens(1_000);

        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.expiry_date, Some(3_601_000));
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let client = GoogleClient::new(GoogleConfig::new("id", "secret", "http://cb"));
        let tokens = Tokens {
            access_token: "a".to_string(),
            refresh_token: None,
            scope: None,
            token_type: None,
            id_token: None,
            expiry_date: Some(0),
        };

        let result = client.ensure_fresh(tokens).await;

        assert!(matches!(result, Err(GoogleError::NoRefreshToken)));
    }
}
