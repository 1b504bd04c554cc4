/// Errors that can occur when calling Google APIs.
#[derive(Debug)]
pub enum GoogleError {
    /// Request could not be sent or the response not read
    Http(String),
    /// Google answered with a non-success status
    Api { status: u16, message: String },
    /// Response body did not have the expected shape
    Decode(String),
    /// Access token expired and no refresh token is available
    NoRefreshToken,
}

impl GoogleError {
    /// True when the error means the stored credentials are no longer usable.
    pub fn is_auth_error(&self) -> bool {
        match self {
            GoogleError::Api { status, .. } => *status == 400 || *status == 401,
            GoogleError::NoRefreshToken => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for GoogleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleError::Http(e) => write!(f, "HTTP error: {}", e),
            GoogleError::Api { status, message } => {
                write!(f, "Google API returned {}: {}", status, message)
            }
            GoogleError::Decode(e) => write!(f, "Unexpected response: {}", e),
            GoogleError::NoRefreshToken => {
                write!(f, "Access token expired and no refresh token is stored")
            }
        }
    }
}

impl std::error::Error for GoogleError {}

impl From<reqwest::Error> for GoogleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GoogleError::Decode(e.to_string())
        } else {
            GoogleError::Http(e.to_string())
        }
    }
}

/// Passes successful responses through and turns the rest into [`GoogleError::Api`].
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, GoogleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(GoogleError::Api {
        status: status.as_u16(),
        message,
    })
}
