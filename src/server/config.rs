//! Server configuration.
//!
//! Values come from an optional YAML file and are overridden by environment
//! variables:
//!
//! - `STUDYTRACK_PORT`: port to listen on (default: 3008)
//! - `STUDYTRACK_BASE_URL`: public URL of the app (default: http://localhost:3008)
//! - `STUDYTRACK_ENV`: `production` enables `Secure` cookies
//! - `STUDYTRACK_CONFIG`: path to the config file
//!   (default: <config_dir>/studytrack-server/config.yaml)
//! - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`
//! - `APP_SECRET`: secret the session cookie key is derived from (required
//!   in production)
//! - `GEMINI_API_KEY`: enables assignment review responses
//!
//! # Config File Format
//!
//! ```yaml
//! port: 3008
//! google_client_id: "..."
//! google_client_secret: "..."
//! google_redirect_uri: "http://localhost:3008/api/auth/callback"
//! app_secret: "..."
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::google::{GoogleConfig, DEFAULT_API_BASE, DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL};

const DEFAULT_PORT: u16 = 3008;

/// Config file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    port: Option<u16>,
    base_url: Option<String>,
    production: Option<bool>,
    google_client_id: Option<String>,
    google_client_secret: Option<String>,
    google_redirect_uri: Option<String>,
    google_auth_url: Option<String>,
    google_token_url: Option<String>,
    google_api_base: Option<String>,
    app_secret: Option<String>,
    gemini_api_key: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub base_url: String,
    pub production: bool,
    pub google: GoogleConfig,
    pub app_secret: String,
    pub gemini_api_key: Option<String>,
    /// Config file that was read, if any
    pub config_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("STUDYTRACK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_config_path());
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file at `path`; a missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let (file, config_file) = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
            let file: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
            (file, Some(path.to_path_buf()))
        } else {
            (ConfigFile::default(), None)
        };

        let mut google = GoogleConfig::new(
            file.google_client_id.unwrap_or_default(),
            file.google_client_secret.unwrap_or_default(),
            file.google_redirect_uri.unwrap_or_default(),
        );
        google.auth_url = file
            .google_auth_url
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        google.token_url = file
            .google_token_url
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());
        google.api_base = file
            .google_api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            port: file.port.unwrap_or(DEFAULT_PORT),
            base_url: file.base_url.unwrap_or_default(),
            production: file.production.unwrap_or(false),
            google,
            app_secret: file.app_secret.unwrap_or_default(),
            gemini_api_key: file.gemini_api_key.filter(|k| !k.is_empty()),
            config_file,
        })
    }

    /// Applies environment overrides read through `var`, then fills the
    /// values derived from others.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(port) = var("STUDYTRACK_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(url) = var("STUDYTRACK_BASE_URL") {
            self.base_url = url;
        }
        if let Some(env) = var("STUDYTRACK_ENV") {
            self.production = env == "production";
        }
        if let Some(id) = var("GOOGLE_CLIENT_ID") {
            self.google.client_id = id;
        }
        if let Some(secret) = var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = secret;
        }
        if let Some(uri) = var("GOOGLE_REDIRECT_URI") {
            self.google.redirect_uri = uri;
        }
        if let Some(secret) = var("APP_SECRET") {
            self.app_secret = secret;
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key).filter(|k| !k.is_empty());
        }
        if self.base_url.is_empty() {
            self.base_url = format!("http://localhost:{}", self.port);
        }
        if self.google.redirect_uri.is_empty() {
            self.google.redirect_uri = format!("{}/api/auth/callback", self.base_url);
        }
        Ok(())
    }

    /// Rejects settings the server must not run with.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.production && self.app_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }

    /// Default config file path (platform config dir + studytrack-server/config.yaml)
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studytrack-server")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidPort(String),
    MissingSecret,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidPort(port) => write!(f, "Invalid port: {}", port),
            ConfigError::MissingSecret => {
                write!(f, "APP_SECRET must be set when running in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let mut config = ServerConfig::from_file(&temp_dir.path().join("none.yaml")).unwrap();
        config.apply_env(env(&[])).unwrap();

        assert_eq!(config.port, 3008);
        assert!(!config.production);
        assert!(config.config_file.is_none());
        assert_eq!(config.google.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(
            config.google.redirect_uri,
            "http://localhost:3008/api/auth/callback"
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "port: 9000").unwrap();
        writeln!(file, "google_client_id: file-client").unwrap();
        writeln!(file, "google_api_base: http://127.0.0.1:7000").unwrap();
        writeln!(file, "gemini_api_key: \"\"").unwrap();

        let mut config = ServerConfig::from_file(&path).unwrap();
        config.apply_env(env(&[])).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.google.client_id, "file-client");
        assert_eq!(config.google.api_base, "http://127.0.0.1:7000");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "google_client_id: file-client").unwrap();
        writeln!(file, "google_redirect_uri: http://file/cb").unwrap();

        let mut config = ServerConfig::from_file(&path).unwrap();
        config
            .apply_env(env(&[
                ("GOOGLE_CLIENT_ID", "env-client"),
                ("STUDYTRACK_ENV", "production"),
                ("GEMINI_API_KEY", "key"),
            ]))
            .unwrap();

        assert_eq!(config.google.client_id, "env-client");
        assert_eq!(config.google.redirect_uri, "http://file/cb");
        assert!(config.production);
        assert_eq!(config.gemini_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_port_override_moves_default_urls() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "port: 9000\n").unwrap();

        let mut config = ServerConfig::from_file(&path).unwrap();
        config.apply_env(env(&[("STUDYTRACK_PORT", "9100")])).unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.base_url, "http://localhost:9100");
        assert_eq!(
            config.google.redirect_uri,
            "http://localhost:9100/api/auth/callback"
        );
    }

    #[test]
    fn test_explicit_base_url_is_kept() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "base_url: https://study.example.com\n").unwrap();

        let mut config = ServerConfig::from_file(&path).unwrap();
        config.apply_env(env(&[("STUDYTRACK_PORT", "9100")])).unwrap();

        assert_eq!(config.base_url, "https://study.example.com");
    }

    #[test]
    fn test_production_requires_secret() {
        let temp_dir = tempdir().unwrap();
        let mut config = ServerConfig::from_file(&temp_dir.path().join("none.yaml")).unwrap();
        config.apply_env(env(&[("STUDYTRACK_ENV", "production")])).unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret));

        config.apply_env(env(&[("APP_SECRET", "s3cret")])).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_allows_missing_secret() {
        let temp_dir = tempdir().unwrap();
        let mut config = ServerConfig::from_file(&temp_dir.path().join("none.yaml")).unwrap();
        config.apply_env(env(&[])).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_env() {
        let temp_dir = tempdir().unwrap();
        let mut config = ServerConfig::from_file(&temp_dir.path().join("none.yaml")).unwrap();
        let err = config
            .apply_env(env(&[("STUDYTRACK_PORT", "eighty")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid port: eighty");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let err = ServerConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
