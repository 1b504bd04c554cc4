use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use studytrack_core::MergePolicy;

const DEFAULT_SERVER_URL: &str = "http://localhost:3008";
const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the StudyTrack server
    pub server_url: ConfigValue<String>,
    /// Value of the server's session cookie
    #[serde(skip_serializing)]
    pub session: ConfigValue<Option<String>>,
    /// How a fetched remote document is applied to the local one
    pub merge_policy: ConfigValue<MergePolicy>,
    /// Quiet period before a change is saved
    pub debounce_ms: ConfigValue<u64>,
    /// Curriculum used when nothing is stored remotely yet
    pub seed_path: ConfigValue<Option<PathBuf>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    server_url: Option<String>,
    session: Option<String>,
    merge_policy: Option<MergePolicy>,
    debounce_ms: Option<u64>,
    seed_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    fn load_with_env(
        config_path: Option<PathBuf>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut server_url =
            ConfigValue::new(DEFAULT_SERVER_URL.to_string(), ConfigSource::Default);
        let mut session = ConfigValue::new(None, ConfigSource::Default);
        let mut merge_policy = ConfigValue::new(MergePolicy::default(), ConfigSource::Default);
        let mut debounce_ms = ConfigValue::new(DEFAULT_DEBOUNCE_MS, ConfigSource::Default);
        let mut seed_path = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            if let Some(url) = file_config.server_url {
                server_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(value) = file_config.session.filter(|s| !s.is_empty()) {
                session = ConfigValue::new(Some(value), ConfigSource::File);
            }
            if let Some(policy) = file_config.merge_policy {
                merge_policy = ConfigValue::new(policy, ConfigSource::File);
            }
            if let Some(ms) = file_config.debounce_ms {
                debounce_ms = ConfigValue::new(ms, ConfigSource::File);
            }
            if let Some(seed) = file_config.seed_path {
                // Resolve relative paths against config file's directory
                let resolved = if seed.is_relative() {
                    path.parent().map(|p| p.join(&seed)).unwrap_or(seed)
                } else {
                    seed
                };
                seed_path = ConfigValue::new(Some(resolved), ConfigSource::File);
            }

            config_file = Some(path);
        }

        // Apply environment variable overrides
        if let Some(url) = var("STUDY_SERVER_URL") {
            server_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Some(value) = var("STUDY_SESSION") {
            session = ConfigValue::new(Some(value), ConfigSource::Environment);
        }
        if let Some(policy) = var("STUDY_MERGE_POLICY") {
            let policy = policy
                .parse()
                .map_err(|e: String| ConfigError::InvalidValue("STUDY_MERGE_POLICY", e))?;
            merge_policy = ConfigValue::new(policy, ConfigSource::Environment);
        }

        Ok(Self {
            server_url,
            session,
            merge_policy,
            debounce_ms,
            seed_path,
            config_file,
        })
    }

    /// File that settings are written back to.
    pub fn writable_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(Self::default_config_path)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/studytrack/
    /// - macOS: ~/Library/Application Support/studytrack/
    /// - Windows: %APPDATA%/studytrack/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studytrack")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Sets (or with `None`, removes) the `session` key in the config file,
/// keeping the rest of the file as it is.
pub fn write_session(config_path: &Path, session: Option<&str>) -> Result<(), ConfigError> {
    let mut yaml: serde_yaml::Value = if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| ConfigError::ReadError(config_path.to_path_buf(), e))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(config_path.to_path_buf(), e))?
    } else {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    };

    // An empty file parses as null
    if yaml.is_null() {
        yaml = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
    }
    let mapping = yaml
        .as_mapping_mut()
        .ok_or_else(|| ConfigError::WriteError(config_path.to_path_buf(), "not a mapping".into()))?;

    let key = serde_yaml::Value::String("session".to_string());
    match session {
        Some(value) => {
            mapping.insert(key, serde_yaml::Value::String(value.to_string()));
        }
        None => {
            mapping.remove(&key);
        }
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::WriteError(config_path.to_path_buf(), e.to_string()))?;
    }
    let contents = serde_yaml::to_string(&yaml)
        .map_err(|e| ConfigError::WriteError(config_path.to_path_buf(), e.to_string()))?;
    std::fs::write(config_path, contents)
        .map_err(|e| ConfigError::WriteError(config_path.to_path_buf(), e.to_string()))
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    WriteError(PathBuf, String),
    InvalidValue(&'static str, String),
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
            ConfigError::WriteError(path, e) => {
                write!(f, "Failed to write config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, e) => write!(f, "Invalid {}: {}", name, e),
        }
    }
}

impl std::error::Error for ConfigError {}
