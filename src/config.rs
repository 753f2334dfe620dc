//! Configuration management for SoilSync
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.soilsync/config.toml

use crate::errors::{Result, SoilSyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `predictor.api_key`
pub const API_KEY_ENV: &str = "SOILSYNC_API_KEY";

/// Environment variable overriding `predictor.endpoint`
pub const ENDPOINT_ENV: &str = "SOILSYNC_PREDICTOR_URL";

/// Complete configuration for SoilSync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote predictor connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// When false, skip the remote call and always use the local engine
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
}

/// Local engine behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for reproducible variance
    pub seed: Option<u64>,
    /// Disable variance entirely
    pub deterministic: bool,
}

/// Where audit records go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    None,
    Tracing,
    Jsonl,
    Rest,
}

/// Persistence collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub sink: AuditSinkKind,
    /// JSONL file for the `jsonl` sink
    pub path: String,
    /// Base URL of the REST store for the `rest` sink
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 5000,
            api_key: None,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: AuditSinkKind::Tracing,
            path: "~/.soilsync/audit.jsonl".to_string(),
            url: None,
            api_key: None,
            table: "predictions".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PredictorConfig {
    /// Configuration pointing at an endpoint, other fields default
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Endpoint without a trailing slash
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(SoilSyncError::ConfigError(
                "predictor.timeout_ms must be between 1 and 60000".to_string()
            ));
        }

        if self.enabled
            && !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://"))
        {
            return Err(SoilSyncError::ConfigError(
                format!("predictor.endpoint must be an http(s) URL, got '{}'", self.endpoint)
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply env overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(&config_path)?
        } else {
            Self::load_default()?
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SoilSyncError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| SoilSyncError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.soilsync/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".soilsync").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.predictor.api_key = Some(key);
            }
        }
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                self.predictor.endpoint = endpoint;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.predictor.validate()?;

        if self.audit.sink == AuditSinkKind::Rest && self.audit.url.is_none() {
            return Err(SoilSyncError::ConfigError(
                "audit.url is required for the rest sink".to_string()
            ));
        }

        if self.audit.sink == AuditSinkKind::Jsonl && self.audit.path.trim().is_empty() {
            return Err(SoilSyncError::ConfigError(
                "audit.path is required for the jsonl sink".to_string()
            ));
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(SoilSyncError::ConfigError(
                format!("Invalid log level: {}", self.logging.level)
            )),
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SoilSyncError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SoilSyncError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SoilSyncError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Resolved JSONL audit path
    pub fn audit_path(&self) -> PathBuf {
        Self::expand_path(&self.audit.path)
    }
}
