//! Configuration management for ravcat
//!
//! Configuration is read once at start-up from `./config/ravcat.toml`.
//! Every key is optional: anything left out falls back to the per-directory
//! defaults in [`SourceConfig::companies`] and [`SourceConfig::vendors`].

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/ravcat.toml";

/// Configuration template written by `ravcat init`
pub const DEFAULT_CONFIG: &str = include_str!("../config/ravcat.toml");

/// Offline company dataset compiled into the binary
pub const BUNDLED_COMPANY_FALLBACK: &str = include_str!("../config/fallback_companies.json");

/// Offline vendor dataset compiled into the binary
pub const BUNDLED_VENDOR_FALLBACK: &str = include_str!("../config/fallback_vendors.json");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url} (expected http:// or https://)")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty or zero")]
    EmptyRequired { field: String },

    #[error("Invalid fallback dataset {path}: {error}")]
    InvalidFallback { path: PathBuf, error: String },
}

/// Settings for one remote directory source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    /// How long a fetched directory is served from memory
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Total number of GET attempts, including the first one
    pub retry_attempts: u32,
    /// Fixed pause between two attempts
    pub retry_delay: Duration,
    pub user_agent: String,
    /// Offline dataset, in the same JSON shape as the remote document
    pub fallback_data: serde_json::Value,
}

impl SourceConfig {
    /// Defaults for the general company directory.
    pub fn companies() -> Self {
        Self {
            url: "https://github.com/ravenastar-js/gd/raw/refs/heads/main/report.json".to_string(),
            cache_ttl: Duration::from_millis(60 * 60 * 1000),
            timeout: Duration::from_millis(10_000),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(2000),
            user_agent: "RavCat-CLI/1.0.0".to_string(),
            fallback_data: parse_bundled(BUNDLED_COMPANY_FALLBACK),
        }
    }

    /// Defaults for the security vendor directory.
    pub fn vendors() -> Self {
        Self {
            url: "https://github.com/ravenastar-js/gd/raw/refs/heads/main/db/vtfp.json".to_string(),
            cache_ttl: Duration::from_millis(24 * 60 * 60 * 1000),
            timeout: Duration::from_millis(15_000),
            retry_attempts: 1,
            retry_delay: Duration::from_millis(2000),
            user_agent: "RavCat-VirusTotal/1.0.0".to_string(),
            fallback_data: parse_bundled(BUNDLED_VENDOR_FALLBACK),
        }
    }

    /// Overlay the keys present in `raw` onto `self`.
    fn merge(mut self, raw: RawSourceConfig, base_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(url) = raw.url {
            self.url = url;
        }
        if let Some(ms) = raw.cache_ttl_ms {
            self.cache_ttl = Duration::from_millis(ms);
        }
        if let Some(ms) = raw.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = raw.retry_attempts {
            self.retry_attempts = attempts;
        }
        if let Some(ms) = raw.retry_delay_ms {
            self.retry_delay = Duration::from_millis(ms);
        }
        if let Some(user_agent) = raw.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(file) = raw.fallback_file {
            let path = if file.is_absolute() { file } else { base_dir.join(file) };
            self.fallback_data = read_fallback_file(&path)?;
        }
        Ok(self)
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl {
                field: format!("{}.url", section),
                url: self.url.clone(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: format!("{}.user_agent", section),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::EmptyRequired {
                field: format!("{}.timeout_ms", section),
            });
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::EmptyRequired {
                field: format!("{}.cache_ttl_ms", section),
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::EmptyRequired {
                field: format!("{}.retry_attempts", section),
            });
        }
        Ok(())
    }
}

/// Root configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub companies: SourceConfig,
    pub vendors: SourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            companies: SourceConfig::companies(),
            vendors: SourceConfig::vendors(),
        }
    }
}

/// On-disk form: every key optional
#[derive(Debug, Default, Deserialize)]
struct RawAppConfig {
    #[serde(default)]
    companies: RawSourceConfig,
    #[serde(default)]
    vendors: RawSourceConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawSourceConfig {
    url: Option<String>,
    cache_ttl_ms: Option<u64>,
    timeout_ms: Option<u64>,
    retry_attempts: Option<u32>,
    retry_delay_ms: Option<u64>,
    user_agent: Option<String>,
    fallback_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path.
    ///
    /// Relative `fallback_file` entries resolve against the working directory.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content, Path::new("."))
    }

    /// Parse a TOML document, resolving relative fallback paths against `base_dir`.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw: RawAppConfig = toml::from_str(content)?;
        let config = Self {
            companies: SourceConfig::companies().merge(raw.companies, base_dir)?,
            vendors: SourceConfig::vendors().merge(raw.vendors, base_dir)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.companies.validate("companies")?;
        self.vendors.validate("vendors")?;
        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        Self::create_default_config_at(Path::new(CONFIG_PATH))
    }

    pub fn create_default_config_at(path: &Path) -> Result<PathBuf, ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }
}

fn parse_bundled(content: &str) -> serde_json::Value {
    serde_json::from_str(content).unwrap_or_else(|e| {
        tracing::error!("Bundled fallback dataset is not valid JSON: {}", e);
        serde_json::Value::Null
    })
}

fn read_fallback_file(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::InvalidFallback {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFallback {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
