//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::TiedGamePolicy;
use crate::models::DEFAULT_LEAGUE;
use crate::parse_ttl;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Standings computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsConfig {
    /// How long a computed snapshot stays fresh (e.g. "5m", "90s")
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// What to do with tied-score games: "skip" or "reject"
    #[serde(default)]
    pub tied_games: TiedGamePolicy,

    /// League shown when none is requested
    #[serde(default = "default_league")]
    pub default_league: String,
}

fn default_cache_ttl() -> String {
    "5m".to_string()
}

fn default_league() -> String {
    DEFAULT_LEAGUE.to_string()
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
            tied_games: TiedGamePolicy::default(),
            default_league: default_league(),
        }
    }
}

impl StandingsConfig {
    /// Parsed cache freshness window.
    pub fn cache_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        parse_ttl(&self.cache_ttl).ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid standings.cache_ttl: {:?}", self.cache_ttl))
        })
    }
}

/// Draft settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_rounds() -> u32 {
    7
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub standings: StandingsConfig,

    #[serde(default)]
    pub draft: DraftConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            standings: StandingsConfig::default(),
            draft: DraftConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.standings.cache_ttl()?;
        if ttl <= chrono::Duration::zero() {
            return Err(ConfigError::ValidationError(
                "Standings cache TTL must be greater than 0".to_string(),
            ));
        }

        if self.standings.default_league.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Default league must not be empty".to_string(),
            ));
        }

        if self.draft.rounds == 0 {
            return Err(ConfigError::ValidationError(
                "Draft rounds must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
