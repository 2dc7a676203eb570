//! Configuration loading and representation.
//!
//! Everything has a default; the environment only overrides. Malformed
//! values are reported rather than silently replaced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use roster_observability::LogFormat;
use roster_players::slug::DEFAULT_PROBE_LIMIT;

pub const ENV_LOG: &str = "ROSTER_LOG";
pub const ENV_LOG_FORMAT: &str = "ROSTER_LOG_FORMAT";
pub const ENV_IMPORT_PREVIEW_LIMIT: &str = "ROSTER_IMPORT_PREVIEW_LIMIT";
pub const ENV_SLUG_PROBE_LIMIT: &str = "ROSTER_SLUG_PROBE_LIMIT";
pub const ENV_COMMIT_RETRIES: &str = "ROSTER_COMMIT_RETRIES";
pub const ENV_ADMIN_USERNAME: &str = "ROSTER_ADMIN_USERNAME";
pub const ENV_ADMIN_EMAIL: &str = "ROSTER_ADMIN_EMAIL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is not set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Bulk import tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Rejections listed before collapsing the rest into a count.
    pub preview_limit: usize,
    pub slug_probe_limit: usize,
    /// Extra commit attempts after a slug conflict.
    pub commit_retries: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            preview_limit: 10,
            slug_probe_limit: DEFAULT_PROBE_LIMIT,
            commit_retries: 3,
        }
    }
}

/// The account created on first start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@magallanes.datanalytics.pro".to_string(),
            first_name: "Admin".to_string(),
            last_name: "Magallanes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub import: ImportConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(filter) = get(ENV_LOG) {
            config.log.filter = filter;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            config.log.format = format.parse().map_err(|e: roster_observability::LogFormatParseError| {
                ConfigError::Invalid {
                    key: ENV_LOG_FORMAT,
                    value: format.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(v) = get(ENV_IMPORT_PREVIEW_LIMIT) {
            config.import.preview_limit = parse_count(ENV_IMPORT_PREVIEW_LIMIT, &v)?;
        }
        if let Some(v) = get(ENV_SLUG_PROBE_LIMIT) {
            config.import.slug_probe_limit = parse_count(ENV_SLUG_PROBE_LIMIT, &v)?;
            if config.import.slug_probe_limit == 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_SLUG_PROBE_LIMIT,
                    value: v,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if let Some(v) = get(ENV_COMMIT_RETRIES) {
            config.import.commit_retries = parse_count(ENV_COMMIT_RETRIES, &v)?;
        }

        if let Some(username) = get(ENV_ADMIN_USERNAME) {
            config.admin.username = username;
        }
        if let Some(email) = get(ENV_ADMIN_EMAIL) {
            config.admin.email = email;
        }

        Ok(config)
    }
}

fn parse_count(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
