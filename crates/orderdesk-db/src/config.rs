//! Runtime configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use orderdesk_core::DEFAULT_PLACEMENT_ATTEMPTS;

use crate::pool::DbConfig;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,orderdesk=debug,sqlx=warn";

/// orderdesk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database file (`ORDERDESK_DB_PATH`)
    pub database_path: PathBuf,

    /// Pool size (`ORDERDESK_MAX_CONNECTIONS`)
    pub max_connections: u32,

    /// Placement attempts on write conflicts (`ORDERDESK_PLACEMENT_ATTEMPTS`)
    pub placement_attempts: u32,

    /// tracing filter directive (`RUST_LOG`)
    pub log_filter: String,
}

impl Settings {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Settings {
            database_path: lookup("ORDERDESK_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./orderdesk.db")),

            max_connections: lookup("ORDERDESK_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ORDERDESK_MAX_CONNECTIONS".to_string()))?,

            placement_attempts: lookup("ORDERDESK_PLACEMENT_ATTEMPTS")
                .unwrap_or_else(|| DEFAULT_PLACEMENT_ATTEMPTS.to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("ORDERDESK_PLACEMENT_ATTEMPTS".to_string())
                })?,

            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };

        if settings.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "ORDERDESK_MAX_CONNECTIONS".to_string(),
            ));
        }
        if settings.placement_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "ORDERDESK_PLACEMENT_ATTEMPTS".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Pool configuration for these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .placement_attempts(self.placement_attempts)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
