//! Configuration module for the joint degree site backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::tracking::TrackingMode;

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SITE_BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid SITE_DOWNLOAD_TRACKING: {0}")]
    TrackingMode(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Path to the resource catalog JSON document
    pub catalog_path: PathBuf,
    /// Directory that catalogued `file` paths are resolved against
    pub public_root: PathBuf,
    /// Whether downloads are only logged or also counted in SQLite
    pub tracking: TrackingMode,
    /// Path to the SQLite download counter database (sqlite tracking only)
    pub db_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let bind_value =
            env::var("SITE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr: SocketAddr = bind_value
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: bind_value.clone(),
                source,
            })?;

        let catalog_path = env::var("SITE_CATALOG_PATH")
            .unwrap_or_else(|_| "./content/resources.json".to_string())
            .into();

        let public_root = env::var("SITE_PUBLIC_ROOT")
            .unwrap_or_else(|_| "./public".to_string())
            .into();

        let tracking: TrackingMode = env::var("SITE_DOWNLOAD_TRACKING")
            .unwrap_or_else(|_| "log".to_string())
            .parse()
            .map_err(ConfigError::TrackingMode)?;

        let db_path = env::var("SITE_DB_PATH")
            .unwrap_or_else(|_| "./data/downloads.sqlite".to_string())
            .into();

        let log_level = env::var("SITE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            bind_addr,
            catalog_path,
            public_root,
            tracking,
            db_path,
            log_level,
        })
    }
}
