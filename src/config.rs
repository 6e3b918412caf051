//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Connection options for the cache store backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store network address
    pub host: String,
    /// Store network port
    pub port: u16,
    /// Namespace index within the store
    pub db: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache store connection options
    pub store: StoreConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in seconds applied to cached entries
    pub default_ttl: u64,
    /// Path to the delimited dataset with a header row
    pub dataset_path: PathBuf,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_HOST` - Store address (default: 127.0.0.1)
    /// - `STORE_PORT` - Store port (default: 6379)
    /// - `STORE_DB` - Store namespace index (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL` - Entry TTL in seconds (default: 900)
    /// - `DATASET_PATH` - Dataset file (default: data/flights.csv)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig {
                host: env::var("STORE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("STORE_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(6379),
                db: env::var("STORE_DB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            },
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            dataset_path: env::var("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/flights.csv")),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            server_port: 3000,
            default_ttl: 900,
            dataset_path: PathBuf::from("data/flights.csv"),
            cleanup_interval: 1,
        }
    }
}
