//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tienda_core::DEFAULT_LOW_STOCK_THRESHOLD;
use tienda_db::{CheckoutConfig, DbConfig};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub db_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Bounded wait for product locks during checkout
    pub lock_timeout: Duration,

    /// Transparent retries of transient checkout failures
    pub checkout_retries: u32,

    /// Products below this stock count as low on the dashboard
    pub low_stock_threshold: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 3001,
            db_path: "./tienda.db".to_string(),
            db_max_connections: 5,
            lock_timeout: Duration::from_millis(5000),
            checkout_retries: 3,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            host: env::var("TIENDA_HOST").unwrap_or(defaults.host),
            port: parse_var("TIENDA_PORT", defaults.port)?,
            db_path: env::var("TIENDA_DB_PATH").unwrap_or(defaults.db_path),
            db_max_connections: parse_var("TIENDA_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            lock_timeout: Duration::from_millis(parse_var("TIENDA_LOCK_TIMEOUT_MS", 5000u64)?),
            checkout_retries: parse_var("TIENDA_CHECKOUT_RETRIES", defaults.checkout_retries)?,
            low_stock_threshold: parse_var(
                "TIENDA_LOW_STOCK_THRESHOLD",
                defaults.low_stock_threshold,
            )?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TIENDA_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.db_max_connections)
    }

    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig::default()
            .lock_timeout(self.lock_timeout)
            .max_retries(self.checkout_retries)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
