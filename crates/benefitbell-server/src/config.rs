//! Configuration management

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ingest::config::JobsConfig;
use crate::welfare::WelfareConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/benefitbell";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Parse an environment variable, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub welfare: WelfareConfig,
    pub jobs: JobsConfig,
    pub notify: NotifyConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Cron authentication and push delivery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Bearer secret required on cron routes when set
    #[serde(skip_serializing)]
    pub cron_secret: Option<String>,
    /// Push relay endpoint; notifications are only logged without it
    pub relay_url: Option<String>,
    #[serde(skip_serializing)]
    pub relay_token: Option<String>,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        Self {
            cron_secret: env_opt("CRON_SECRET"),
            relay_url: env_opt("PUSH_RELAY_URL"),
            relay_token: env_opt("PUSH_RELAY_TOKEN"),
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("BELL_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("BELL_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "BELL_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or(
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            welfare: WelfareConfig::from_env(),
            jobs: JobsConfig::from_env(),
            notify: NotifyConfig::from_env(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        // Browsers reject a wildcard origin combined with credentials
        if self.cors.allow_credentials && self.cors.allowed_origins.iter().any(|o| o == "*") {
            anyhow::bail!("CORS_ALLOW_CREDENTIALS cannot be combined with a '*' origin");
        }

        if self.notify.cron_secret.is_none() {
            tracing::warn!("CRON_SECRET is not set - cron routes are unauthenticated");
        }

        self.welfare.validate()?;
        self.jobs.validate()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            welfare: WelfareConfig::default(),
            jobs: JobsConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_min_connections_above_max_is_rejected() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_origin_with_credentials_is_rejected() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec!["*".to_string()];
        assert!(config.validate().is_err());

        config.cors.allow_credentials = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_reads_environment() {
        std::env::set_var("BELL_PORT", "9100");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://benefitbell.kr, https://www.benefitbell.kr");
        std::env::set_var("CRON_SECRET", "s3cret");
        std::env::set_var("WELFARE_MAX_PAGES", "3");

        let config = Config::load().unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.cors.allowed_origins.len(), 2);
        assert_eq!(config.notify.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.welfare.max_pages, 3);

        for key in ["BELL_PORT", "CORS_ALLOWED_ORIGINS", "CRON_SECRET", "WELFARE_MAX_PAGES"] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_fall_back_to_defaults() {
        std::env::set_var("BELL_PORT", "not-a-port");
        assert_eq!(env_or("BELL_PORT", DEFAULT_SERVER_PORT), DEFAULT_SERVER_PORT);
        std::env::remove_var("BELL_PORT");
    }
}
