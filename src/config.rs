//! Configuration management for the rental server

use chrono::FixedOffset;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Bearer tokens are issued by the external identity provider and signed with this secret
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    /// When set, logs are also written to a daily rolling file in this directory
    #[serde(default)]
    pub directory: Option<String>,
}

/// Local clock of the business; decides which dates count as "in the past"
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessConfig {
    /// Minutes east of UTC (420 for WIB)
    pub utc_offset_minutes: i32,
}

impl BusinessConfig {
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Message(format!(
                "business.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub business: BusinessConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix RENTAL_ (e.g. RENTAL_SERVER_PORT)
            .add_source(
                Environment::with_prefix("RENTAL")
                    .separator("_")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.business.utc_offset()?;
        Ok(config)
    }

    pub fn is_json_logging(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 7 * 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("database.url", "postgres://u:p@db/rental")
            .unwrap()
            .set_override("database.max_connections", 5)
            .unwrap()
            .set_override("database.min_connections", 1)
            .unwrap()
            .set_override("auth.jwt_secret", "secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(!config.is_json_logging());
        assert!(config.logging.directory.is_none());
        assert_eq!(
            config.business.utc_offset().unwrap(),
            FixedOffset::east_opt(7 * 3600).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let business = BusinessConfig {
            utc_offset_minutes: 24 * 60,
        };
        assert!(business.utc_offset().is_err());
    }
}
