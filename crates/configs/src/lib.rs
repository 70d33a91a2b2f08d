//! Application configuration
//!
//! Settings are layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. Config file (`noty.toml`, or the path in `NOTY_CONFIG`)
//! 3. Environment variables (`NOTY_` prefix, `__` between sections,
//!    e.g. `NOTY_AUTH__JWT_SECRET`), including those loaded from `.env`

use config::{Config, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "NOTY";

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "noty.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allow any origin (the mobile client runs from arbitrary hosts)
    pub cors_allow_any_origin: bool,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_days: i64,
    pub provision_first_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines instead of the human formatter
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, then the config file named by `NOTY_CONFIG` (or the
    /// default file if present), then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let file = std::env::var(format!("{ENV_PREFIX}_CONFIG")).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name(&file).required(false))
            .add_source(Self::environment());
        Self::finish(builder.build()?)
    }

    /// Builds settings from a TOML document layered over the defaults.
    /// The environment is not consulted.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors_allow_any_origin", true)?
            .set_default("database.url", "sqlite://noty.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.token_ttl_days", 30)?
            .set_default("auth.provision_first_page", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must be set (e.g. {ENV_PREFIX}_AUTH__JWT_SECRET)"
            )));
        }
        if self.auth.token_ttl_days <= 0 {
            return Err(ConfigError::Invalid("auth.token_ttl_days must be positive".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must be set".into()));
        }
        Ok(())
    }
}
