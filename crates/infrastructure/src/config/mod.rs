//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `weather`: OpenWeatherMap credentials and endpoints
//! - `database`: SQLite database settings
//! - `rate_limit`: request counter window
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config.toml`, `WEATHER_PROXY__SECTION__KEY` variables, then the
//! conventional single-name variables (`OPENWEATHER_API_KEY`, `PORT`, ...).

mod database;
mod rate_limit;
mod server;
mod weather;

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use weather::WeatherAppConfig;

use crate::{
    telemetry::TelemetryConfig,
    validation::{ConfigValidator, ConfigWarning},
};

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

const ENV_PREFIX: &str = "WEATHER_PROXY";

/// Application environment (development or production)
///
/// Controls CORS strictness and configuration warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - any CORS origin
    #[default]
    Development,
    /// Production environment - configured origins only
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream weather provider configuration
    #[serde(default)]
    pub weather: WeatherAppConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Request counter configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value has the wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit variable map in place of the process environment
    fn load_from(vars: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError> {
        let lookup = |key: &str| -> Option<String> {
            let value = match &vars {
                Some(map) => map.get(key).cloned(),
                None => std::env::var(key).ok(),
            };
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        let origins = lookup("ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        let environment = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .and_then(|raw| raw.parse::<Environment>().ok())
            .map(|env| env.to_string());

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "weather.sqlite")?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., WEATHER_PROXY__SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true)
                    .source(vars.clone()),
            )
            // Conventional names win over everything else
            .set_override_option("weather.api_key", lookup("OPENWEATHER_API_KEY"))?
            .set_override_option("database.path", lookup("DB_FILE"))?
            .set_override_option("server.allowed_origins", origins)?
            .set_override_option("rate_limit.window_ms", lookup("RATE_LIMIT_WINDOW_MS"))?
            .set_override_option("rate_limit.max_requests", lookup("RATE_LIMIT_MAX_REQUESTS"))?
            .set_override_option("server.port", lookup("PORT"))?
            .set_override_option("environment", environment)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Whether the service runs in production mode
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    /// Non-fatal configuration problems worth logging at startup
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        ConfigValidator::validate(self)
    }
}
