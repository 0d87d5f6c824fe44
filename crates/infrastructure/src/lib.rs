//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the OpenWeatherMap
//! adapter and the SQLite observation store. Also owns configuration
//! loading, tracing setup and database seeding.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod seed;
pub mod telemetry;
pub mod validation;

pub use adapters::*;
pub use config::{
    AppConfig, DatabaseConfig, Environment, RateLimitConfig, ServerConfig, WeatherAppConfig,
};
pub use persistence::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqliteObservationStore};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_tracing};
pub use validation::{ConfigValidator, ConfigWarning, WarningSeverity};
