//! Application state shared across handlers

use std::{sync::Arc, time::Instant};

use application::{RecordService, WeatherService};
use infrastructure::AppConfig;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current weather and forecast lookups
    pub weather_service: Arc<WeatherService>,
    /// Stored observation CRUD and history ingestion
    pub record_service: Arc<RecordService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, reported as uptime by `/health`
    pub started_at: Instant,
}

impl AppState {
    /// Build state around the two services
    #[must_use]
    pub fn new(
        weather_service: Arc<WeatherService>,
        record_service: Arc<RecordService>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            weather_service,
            record_service,
            config,
            started_at: Instant::now(),
        }
    }
}
