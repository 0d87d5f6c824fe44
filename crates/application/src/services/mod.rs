//! Application services - Use case implementations

mod record_service;
mod weather_service;

pub use record_service::{NewObservation, RecordService};
pub use weather_service::{ForecastOutcome, WeatherQuery, WeatherService};
