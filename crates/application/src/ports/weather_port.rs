//! Weather gateway port
//!
//! Geocoding and weather retrieval against the upstream provider. Adapters
//! return already normalized readings.

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::value_objects::{LocationInput, ResolvedLocation, WeatherReading};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// One day of historical weather, aggregated from hourly samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHistory {
    pub date: NaiveDate,
    /// Mean temperature in Celsius
    pub temperature: f64,
    pub description: Option<String>,
}

/// Port for the upstream weather provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Resolve a classified location to coordinates
    ///
    /// Zip codes use the zip geocoder, city names the direct geocoder and
    /// coordinates resolve without any network call.
    async fn resolve(&self, location: &LocationInput)
    -> Result<ResolvedLocation, ApplicationError>;

    /// Current conditions at a resolved location
    async fn current(&self, location: &ResolvedLocation)
    -> Result<WeatherReading, ApplicationError>;

    /// Forecast entries at a resolved location, in upstream order
    async fn forecast(
        &self,
        location: &ResolvedLocation,
    ) -> Result<Vec<WeatherReading>, ApplicationError>;

    /// Daily history between two inclusive dates
    async fn history(
        &self,
        location: &ResolvedLocation,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyHistory>, ApplicationError>;

    /// Whether an upstream credential is configured
    fn has_credentials(&self) -> bool;
}
