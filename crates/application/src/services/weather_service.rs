//! Weather service
//!
//! Validates the caller's location, resolves it through the upstream
//! geocoder, fetches current or forecast weather and records every reading
//! as a weather observation.

use std::{fmt, sync::Arc};

use domain::{
    DomainError,
    entities::WeatherObservation,
    value_objects::{GeoLocation, LocationInput, NormalizedWeather, ResolvedLocation},
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{BatchWriteReport, ObservationStore, WeatherPort},
};

/// What the caller asked about
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    /// Raw location string, validated before use
    Location(String),
    /// Explicit coordinates, used without geocoding
    Coordinates(GeoLocation),
}

impl WeatherQuery {
    /// Build a query from optional request parameters
    ///
    /// A complete `lat`/`lon` pair wins over `location`. Empty strings count
    /// as absent.
    ///
    /// # Errors
    ///
    /// `LocationRequired` when neither a location nor both coordinates are
    /// present, `InvalidCoordinates` when the pair does not parse or is out
    /// of range.
    pub fn from_params(
        location: Option<&str>,
        lat: Option<&str>,
        lon: Option<&str>,
    ) -> Result<Self, ApplicationError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        if let (Some(lat), Some(lon)) = (present(lat), present(lon)) {
            let parse = |s: &str| {
                s.parse::<f64>().map_err(|_| {
                    DomainError::InvalidCoordinates(
                        "Both latitude and longitude must be valid numbers".to_string(),
                    )
                })
            };
            let coords = GeoLocation::new(parse(lat)?, parse(lon)?)
                .map_err(|e| DomainError::InvalidCoordinates(e.to_string()))?;
            return Ok(Self::Coordinates(coords));
        }

        present(location)
            .map(|l| Self::Location(l.to_string()))
            .ok_or(ApplicationError::LocationRequired)
    }
}

/// Forecast entries plus how persisting them went
#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutcome {
    pub items: Vec<NormalizedWeather>,
    pub persistence: BatchWriteReport,
}

/// Service for fetching weather and recording observations
pub struct WeatherService {
    weather: Arc<dyn WeatherPort>,
    store: Arc<dyn ObservationStore>,
}

impl fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherService")
            .field("has_credentials", &self.weather.has_credentials())
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    /// Create a new weather service
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherPort>, store: Arc<dyn ObservationStore>) -> Self {
        Self { weather, store }
    }

    /// Current weather for a location or coordinate pair
    ///
    /// Records one observation. A failed write is logged and does not fail
    /// the fetch.
    #[instrument(skip(self))]
    pub async fn fetch_current(
        &self,
        query: &WeatherQuery,
    ) -> Result<NormalizedWeather, ApplicationError> {
        self.ensure_credentials()?;
        let (resolved, label) = self.resolve(query).await?;

        let reading = self.weather.current(&resolved).await?;

        match WeatherObservation::from_reading(&label, &reading) {
            Ok(observation) => {
                if let Err(e) = self.store.save(&observation).await {
                    warn!(error = %e, location = %label, "Failed to record current observation");
                } else {
                    debug!(id = %observation.id, location = %label, "Recorded observation");
                }
            },
            Err(e) => warn!(error = %e, location = %label, "Reading not storable"),
        }

        Ok(reading.weather)
    }

    /// Forecast for a location or coordinate pair
    ///
    /// Every entry is written in a single batch. The aggregated result is
    /// returned alongside the forecast. A failed batch does not fail the
    /// fetch.
    #[instrument(skip(self))]
    pub async fn fetch_forecast(
        &self,
        query: &WeatherQuery,
    ) -> Result<ForecastOutcome, ApplicationError> {
        self.ensure_credentials()?;
        let (resolved, label) = self.resolve(query).await?;

        let readings = self.weather.forecast(&resolved).await?;

        let mut persistence = BatchWriteReport::default();
        let mut observations = Vec::with_capacity(readings.len());
        for reading in &readings {
            match WeatherObservation::from_reading(&label, reading) {
                Ok(observation) => observations.push(observation),
                Err(e) => persistence.record_failure(e.to_string()),
            }
        }

        let batch = match self.store.save_batch(&observations).await {
            Ok(report) => report,
            Err(e) => BatchWriteReport::all_failed(observations.len(), e.to_string()),
        };
        persistence.merge(batch);

        if persistence.is_complete() {
            info!(
                location = %label,
                persisted = persistence.persisted,
                "Forecast observations recorded"
            );
        } else {
            warn!(
                location = %label,
                persisted = persistence.persisted,
                failed = persistence.failed,
                errors = ?persistence.errors,
                "Some forecast observations were not recorded"
            );
        }

        Ok(ForecastOutcome {
            items: readings.into_iter().map(|r| r.weather).collect(),
            persistence,
        })
    }

    fn ensure_credentials(&self) -> Result<(), ApplicationError> {
        if self.weather.has_credentials() {
            Ok(())
        } else {
            Err(ApplicationError::MissingApiKey)
        }
    }

    /// Resolve a query and pick the label stored with its observations
    async fn resolve(
        &self,
        query: &WeatherQuery,
    ) -> Result<(ResolvedLocation, String), ApplicationError> {
        match query {
            WeatherQuery::Coordinates(coords) => {
                Ok((ResolvedLocation::from_coordinates(*coords), coords.label()))
            },
            WeatherQuery::Location(raw) => {
                let input = LocationInput::parse(raw).map_err(DomainError::from)?;
                debug!(kind = input.kind(), "Location classified");
                let resolved = self.weather.resolve(&input).await?;
                Ok((resolved, input.label()))
            },
        }
    }
}
