//! Weather adapter - Implements WeatherPort using integration_weather

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{DailyHistory, WeatherPort};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use domain::value_objects::{GeoLocation, LocationInput, ResolvedLocation, WeatherReading};
use integration_weather::{
    GeocodedPlace, OpenWeatherMapClient, PlaceHint, WeatherApiClient, WeatherConfig, WeatherError,
    summarize_daily, to_reading,
};
use tracing::{debug, instrument};

const SECONDS_PER_DAY: i64 = 86_400;

/// Adapter for the OpenWeatherMap API
pub struct WeatherAdapter {
    client: Arc<dyn WeatherApiClient>,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter")
            .field("client", &"WeatherApiClient")
            .field("has_api_key", &self.client.has_api_key())
            .finish()
    }
}

impl WeatherAdapter {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: Arc<dyn WeatherApiClient>) -> Self {
        Self { client }
    }

    /// Create with an OpenWeatherMap client built from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: WeatherConfig) -> Result<Self, ApplicationError> {
        let client = OpenWeatherMapClient::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Map integration weather error to application error
    fn map_error(err: WeatherError) -> ApplicationError {
        match err {
            WeatherError::MissingApiKey => ApplicationError::MissingApiKey,
            WeatherError::InvalidApiKey(msg) => ApplicationError::InvalidApiKey(msg),
            WeatherError::LocationNotFound => ApplicationError::LocationNotFound,
            WeatherError::Geocoding(status) => ApplicationError::Geocoding(status),
            WeatherError::Upstream { status, message } => {
                ApplicationError::UpstreamHttp { status, message }
            },
            WeatherError::InvalidData(msg) | WeatherError::ParseError(msg) => {
                ApplicationError::InvalidUpstreamData(msg)
            },
            WeatherError::RateLimitExceeded => ApplicationError::RateLimited,
            WeatherError::ConnectionFailed(msg) | WeatherError::Timeout(msg) => {
                ApplicationError::ServiceUnavailable(msg)
            },
        }
    }

    fn resolved_from_place(place: GeocodedPlace) -> Result<ResolvedLocation, ApplicationError> {
        let coordinates = GeoLocation::new(place.lat, place.lon).map_err(|e| {
            ApplicationError::InvalidUpstreamData(format!("geocoded coordinates: {e}"))
        })?;
        Ok(ResolvedLocation {
            coordinates,
            name: place.name,
            country: place.country,
        })
    }

    fn hint_for(location: &ResolvedLocation) -> PlaceHint {
        PlaceHint {
            name: location.name.clone(),
            country: location.country.clone(),
        }
    }

    /// Unix window covering `start` 00:00:00 through `end` 23:59:59 UTC
    fn unix_window(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        let day_start = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc().timestamp();
        (day_start(start), day_start(end) + SECONDS_PER_DAY - 1)
    }
}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    #[instrument(skip(self), fields(kind = location.kind()))]
    async fn resolve(
        &self,
        location: &LocationInput,
    ) -> Result<ResolvedLocation, ApplicationError> {
        let place = match location {
            LocationInput::Coordinates(coords) => {
                return Ok(ResolvedLocation::from_coordinates(*coords));
            },
            LocationInput::Zip(zip) => self.client.geocode_zip(zip.as_str()).await,
            LocationInput::City(city) => self.client.geocode_city(city.as_str()).await,
        }
        .map_err(Self::map_error)?;

        debug!(lat = place.lat, lon = place.lon, "Location geocoded");
        Self::resolved_from_place(place)
    }

    #[instrument(skip(self), fields(lat = location.coordinates.latitude(), lon = location.coordinates.longitude()))]
    async fn current(
        &self,
        location: &ResolvedLocation,
    ) -> Result<WeatherReading, ApplicationError> {
        let entry = self
            .client
            .current(
                location.coordinates.latitude(),
                location.coordinates.longitude(),
            )
            .await
            .map_err(Self::map_error)?;

        let reading = to_reading(&entry, &Self::hint_for(location)).map_err(Self::map_error)?;
        debug!(
            temp = reading.weather.temp,
            city = %reading.weather.city,
            "Retrieved current weather"
        );
        Ok(reading)
    }

    #[instrument(skip(self), fields(lat = location.coordinates.latitude(), lon = location.coordinates.longitude()))]
    async fn forecast(
        &self,
        location: &ResolvedLocation,
    ) -> Result<Vec<WeatherReading>, ApplicationError> {
        let response = self
            .client
            .forecast(
                location.coordinates.latitude(),
                location.coordinates.longitude(),
            )
            .await
            .map_err(Self::map_error)?;

        let city_hint = response
            .city
            .as_ref()
            .map(|c| PlaceHint {
                name: c.name.clone(),
                country: c.country.clone(),
            })
            .unwrap_or_default();
        let hint = Self::hint_for(location).or(city_hint);

        let readings = response
            .list
            .iter()
            .map(|entry| to_reading(entry, &hint))
            .collect::<Result<Vec<_>, _>>()
            .map_err(Self::map_error)?;

        debug!(entries = readings.len(), "Retrieved weather forecast");
        Ok(readings)
    }

    #[instrument(skip(self), fields(lat = location.coordinates.latitude(), lon = location.coordinates.longitude()))]
    async fn history(
        &self,
        location: &ResolvedLocation,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyHistory>, ApplicationError> {
        let (from, to) = Self::unix_window(start, end);
        let response = self
            .client
            .history(
                location.coordinates.latitude(),
                location.coordinates.longitude(),
                from,
                to,
            )
            .await
            .map_err(Self::map_error)?;

        let days: Vec<DailyHistory> = summarize_daily(&response.list)
            .into_iter()
            .map(|day| DailyHistory {
                date: day.date,
                temperature: day.mean_temp,
                description: day.description,
            })
            .collect();

        debug!(
            hourly = response.list.len(),
            days = days.len(),
            "Retrieved weather history"
        );
        Ok(days)
    }

    fn has_credentials(&self) -> bool {
        self.client.has_api_key()
    }
}
