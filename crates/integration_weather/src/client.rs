//! OpenWeatherMap client
//!
//! HTTP client for the OpenWeatherMap geocoding, weather and history APIs.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{
    ErrorBody, ForecastResponse, GeocodedPlace, HistoryResponse, WeatherEntry, ZipGeocodeResponse,
};

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key configured
    #[error("API key is required but was not provided")]
    MissingApiKey,

    /// Upstream rejected the API key
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// Geocoding found nothing for the query
    #[error("Location not found")]
    LocationNotFound,

    /// Geocoding answered with an unexpected status
    #[error("Geocoding error {0}")]
    Geocoding(u16),

    /// Weather endpoint answered with a non-success status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Payload lacked a block the normalizer needs
    #[error("Invalid weather data received from API: {0}")]
    InvalidData(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::ConnectionFailed(e.to_string())
        }
    }
}

/// Weather service configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Weather API base URL (default: <https://api.openweathermap.org/data/2.5>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Geocoding API base URL (default: <https://api.openweathermap.org/geo/1.0>)
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,

    /// History API base URL
    #[serde(default = "default_history_base_url")]
    pub history_base_url: String,

    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Unit system (default: metric)
    #[serde(default = "default_units")]
    pub units: String,

    /// Description language (default: en)
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_history_base_url() -> String {
    "https://history.openweathermap.org/data/2.5/history".to_string()
}

const fn default_timeout() -> u64 {
    10
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            geo_base_url: default_geo_base_url(),
            history_base_url: default_history_base_url(),
            timeout_secs: default_timeout(),
            units: default_units(),
            lang: default_lang(),
        }
    }
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("geo_base_url", &self.geo_base_url)
            .field("history_base_url", &self.history_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("units", &self.units)
            .field("lang", &self.lang)
            .finish()
    }
}

/// Client trait for the upstream weather API
#[async_trait]
pub trait WeatherApiClient: Send + Sync {
    /// Resolve a zip code through the zip geocoder
    async fn geocode_zip(&self, zip: &str) -> Result<GeocodedPlace, WeatherError>;

    /// Resolve a free-form place name through the direct geocoder
    async fn geocode_city(&self, query: &str) -> Result<GeocodedPlace, WeatherError>;

    /// Current weather at a coordinate pair
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherEntry, WeatherError>;

    /// 5 day / 3 hour forecast at a coordinate pair
    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, WeatherError>;

    /// Hourly history between two unix timestamps
    async fn history(
        &self,
        lat: f64,
        lon: f64,
        start: i64,
        end: i64,
    ) -> Result<HistoryResponse, WeatherError>;

    /// Whether an API key is configured
    fn has_api_key(&self) -> bool;
}

/// Which family of endpoints a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Geocoding,
    Weather,
}

/// OpenWeatherMap HTTP client implementation
pub struct OpenWeatherMapClient {
    client: Client,
    config: WeatherConfig,
}

impl fmt::Debug for OpenWeatherMapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherMapClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherMapClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Access the configuration
    #[must_use]
    pub const fn config(&self) -> &WeatherConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(WeatherError::MissingApiKey)
    }

    /// Issue a GET with the API key appended and decode a success body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        endpoint: Endpoint,
    ) -> Result<T, WeatherError> {
        let key = self.api_key()?;
        debug!(url = %url, "Requesting upstream");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("appid", key)])
            .send()
            .await?;

        let response = Self::check_status(response, endpoint).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::ParseError(e.to_string()))
    }

    async fn check_status(response: Response, endpoint: Endpoint) -> Result<Response, WeatherError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let message = body
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
        warn!(status = status.as_u16(), message = %message, "Upstream returned an error");

        Err(match (status, endpoint) {
            (StatusCode::UNAUTHORIZED, _) => WeatherError::InvalidApiKey(message),
            (StatusCode::TOO_MANY_REQUESTS, _) => WeatherError::RateLimitExceeded,
            (StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST, Endpoint::Geocoding) => {
                WeatherError::LocationNotFound
            },
            (_, Endpoint::Geocoding) => WeatherError::Geocoding(status.as_u16()),
            (_, Endpoint::Weather) => WeatherError::Upstream {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn weather_params(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", self.config.units.clone()),
            ("lang", self.config.lang.clone()),
        ]
    }
}

#[async_trait]
impl WeatherApiClient for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn geocode_zip(&self, zip: &str) -> Result<GeocodedPlace, WeatherError> {
        let url = format!("{}/zip", self.config.geo_base_url);
        let response: serde_json::Value = self
            .get_json(&url, &[("zip", zip.to_string())], Endpoint::Geocoding)
            .await?;

        serde_json::from_value::<ZipGeocodeResponse>(response)
            .ok()
            .and_then(ZipGeocodeResponse::into_place)
            .ok_or(WeatherError::LocationNotFound)
    }

    #[instrument(skip(self))]
    async fn geocode_city(&self, query: &str) -> Result<GeocodedPlace, WeatherError> {
        let url = format!("{}/direct", self.config.geo_base_url);
        let params = [("q", query.to_string()), ("limit", "1".to_string())];
        let response: serde_json::Value =
            self.get_json(&url, &params, Endpoint::Geocoding).await?;

        let Some(first) = response.as_array().and_then(|a| a.first()).cloned() else {
            return Err(WeatherError::LocationNotFound);
        };
        serde_json::from_value(first).map_err(|_| WeatherError::LocationNotFound)
    }

    #[instrument(skip(self))]
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherEntry, WeatherError> {
        let url = format!("{}/weather", self.config.base_url);
        self.get_json(&url, &self.weather_params(lat, lon), Endpoint::Weather)
            .await
    }

    #[instrument(skip(self))]
    async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, WeatherError> {
        let url = format!("{}/forecast", self.config.base_url);
        self.get_json(&url, &self.weather_params(lat, lon), Endpoint::Weather)
            .await
    }

    #[instrument(skip(self))]
    async fn history(
        &self,
        lat: f64,
        lon: f64,
        start: i64,
        end: i64,
    ) -> Result<HistoryResponse, WeatherError> {
        let url = format!("{}/city", self.config.history_base_url);
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("type", "hour".to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
            ("units", self.config.units.clone()),
        ];
        self.get_json(&url, &params, Endpoint::Weather).await
    }

    fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WeatherConfig::default();
        assert_eq!(config.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.geo_base_url, "https://api.openweathermap.org/geo/1.0");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.units, "metric");
        assert_eq!(config.lang, "en");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: WeatherConfig =
            serde_json::from_value(serde_json::json!({"api_key": "abc"})).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = WeatherConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let client = OpenWeatherMapClient::new(config).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let client = OpenWeatherMapClient::new(WeatherConfig {
            api_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_weather_params() {
        let client = OpenWeatherMapClient::new(WeatherConfig::default()).unwrap();
        let params = client.weather_params(40.7, -74.0);
        assert!(params.contains(&("lat", "40.7".to_string())));
        assert!(params.contains(&("lon", "-74".to_string())));
        assert!(params.contains(&("units", "metric".to_string())));
        assert!(params.contains(&("lang", "en".to_string())));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = OpenWeatherMapClient::new(WeatherConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let err = client.current(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(WeatherError::Geocoding(500).to_string(), "Geocoding error 500");
        assert_eq!(
            WeatherError::Upstream {
                status: 400,
                message: "wrong latitude".to_string()
            }
            .to_string(),
            "wrong latitude"
        );
    }
}
