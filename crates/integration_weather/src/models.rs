//! OpenWeatherMap payloads
//!
//! Only the fields the proxy reads are modelled. Blocks the upstream may
//! omit are optional so that a partial payload still deserializes and the
//! normalizer can report exactly what was missing.

use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Body of the zip geocoder, which may lack coordinates for unknown codes
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ZipGeocodeResponse {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl ZipGeocodeResponse {
    pub(crate) fn into_place(self) -> Option<GeocodedPlace> {
        Some(GeocodedPlace {
            lat: self.lat?,
            lon: self.lon?,
            name: self.name,
            country: self.country,
        })
    }
}

/// `main` block of a weather entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u8,
}

/// One element of the `weather` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub main: Option<String>,
    pub description: String,
    pub icon: String,
}

/// `sys` block of a current weather payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysBlock {
    #[serde(default)]
    pub country: Option<String>,
}

/// A current weather payload or one forecast/history list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    /// Unix timestamp, seconds
    pub dt: i64,
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub weather: Option<Vec<Condition>>,
    #[serde(default)]
    pub sys: Option<SysBlock>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `city` block of a forecast payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBlock {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// 5 day / 3 hour forecast payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<WeatherEntry>,
    #[serde(default)]
    pub city: Option<CityBlock>,
}

/// Hourly history payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub list: Vec<WeatherEntry>,
}

/// Error body returned on non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_payload_deserializes() {
        let json = serde_json::json!({
            "dt": 1_700_000_000,
            "main": {"temp": 15.0, "feels_like": 14.2, "temp_min": 13.0,
                     "temp_max": 16.0, "pressure": 1012, "humidity": 81},
            "weather": [{"id": 803, "main": "Clouds", "description": "Cloudy", "icon": "04d"}],
            "sys": {"country": "GB"},
            "name": "London",
            "cod": 200
        });
        let entry: WeatherEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.dt, 1_700_000_000);
        assert_eq!(entry.main.unwrap().pressure, 1012);
        assert_eq!(entry.sys.unwrap().country.as_deref(), Some("GB"));
    }

    #[test]
    fn entry_without_main_still_deserializes() {
        let entry: WeatherEntry = serde_json::from_value(serde_json::json!({"dt": 1})).unwrap();
        assert!(entry.main.is_none());
        assert!(entry.weather.is_none());
    }

    #[test]
    fn zip_without_coordinates_has_no_place() {
        let zip: ZipGeocodeResponse =
            serde_json::from_value(serde_json::json!({"name": "Nowhere"})).unwrap();
        assert!(zip.into_place().is_none());
    }

    #[test]
    fn zip_with_coordinates_becomes_place() {
        let zip: ZipGeocodeResponse = serde_json::from_value(serde_json::json!({
            "zip": "10001", "name": "New York", "lat": 40.75, "lon": -73.99, "country": "US"
        }))
        .unwrap();
        let place = zip.into_place().unwrap();
        assert_eq!(place.name.as_deref(), Some("New York"));
        assert!((place.lat - 40.75).abs() < f64::EPSILON);
    }

    #[test]
    fn error_body_tolerates_numeric_cod() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "cod": 401, "message": "Invalid API key"
        }))
        .unwrap();
        assert_eq!(body.message.as_deref(), Some("Invalid API key"));
    }
}
