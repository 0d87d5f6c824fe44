//! Weather values produced by the upstream gateway

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::geo_location::GeoLocation;

/// Provider-agnostic weather shape returned to API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeather {
    /// Temperature in Celsius
    pub temp: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Atmospheric pressure in hPa
    pub pressure: u32,
    /// Relative humidity in percent
    pub humidity: u8,
    pub description: String,
    /// Provider icon code, e.g. `02d`
    pub icon: String,
    pub city: String,
    /// ISO country code, empty when unknown
    pub country: String,
}

/// Coordinates plus whatever place metadata geocoding returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinates: GeoLocation,
    pub name: Option<String>,
    pub country: Option<String>,
}

impl ResolvedLocation {
    /// Coordinates supplied directly by the caller, no place metadata
    #[must_use]
    pub const fn from_coordinates(coordinates: GeoLocation) -> Self {
        Self {
            coordinates,
            name: None,
            country: None,
        }
    }
}

/// One normalized upstream data point and the UTC day it describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub weather: NormalizedWeather,
    pub observed_on: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NormalizedWeather {
        NormalizedWeather {
            temp: 15.0,
            feels_like: 14.2,
            temp_min: 13.0,
            temp_max: 16.5,
            pressure: 1012,
            humidity: 81,
            description: "Cloudy".to_string(),
            icon: "02d".to_string(),
            city: "London".to_string(),
            country: "GB".to_string(),
        }
    }

    #[test]
    fn normalized_weather_uses_snake_case_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["feels_like"], 14.2);
        assert_eq!(json["temp_max"], 16.5);
        assert_eq!(json["city"], "London");
    }

    #[test]
    fn resolved_from_coordinates_has_no_metadata() {
        let resolved = ResolvedLocation::from_coordinates(GeoLocation::new_unchecked(1.0, 2.0));
        assert!(resolved.name.is_none());
        assert!(resolved.country.is_none());
    }
}
