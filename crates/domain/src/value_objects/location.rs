//! Location input classification
//!
//! A raw location string is one of three shapes: a city name, a five digit
//! zip code, or a `lat,lon` pair. Classification tries them in that order
//! and the first shape that accepts the input wins. When none accepts it,
//! the rejection carries every per-shape reason.

use std::fmt;

use serde::Serialize;

use super::geo_location::GeoLocation;
use crate::errors::DomainError;

const CITY_EMPTY: &str = "City name cannot be empty";
const CITY_CHARSET: &str =
    "City name can only contain letters, spaces, hyphens, apostrophes, and periods";
const ZIP_LENGTH: &str = "Zip code must be exactly 5 digits";
const ZIP_DIGITS: &str = "Zip code must contain only numbers";
const ZIP_EMPTY: &str = "Zip code cannot be empty or whitespace";
const COORDS_EMPTY: &str = "Coordinates cannot be empty or whitespace";
const COORDS_FORMAT: &str = "Coordinates must be in the format \"lat,lon\"";
const COORDS_NUMERIC: &str = "Both latitude and longitude must be valid numbers";
const NOT_A_STRING: &str = "Location must be a string";

/// Zip codes are exactly this many ASCII digits
const ZIP_LEN: usize = 5;

/// A validated city name, trimmed
///
/// May carry comma separated qualifiers such as a state or country code
/// (`London,UK`), each segment obeying the same character rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityName(String);

impl CityName {
    fn parse(raw: &str) -> Result<Self, Vec<&'static str>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(vec![CITY_EMPTY]);
        }
        let valid = trimmed.split(',').all(|segment| {
            let segment = segment.trim();
            !segment.is_empty() && segment.chars().all(is_city_char)
        });
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(vec![CITY_CHARSET])
        }
    }

    /// Borrow the name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Letters (ASCII plus `À`..`ž`), whitespace, hyphen, apostrophe, period
fn is_city_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{C0}'..='\u{17E}').contains(&c)
        || c.is_whitespace()
        || matches!(c, '-' | '\'' | '.')
}

/// A validated five digit zip code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipCode(String);

impl ZipCode {
    fn parse(raw: &str) -> Result<Self, Vec<&'static str>> {
        let trimmed = raw.trim();
        let mut reasons = Vec::new();
        if trimmed.chars().count() != ZIP_LEN {
            reasons.push(ZIP_LENGTH);
        }
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            reasons.push(ZIP_DIGITS);
        }
        if trimmed.is_empty() {
            reasons.push(ZIP_EMPTY);
        }
        if reasons.is_empty() {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(reasons)
        }
    }

    /// Borrow the code
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn parse_coordinates(raw: &str) -> Result<GeoLocation, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(COORDS_EMPTY.to_string());
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(COORDS_FORMAT.to_string());
    };

    let (Some(lat), Some(lon)) = (parse_number(lat), parse_number(lon)) else {
        return Err(COORDS_NUMERIC.to_string());
    };

    GeoLocation::new(lat, lon).map_err(|e| e.to_string())
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// A classified location
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Free-form city name, geocoded through the direct endpoint
    City(CityName),
    /// Zip code, geocoded through the zip endpoint
    Zip(ZipCode),
    /// Explicit coordinates, no geocoding needed
    Coordinates(GeoLocation),
}

impl LocationInput {
    /// Classify a raw location string
    ///
    /// # Errors
    ///
    /// Returns a `LocationRejection` listing why each shape refused the input.
    pub fn parse(raw: &str) -> Result<Self, LocationRejection> {
        let mut reasons: Vec<String> = Vec::new();

        match CityName::parse(raw) {
            Ok(city) => return Ok(Self::City(city)),
            Err(r) => reasons.extend(r.into_iter().map(str::to_string)),
        }
        match ZipCode::parse(raw) {
            Ok(zip) => return Ok(Self::Zip(zip)),
            Err(r) => reasons.extend(r.into_iter().map(str::to_string)),
        }
        match parse_coordinates(raw) {
            Ok(coords) => return Ok(Self::Coordinates(coords)),
            Err(r) => reasons.push(r),
        }

        Err(LocationRejection { reasons })
    }

    /// Text stored alongside observations made for this location
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::City(city) => city.as_str().to_string(),
            Self::Zip(zip) => zip.as_str().to_string(),
            Self::Coordinates(coords) => coords.label(),
        }
    }

    /// Short name of the matched shape
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::City(_) => "city",
            Self::Zip(_) => "zip",
            Self::Coordinates(_) => "coordinates",
        }
    }
}

/// Every reason a raw location failed classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRejection {
    reasons: Vec<String>,
}

impl LocationRejection {
    /// Individual reasons in shape order
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }
}

impl fmt::Display for LocationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reasons.join("; "))
    }
}

impl std::error::Error for LocationRejection {}

impl From<LocationRejection> for DomainError {
    fn from(rejection: LocationRejection) -> Self {
        Self::InvalidLocation(rejection.to_string())
    }
}

/// Outcome of validating an arbitrary JSON value as a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationValidation {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validate a value that should hold a location string
///
/// Non-string values are refused before any classification.
#[must_use]
pub fn validate_location(value: &serde_json::Value) -> LocationValidation {
    let Some(raw) = value.as_str() else {
        return LocationValidation {
            success: false,
            error: Some(NOT_A_STRING.to_string()),
        };
    };

    match LocationInput::parse(raw) {
        Ok(_) => LocationValidation {
            success: true,
            error: None,
        },
        Err(rejection) => LocationValidation {
            success: false,
            error: Some(rejection.to_string()),
        },
    }
}

/// Whether the raw string classifies as any location shape
#[must_use]
pub fn is_valid_location(raw: &str) -> bool {
    LocationInput::parse(raw).is_ok()
}
