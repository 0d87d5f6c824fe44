//! Geographic location value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic location with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

/// Why a coordinate pair was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    /// One of the components is NaN or infinite
    NotANumber,
    /// Latitude outside [-90, 90]
    LatitudeOutOfRange,
    /// Longitude outside [-180, 180]
    LongitudeOutOfRange,
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "Both latitude and longitude must be valid numbers"),
            Self::LatitudeOutOfRange => write!(f, "Latitude must be between -90 and 90"),
            Self::LongitudeOutOfRange => write!(f, "Longitude must be between -180 and 180"),
        }
    }
}

impl std::error::Error for CoordinateError {}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// Latitude is checked before longitude, so a pair that is wrong on both
    /// axes reports the latitude.
    ///
    /// # Errors
    ///
    /// Returns a `CoordinateError` naming the first offending component.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotANumber);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a location without validation (for trusted upstream payloads)
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Compact `lat,lon` label, used when no place name is known
    #[must_use]
    pub fn label(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
