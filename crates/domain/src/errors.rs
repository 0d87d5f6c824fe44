//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Location input failed classification
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Coordinates outside the valid range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Start/end dates are reversed or before the supported history
    #[error("Invalid date range")]
    InvalidDateRange,
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("WeatherObservation", "123");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "WeatherObservation");
                assert_eq!(id, "123");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("WeatherObservation", "abc");
        assert_eq!(err.to_string(), "WeatherObservation not found: abc");
    }

    #[test]
    fn invalid_location_message() {
        let err = DomainError::InvalidLocation("Zip code must be exactly 5 digits".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid location: Zip code must be exactly 5 digits"
        );
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("location is too long".to_string());
        assert_eq!(err.to_string(), "Validation failed: location is too long");
    }

    #[test]
    fn invalid_date_range_message() {
        assert_eq!(DomainError::InvalidDateRange.to_string(), "Invalid date range");
    }
}
