//! Weather observation entity
//!
//! One persisted (location, date, temperature, description) record. Created
//! by upstream fetches, history ingestion, explicit inserts and seeding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    errors::DomainError,
    value_objects::{ObservationId, WeatherReading},
};

/// Column bound for `location`
pub const MAX_LOCATION_LEN: usize = 100;
/// Column bound for `description`
pub const MAX_DESCRIPTION_LEN: usize = 100;
/// `DECIMAL(5,2)` holds at most three integral digits
const MAX_ABS_TEMPERATURE: f64 = 999.99;

/// A stored weather observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub id: ObservationId,
    pub location: String,
    pub date: NaiveDate,
    /// Celsius, two fractional digits
    pub temperature: f64,
    pub description: Option<String>,
}

impl WeatherObservation {
    /// Create a new observation with a fresh ID
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` when a field exceeds its column
    /// bounds or the temperature is not a finite `DECIMAL(5,2)` value.
    pub fn new(
        location: impl Into<String>,
        date: NaiveDate,
        temperature: f64,
    ) -> Result<Self, DomainError> {
        let location = location.into();
        validate_location(&location)?;
        Ok(Self {
            id: ObservationId::new(),
            location,
            date,
            temperature: normalize_temperature(temperature)?,
            description: None,
        })
    }

    /// Attach a description
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the description is too long.
    pub fn with_description(mut self, description: impl Into<String>) -> Result<Self, DomainError> {
        let description = description.into();
        validate_description(&description)?;
        self.description = Some(description);
        Ok(self)
    }

    /// Build the observation recorded for an upstream reading
    pub fn from_reading(
        location: impl Into<String>,
        reading: &WeatherReading,
    ) -> Result<Self, DomainError> {
        let observation = Self::new(location, reading.observed_on, reading.weather.temp)?;
        if reading.weather.description.is_empty() {
            Ok(observation)
        } else {
            observation.with_description(truncate(&reading.weather.description))
        }
    }

    /// Apply a partial update, validating every provided field first
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` and leaves `self` untouched if
    /// any provided field is invalid.
    pub fn apply(&mut self, update: ObservationUpdate) -> Result<(), DomainError> {
        if let Some(location) = &update.location {
            validate_location(location)?;
        }
        if let Some(description) = &update.description {
            validate_description(description)?;
        }
        let temperature = update.temperature.map(normalize_temperature).transpose()?;

        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        Ok(())
    }
}

/// Fields a client may change on an existing observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationUpdate {
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub temperature: Option<f64>,
    pub description: Option<String>,
}

impl ObservationUpdate {
    /// True when no field would change
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.date.is_none()
            && self.temperature.is_none()
            && self.description.is_none()
    }
}

fn validate_location(location: &str) -> Result<(), DomainError> {
    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(DomainError::ValidationError(format!(
            "location must be at most {MAX_LOCATION_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::ValidationError(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

fn normalize_temperature(temperature: f64) -> Result<f64, DomainError> {
    if !temperature.is_finite() {
        return Err(DomainError::ValidationError(
            "temperature must be a finite number".to_string(),
        ));
    }
    let rounded = (temperature * 100.0).round() / 100.0;
    if rounded.abs() > MAX_ABS_TEMPERATURE {
        return Err(DomainError::ValidationError(format!(
            "temperature must be between -{MAX_ABS_TEMPERATURE} and {MAX_ABS_TEMPERATURE}"
        )));
    }
    Ok(rounded)
}

/// Upstream descriptions are short, but never let one break the column bound
fn truncate(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::NormalizedWeather;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()
    }

    #[test]
    fn new_observation_rounds_temperature() {
        let obs = WeatherObservation::new("Berlin", date(), 12.3456).unwrap();
        assert!((obs.temperature - 12.35).abs() < f64::EPSILON);
        assert!(obs.description.is_none());
    }

    #[test]
    fn location_bound_enforced() {
        let long = "x".repeat(MAX_LOCATION_LEN + 1);
        assert!(WeatherObservation::new(long, date(), 1.0).is_err());
    }

    #[test]
    fn description_bound_enforced() {
        let obs = WeatherObservation::new("Berlin", date(), 1.0).unwrap();
        assert!(
            obs.with_description("d".repeat(MAX_DESCRIPTION_LEN + 1))
                .is_err()
        );
    }

    #[test]
    fn temperature_must_fit_decimal_column() {
        assert!(WeatherObservation::new("Berlin", date(), 1000.0).is_err());
        assert!(WeatherObservation::new("Berlin", date(), f64::NAN).is_err());
        assert!(WeatherObservation::new("Berlin", date(), -999.99).is_ok());
    }

    #[test]
    fn from_reading_copies_temp_and_description() {
        let reading = WeatherReading {
            weather: NormalizedWeather {
                temp: 15.0,
                feels_like: 14.0,
                temp_min: 13.0,
                temp_max: 16.0,
                pressure: 1012,
                humidity: 80,
                description: "Cloudy".to_string(),
                icon: "02d".to_string(),
                city: "London".to_string(),
                country: "GB".to_string(),
            },
            observed_on: date(),
        };

        let obs = WeatherObservation::from_reading("London,UK", &reading).unwrap();
        assert_eq!(obs.location, "London,UK");
        assert_eq!(obs.date, date());
        assert!((obs.temperature - 15.0).abs() < f64::EPSILON);
        assert_eq!(obs.description.as_deref(), Some("Cloudy"));
    }

    #[test]
    fn apply_updates_only_given_fields() {
        let mut obs = WeatherObservation::new("Berlin", date(), 1.0).unwrap();
        obs.apply(ObservationUpdate {
            temperature: Some(4.5),
            description: Some("Sunny".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(obs.location, "Berlin");
        assert!((obs.temperature - 4.5).abs() < f64::EPSILON);
        assert_eq!(obs.description.as_deref(), Some("Sunny"));
    }

    #[test]
    fn invalid_update_leaves_entity_untouched() {
        let mut obs = WeatherObservation::new("Berlin", date(), 1.0).unwrap();
        let before = obs.clone();
        let result = obs.apply(ObservationUpdate {
            location: Some("Paris".to_string()),
            temperature: Some(f64::INFINITY),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(obs, before);
    }

    #[test]
    fn empty_update_detected() {
        assert!(ObservationUpdate::default().is_empty());
        assert!(
            !ObservationUpdate {
                date: Some(date()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn serializes_date_as_calendar_day() {
        let obs = WeatherObservation::new("Berlin", date(), 1.0).unwrap();
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["date"], "2023-11-14");
    }
}
