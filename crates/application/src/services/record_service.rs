//! Record service
//!
//! CRUD over stored weather observations plus ingestion of daily history
//! from the upstream provider.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use domain::{
    DomainError,
    entities::{MAX_DESCRIPTION_LEN, ObservationUpdate, WeatherObservation},
    value_objects::{LocationInput, ObservationId},
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{ObservationStore, WeatherPort},
};

/// The provider has no history before this day
const EARLIEST_HISTORY: (i32, u32, u32) = (1979, 1, 1);

const ENTITY: &str = "WeatherObservation";

/// Fields for an explicitly created observation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewObservation {
    pub location: String,
    pub date: NaiveDate,
    pub temperature: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Service for managing stored observations
pub struct RecordService {
    store: Arc<dyn ObservationStore>,
    weather: Arc<dyn WeatherPort>,
}

impl fmt::Debug for RecordService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordService").finish_non_exhaustive()
    }
}

impl RecordService {
    /// Create a new record service
    #[must_use]
    pub fn new(store: Arc<dyn ObservationStore>, weather: Arc<dyn WeatherPort>) -> Self {
        Self { store, weather }
    }

    /// Validate and persist a single observation
    #[instrument(skip(self, new), fields(location = %new.location, date = %new.date))]
    pub async fn create(&self, new: NewObservation) -> Result<WeatherObservation, ApplicationError> {
        let location = new.location.trim();
        if location.is_empty() {
            return Err(DomainError::ValidationError("location is required".to_string()).into());
        }

        let mut observation = WeatherObservation::new(location, new.date, new.temperature)?;
        if let Some(description) = new.description {
            observation = observation.with_description(description)?;
        }

        self.store.save(&observation).await?;
        info!(id = %observation.id, "Observation created");
        Ok(observation)
    }

    /// Fetch daily history for a location and store one observation per day
    ///
    /// Days outside `[start, end]` are dropped. All days are written in one
    /// batch; any rejected row fails the request. Returns the stored
    /// observations in date order.
    #[instrument(skip(self))]
    pub async fn ingest_history(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeatherObservation>, ApplicationError> {
        let input = LocationInput::parse(location).map_err(DomainError::from)?;
        validate_range(start, end)?;

        if !self.weather.has_credentials() {
            return Err(ApplicationError::MissingApiKey);
        }

        let resolved = self.weather.resolve(&input).await?;
        let days = self.weather.history(&resolved, start, end).await?;
        let label = input.label();

        let mut observations = Vec::with_capacity(days.len());
        for day in days.into_iter().filter(|d| d.date >= start && d.date <= end) {
            let mut observation = WeatherObservation::new(label.as_str(), day.date, day.temperature)?;
            if let Some(description) = day.description {
                let description: String = description.chars().take(MAX_DESCRIPTION_LEN).collect();
                observation = observation.with_description(description)?;
            }
            observations.push(observation);
        }

        let report = self.store.save_batch(&observations).await?;
        if !report.is_complete() {
            return Err(ApplicationError::Internal(format!(
                "Stored {} of {} history observations: {}",
                report.persisted,
                observations.len(),
                report.errors.join("; ")
            )));
        }

        info!(
            location = %label,
            count = observations.len(),
            "History ingested"
        );
        Ok(observations)
    }

    /// All stored observations
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<WeatherObservation>, ApplicationError> {
        self.store.list_all().await
    }

    /// One observation by ID
    #[instrument(skip(self))]
    pub async fn get(&self, id: &ObservationId) -> Result<WeatherObservation, ApplicationError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id.to_string()).into())
    }

    /// Apply a partial update to an existing observation
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: &ObservationId,
        update: ObservationUpdate,
    ) -> Result<WeatherObservation, ApplicationError> {
        let mut observation = self.get(id).await?;
        if update.is_empty() {
            debug!("Empty update, nothing to write");
            return Ok(observation);
        }

        observation.apply(update)?;
        if !self.store.update(&observation).await? {
            return Err(DomainError::not_found(ENTITY, id.to_string()).into());
        }
        info!(id = %id, "Observation updated");
        Ok(observation)
    }

    /// Delete an observation
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ObservationId) -> Result<(), ApplicationError> {
        if self.store.delete(id).await? {
            info!(id = %id, "Observation deleted");
            Ok(())
        } else {
            Err(DomainError::not_found(ENTITY, id.to_string()).into())
        }
    }
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
    let (y, m, d) = EARLIEST_HISTORY;
    let earliest = NaiveDate::from_ymd_opt(y, m, d).ok_or(DomainError::InvalidDateRange)?;
    if start > end || start < earliest || end < earliest {
        return Err(DomainError::InvalidDateRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use domain::value_objects::{GeoLocation, ResolvedLocation};

    use super::*;
    use crate::ports::{BatchWriteReport, DailyHistory, MockObservationStore, MockWeatherPort};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(store: MockObservationStore, weather: MockWeatherPort) -> RecordService {
        RecordService::new(Arc::new(store), Arc::new(weather))
    }

    fn stored() -> WeatherObservation {
        WeatherObservation::new("Berlin", day(2024, 3, 1), 7.5)
            .unwrap()
            .with_description("Rainy")
            .unwrap()
    }

    fn berlin() -> ResolvedLocation {
        ResolvedLocation {
            coordinates: GeoLocation::new_unchecked(52.52, 13.40),
            name: Some("Berlin".to_string()),
            country: Some("DE".to_string()),
        }
    }

    #[tokio::test]
    async fn create_persists_valid_observation() {
        let mut store = MockObservationStore::new();
        store
            .expect_save()
            .withf(|obs| obs.location == "Berlin" && obs.description.as_deref() == Some("Sunny"))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(store, MockWeatherPort::new());
        let obs = svc
            .create(NewObservation {
                location: " Berlin ".to_string(),
                date: day(2024, 3, 1),
                temperature: 12.345,
                description: Some("Sunny".to_string()),
            })
            .await
            .unwrap();

        assert!((obs.temperature - 12.35).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn create_rejects_oversized_location() {
        let mut store = MockObservationStore::new();
        store.expect_save().never();

        let svc = service(store, MockWeatherPort::new());
        let err = svc
            .create(NewObservation {
                location: "x".repeat(101),
                date: day(2024, 3, 1),
                temperature: 1.0,
                description: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let mut store = MockObservationStore::new();
        store.expect_get().returning(|_| Ok(None));

        let svc = service(store, MockWeatherPort::new());
        let err = svc.get(&ObservationId::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let existing = stored();
        let id = existing.id;

        let mut store = MockObservationStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(existing.clone())));
        store
            .expect_update()
            .withf(|obs| obs.location == "Berlin" && (obs.temperature - 9.0).abs() < f64::EPSILON)
            .times(1)
            .returning(|_| Ok(true));

        let svc = service(store, MockWeatherPort::new());
        let updated = svc
            .update(
                &id,
                ObservationUpdate {
                    temperature: Some(9.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("Rainy"));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let mut store = MockObservationStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_update().never();

        let svc = service(store, MockWeatherPort::new());
        let err = svc
            .update(&ObservationId::new(), ObservationUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn empty_update_skips_write() {
        let existing = stored();
        let id = existing.id;
        let mut store = MockObservationStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(existing.clone())));
        store.expect_update().never();

        let svc = service(store, MockWeatherPort::new());
        assert!(svc.update(&id, ObservationUpdate::default()).await.is_ok());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let mut store = MockObservationStore::new();
        store.expect_delete().returning(|_| Ok(false));

        let svc = service(store, MockWeatherPort::new());
        let err = svc.delete(&ObservationId::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_existing_succeeds() {
        let mut store = MockObservationStore::new();
        store.expect_delete().times(1).returning(|_| Ok(true));

        let svc = service(store, MockWeatherPort::new());
        assert!(svc.delete(&ObservationId::new()).await.is_ok());
    }

    #[tokio::test]
    async fn ingest_rejects_reversed_range() {
        let mut weather = MockWeatherPort::new();
        weather.expect_resolve().never();

        let svc = service(MockObservationStore::new(), weather);
        let err = svc
            .ingest_history("Berlin", day(2024, 3, 5), day(2024, 3, 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid date range");
    }

    #[tokio::test]
    async fn ingest_rejects_dates_before_history() {
        let svc = service(MockObservationStore::new(), MockWeatherPort::new());
        let err = svc
            .ingest_history("Berlin", day(1978, 12, 31), day(1979, 1, 2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidDateRange)
        ));
    }

    #[tokio::test]
    async fn ingest_rejects_invalid_location_first() {
        let svc = service(MockObservationStore::new(), MockWeatherPort::new());
        let err = svc
            .ingest_history("B3rl!n", day(2024, 3, 5), day(2024, 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidLocation(_))
        ));
    }

    #[tokio::test]
    async fn ingest_requires_credentials() {
        let mut weather = MockWeatherPort::new();
        weather.expect_has_credentials().return_const(false);
        weather.expect_resolve().never();

        let svc = service(MockObservationStore::new(), weather);
        let err = svc
            .ingest_history("Berlin", day(2024, 3, 1), day(2024, 3, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::MissingApiKey));
    }

    #[tokio::test]
    async fn ingest_keeps_days_in_range() {
        let mut weather = MockWeatherPort::new();
        weather.expect_has_credentials().return_const(true);
        weather
            .expect_resolve()
            .withf(|input| matches!(input, LocationInput::Zip(_)))
            .times(1)
            .returning(|_| Ok(berlin()));
        weather.expect_history().times(1).returning(|_, _, _| {
            Ok(vec![
                DailyHistory {
                    date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                    temperature: 3.0,
                    description: None,
                },
                DailyHistory {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    temperature: 4.25,
                    description: Some("Snowy".to_string()),
                },
                DailyHistory {
                    date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                    temperature: 5.5,
                    description: None,
                },
            ])
        });

        let mut store = MockObservationStore::new();
        store.expect_save().never();
        store
            .expect_save_batch()
            .withf(|batch| batch.len() == 2 && batch.iter().all(|obs| obs.location == "10115"))
            .times(1)
            .returning(|batch| {
                Ok(BatchWriteReport {
                    persisted: batch.len(),
                    ..Default::default()
                })
            });

        let svc = service(store, weather);
        let stored = svc
            .ingest_history("10115", day(2024, 3, 1), day(2024, 3, 2))
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].date, day(2024, 3, 1));
        assert_eq!(stored[0].description.as_deref(), Some("Snowy"));
    }

    fn two_day_history() -> MockWeatherPort {
        let mut weather = MockWeatherPort::new();
        weather.expect_has_credentials().return_const(true);
        weather.expect_resolve().returning(|_| Ok(berlin()));
        weather.expect_history().returning(|_, _, _| {
            Ok(vec![
                DailyHistory {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    temperature: 4.0,
                    description: None,
                },
                DailyHistory {
                    date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                    temperature: 5.0,
                    description: None,
                },
            ])
        });
        weather
    }

    #[tokio::test]
    async fn ingest_fails_when_a_row_is_rejected() {
        let mut store = MockObservationStore::new();
        store.expect_save().never();
        store.expect_save_batch().times(1).returning(|_| {
            let mut report = BatchWriteReport {
                persisted: 1,
                ..Default::default()
            };
            report.record_failure("UNIQUE constraint failed: weather_records.id");
            Ok(report)
        });

        let svc = service(store, two_day_history());
        let err = svc
            .ingest_history("Berlin", day(2024, 3, 1), day(2024, 3, 2))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Internal(_)));
        assert!(err.to_string().contains("Stored 1 of 2"));
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }

    #[tokio::test]
    async fn ingest_propagates_batch_failure() {
        let mut store = MockObservationStore::new();
        store
            .expect_save_batch()
            .times(1)
            .returning(|_| Err(ApplicationError::Internal("database is locked".to_string())));

        let svc = service(store, two_day_history());
        let result = svc
            .ingest_history("Berlin", day(2024, 3, 1), day(2024, 3, 2))
            .await;

        assert!(matches!(result, Err(ApplicationError::Internal(msg)) if msg == "database is locked"));
    }
}
