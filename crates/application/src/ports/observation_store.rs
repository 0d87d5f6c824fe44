//! Observation storage port
//!
//! Defines the interface for persisting and querying weather observations.
//! Adapters in the infrastructure layer implement this port using SQLite.

use async_trait::async_trait;
use domain::{entities::WeatherObservation, value_objects::ObservationId};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::error::ApplicationError;

/// Aggregated outcome of a batch write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchWriteReport {
    /// Rows written
    pub persisted: usize,
    /// Rows rejected
    pub failed: usize,
    /// One message per rejected row
    #[serde(skip)]
    pub errors: Vec<String>,
}

impl BatchWriteReport {
    /// Report for a batch where every row failed for the same reason
    #[must_use]
    pub fn all_failed(count: usize, error: impl Into<String>) -> Self {
        Self {
            persisted: 0,
            failed: count,
            errors: vec![error.into()],
        }
    }

    /// Record one rejected row
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(error.into());
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: Self) {
        self.persisted += other.persisted;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }

    /// True when nothing failed
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Port for observation persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Insert a single observation
    async fn save(&self, observation: &WeatherObservation) -> Result<(), ApplicationError>;

    /// Insert many observations inside one transaction
    ///
    /// Individual row failures are counted in the report. An `Err` means the
    /// transaction itself could not be opened or committed.
    async fn save_batch(
        &self,
        observations: &[WeatherObservation],
    ) -> Result<BatchWriteReport, ApplicationError>;

    /// All observations, ordered by date then location
    async fn list_all(&self) -> Result<Vec<WeatherObservation>, ApplicationError>;

    /// Fetch one observation
    async fn get(&self, id: &ObservationId)
    -> Result<Option<WeatherObservation>, ApplicationError>;

    /// Overwrite an existing observation, returning false if it does not exist
    async fn update(&self, observation: &WeatherObservation) -> Result<bool, ApplicationError>;

    /// Delete an observation, returning false if it does not exist
    async fn delete(&self, id: &ObservationId) -> Result<bool, ApplicationError>;

    /// Remove every observation, returning how many were deleted
    async fn clear(&self) -> Result<u64, ApplicationError>;
}
