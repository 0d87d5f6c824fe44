//! Observation store using sqlx
//!
//! Rows live in `weather_records`. Dates are stored as `YYYY-MM-DD` text and
//! temperatures in a `DECIMAL(5,2)` column, which SQLite may hand back as an
//! integer, so reads cast it to `REAL`.

use application::{
    error::ApplicationError,
    ports::{BatchWriteReport, ObservationStore},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{entities::WeatherObservation, value_objects::ObservationId};
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use super::error::map_sqlx_error;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT id, location, date, CAST(temperature AS REAL) AS temperature, \
                              description FROM weather_records";

/// SQLite-backed observation store
#[derive(Debug, Clone)]
pub struct SqliteObservationStore {
    pool: SqlitePool,
}

impl SqliteObservationStore {
    /// Create a new observation store over an existing pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn format_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }
}

#[async_trait]
impl ObservationStore for SqliteObservationStore {
    #[instrument(skip(self, observation), fields(id = %observation.id))]
    async fn save(&self, observation: &WeatherObservation) -> Result<(), ApplicationError> {
        sqlx::query(
            r"
            INSERT INTO weather_records (id, location, date, temperature, description)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(observation.id.to_string())
        .bind(&observation.location)
        .bind(Self::format_date(observation.date))
        .bind(observation.temperature)
        .bind(&observation.description)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!("Observation saved");
        Ok(())
    }

    #[instrument(skip(self, observations), fields(count = observations.len()))]
    async fn save_batch(
        &self,
        observations: &[WeatherObservation],
    ) -> Result<BatchWriteReport, ApplicationError> {
        let mut report = BatchWriteReport::default();
        if observations.is_empty() {
            return Ok(report);
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for observation in observations {
            let result = sqlx::query(
                r"
                INSERT INTO weather_records (id, location, date, temperature, description)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(observation.id.to_string())
            .bind(&observation.location)
            .bind(Self::format_date(observation.date))
            .bind(observation.temperature)
            .bind(&observation.description)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => report.persisted += 1,
                Err(e) => {
                    warn!(id = %observation.id, error = %e, "Failed to insert observation");
                    report.record_failure(format!("{}: {e}", observation.id));
                },
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(
            persisted = report.persisted,
            failed = report.failed,
            "Batch committed"
        );
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<WeatherObservation>, ApplicationError> {
        let rows: Vec<ObservationRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY date, location"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(ObservationRow::into_observation).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get(
        &self,
        id: &ObservationId,
    ) -> Result<Option<WeatherObservation>, ApplicationError> {
        let row: Option<ObservationRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ObservationRow::into_observation).transpose()
    }

    #[instrument(skip(self, observation), fields(id = %observation.id))]
    async fn update(&self, observation: &WeatherObservation) -> Result<bool, ApplicationError> {
        let result = sqlx::query(
            r"
            UPDATE weather_records
            SET location = $2, date = $3, temperature = $4, description = $5
            WHERE id = $1
            ",
        )
        .bind(observation.id.to_string())
        .bind(&observation.location)
        .bind(Self::format_date(observation.date))
        .bind(observation.temperature)
        .bind(&observation.description)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &ObservationId) -> Result<bool, ApplicationError> {
        let result = sqlx::query("DELETE FROM weather_records WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<u64, ApplicationError> {
        let result = sqlx::query("DELETE FROM weather_records")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(deleted = result.rows_affected(), "Observations cleared");
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct ObservationRow {
    id: String,
    location: String,
    date: String,
    temperature: f64,
    description: Option<String>,
}

impl ObservationRow {
    fn into_observation(self) -> Result<WeatherObservation, ApplicationError> {
        let id = ObservationId::parse(&self.id)
            .map_err(|e| ApplicationError::Internal(format!("Invalid observation ID: {e}")))?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| ApplicationError::Internal(format!("Invalid stored date: {e}")))?;

        Ok(WeatherObservation {
            id,
            location: self.location,
            date,
            temperature: self.temperature,
            description: self.description,
        })
    }
}
