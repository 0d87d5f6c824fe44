//! Stored observation handlers
//!
//! `POST /api/records` accepts either a single observation or a history
//! ingestion request; the body shape decides which.

use application::NewObservation;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use domain::{DomainError, ObservationId, ObservationUpdate, WeatherObservation};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::{Validate, ValidationErrors};

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Body for a single explicitly created observation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecordRequest {
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    pub date: NaiveDate,
    #[validate(range(min = -999.99, max = 999.99))]
    pub temperature: f64,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Body asking for daily history to be fetched and stored
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngestHistoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Either body accepted by `POST /api/records`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordsRequest {
    Ingest(IngestHistoryRequest),
    Create(CreateRecordRequest),
}

impl Validate for RecordsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Ingest(req) => req.validate(),
            Self::Create(req) => req.validate(),
        }
    }
}

/// Body for `PUT /api/records/{id}`, every field optional
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRecordRequest {
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(range(min = -999.99, max = 999.99))]
    pub temperature: Option<f64>,
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

impl From<UpdateRecordRequest> for ObservationUpdate {
    fn from(req: UpdateRecordRequest) -> Self {
        Self {
            location: req.location,
            date: req.date,
            temperature: req.temperature,
            description: req.description,
        }
    }
}

/// Malformed ids cannot exist, so they are reported like missing ones
fn parse_id(raw: &str) -> Result<ObservationId, ApiError> {
    ObservationId::parse(raw).map_err(|_| {
        ApiError::NotFound(DomainError::not_found("WeatherObservation", raw).to_string())
    })
}

/// POST /api/records
#[instrument(skip(state, body))]
pub async fn create_records(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RecordsRequest>,
) -> Result<Response, ApiError> {
    match body {
        RecordsRequest::Create(req) => {
            let record = state
                .record_service
                .create(NewObservation {
                    location: req.location,
                    date: req.date,
                    temperature: req.temperature,
                    description: req.description,
                })
                .await?;
            Ok((StatusCode::CREATED, Json(record)).into_response())
        },
        RecordsRequest::Ingest(req) => {
            let records = state
                .record_service
                .ingest_history(&req.location, req.start_date, req.end_date)
                .await?;
            info!(count = records.len(), location = %req.location, "History ingested");
            Ok((StatusCode::CREATED, Json(records)).into_response())
        },
    }
}

/// GET /api/records
#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeatherObservation>>, ApiError> {
    Ok(Json(state.record_service.list().await?))
}

/// GET /api/records/{id}
#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeatherObservation>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.record_service.get(&id).await?))
}

/// PUT /api/records/{id}
#[instrument(skip(state, body))]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateRecordRequest>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.record_service.update(&id, body.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/records/{id}
#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.record_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_with_dates_is_ingest() {
        let body: RecordsRequest = serde_json::from_str(
            r#"{"location": "London,UK", "startDate": "2024-01-01", "endDate": "2024-01-07"}"#,
        )
        .unwrap();
        assert!(matches!(body, RecordsRequest::Ingest(_)));
    }

    #[test]
    fn body_with_temperature_is_create() {
        let body: RecordsRequest = serde_json::from_str(
            r#"{"location": "Paris", "date": "2024-01-01", "temperature": 3.5}"#,
        )
        .unwrap();
        match body {
            RecordsRequest::Create(req) => {
                assert_eq!(req.location, "Paris");
                assert!(req.description.is_none());
            },
            RecordsRequest::Ingest(_) => panic!("expected create body"),
        }
    }

    #[test]
    fn create_bounds_are_checked() {
        let body = RecordsRequest::Create(CreateRecordRequest {
            location: "Paris".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            temperature: 1234.0,
            description: Some("x".repeat(101)),
        });
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("temperature"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn update_converts_to_domain() {
        let update: ObservationUpdate = UpdateRecordRequest {
            temperature: Some(4.0),
            ..UpdateRecordRequest::default()
        }
        .into();
        assert_eq!(update.temperature, Some(4.0));
        assert!(update.location.is_none());
    }

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
