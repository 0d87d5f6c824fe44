//! Weather lookup handlers
//!
//! Both routes take `location` or a `lat`/`lon` pair as query parameters.

use application::{BatchWriteReport, WeatherQuery};
use axum::{
    Json,
    extract::{Query, State},
};
use domain::NormalizedWeather;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Query parameters accepted by the weather routes
#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub location: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl WeatherParams {
    fn to_query(&self) -> Result<WeatherQuery, ApiError> {
        WeatherQuery::from_params(
            self.location.as_deref(),
            self.lat.as_deref(),
            self.lon.as_deref(),
        )
        .map_err(ApiError::from)
    }
}

/// Current weather response
#[derive(Debug, Serialize)]
pub struct CurrentWeatherResponse {
    pub success: bool,
    pub data: NormalizedWeather,
}

/// Forecast response with the outcome of recording its entries
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    pub data: Vec<NormalizedWeather>,
    pub persistence: BatchWriteReport,
}

/// POST /api/weather/current
#[instrument(skip(state))]
pub async fn current_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<CurrentWeatherResponse>, ApiError> {
    let query = params.to_query()?;
    let data = state.weather_service.fetch_current(&query).await?;

    debug!(city = %data.city, "Current weather served");
    Ok(Json(CurrentWeatherResponse {
        success: true,
        data,
    }))
}

/// POST /api/weather/forecast
#[instrument(skip(state))]
pub async fn forecast(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let query = params.to_query()?;
    let outcome = state.weather_service.fetch_forecast(&query).await?;

    debug!(entries = outcome.items.len(), "Forecast served");
    Ok(Json(ForecastResponse {
        success: true,
        data: outcome.items,
        persistence: outcome.persistence,
    }))
}
