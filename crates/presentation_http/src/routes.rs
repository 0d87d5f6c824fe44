//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{error, handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Upstream weather
        .route("/api/weather/current", post(handlers::weather::current_weather))
        .route("/api/weather/forecast", post(handlers::weather::forecast))
        // Stored observations
        .route(
            "/api/records",
            get(handlers::records::list_records).post(handlers::records::create_records),
        )
        .route(
            "/api/records/{id}",
            get(handlers::records::get_record)
                .put(handlers::records::update_record)
                .delete(handlers::records::delete_record),
        )
        .fallback(error::endpoint_not_found)
        .with_state(state)
}
