//! Weather proxy HTTP presentation layer
//!
//! Axum routes over the weather and record services.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use middleware::{RateLimiterConfig, RateLimiterLayer, ValidatedJson, ValidationError};
pub use routes::create_router;
pub use state::AppState;
