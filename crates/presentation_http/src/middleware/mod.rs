//! HTTP middleware components
//!
//! Request counting and body validation.

pub mod rate_limit;
pub mod validation;

pub use rate_limit::{
    RateLimiter, RateLimiterConfig, RateLimiterLayer, RateLimiterState, WindowStatus,
    spawn_cleanup_task,
};
pub use validation::{ValidatedJson, ValidationError};
