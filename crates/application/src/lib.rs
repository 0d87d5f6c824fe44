//! Application layer - Use cases and orchestration
//!
//! Defines the ports the weather proxy talks through and the services that
//! orchestrate validation, upstream fetches and persistence.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, ErrorKind};
pub use ports::*;
pub use services::*;
