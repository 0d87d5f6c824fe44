//! Domain layer for the weather proxy
//!
//! Location classification, weather observations and the value objects
//! shared by every other crate. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
