//! Persistence module
//!
//! sqlx SQLite pool, migrations and the weather observation store.

pub mod async_connection;
mod error;
pub mod observation_store;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use error::map_sqlx_error;
pub use observation_store::SqliteObservationStore;
