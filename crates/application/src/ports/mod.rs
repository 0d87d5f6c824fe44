//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod observation_store;
mod weather_port;

#[cfg(test)]
pub use observation_store::MockObservationStore;
pub use observation_store::{BatchWriteReport, ObservationStore};
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::{DailyHistory, WeatherPort};
