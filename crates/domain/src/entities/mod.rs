//! Domain entities - Objects with identity and lifecycle

mod weather_observation;

pub use weather_observation::{
    MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN, ObservationUpdate, WeatherObservation,
};
