//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod location;
mod observation_id;
mod weather;

pub use geo_location::{CoordinateError, GeoLocation};
pub use location::{
    CityName, LocationInput, LocationRejection, LocationValidation, ZipCode, is_valid_location,
    validate_location,
};
pub use observation_id::ObservationId;
pub use weather::{NormalizedWeather, ResolvedLocation, WeatherReading};
