//! OpenWeatherMap integration
//!
//! Client for the OpenWeatherMap geocoding, current weather, forecast and
//! history APIs (<https://openweathermap.org/api>), plus the mapping of their
//! payloads into the normalized weather shape.

pub mod client;
mod models;
pub mod normalize;

pub use client::{OpenWeatherMapClient, WeatherApiClient, WeatherConfig, WeatherError};
pub use models::{
    CityBlock, Condition, ForecastResponse, GeocodedPlace, HistoryResponse, MainBlock, SysBlock,
    WeatherEntry,
};
pub use normalize::{
    DailySummary, PlaceHint, map_weather_data, observation_date, summarize_daily, to_reading,
};
