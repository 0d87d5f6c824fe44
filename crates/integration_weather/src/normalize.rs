//! Mapping of upstream entries into the normalized weather shape

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use domain::value_objects::{NormalizedWeather, WeatherReading};
use serde::{Deserialize, Serialize};

use crate::{client::WeatherError, models::WeatherEntry};

const UNKNOWN_CITY: &str = "Unknown City";

/// Place metadata that overrides what the entry itself carries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceHint {
    pub name: Option<String>,
    pub country: Option<String>,
}

impl PlaceHint {
    /// Fill gaps in `self` from `fallback`
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            name: non_empty(self.name).or_else(|| non_empty(fallback.name)),
            country: non_empty(self.country).or_else(|| non_empty(fallback.country)),
        }
    }
}

/// Map one upstream entry into the normalized shape
///
/// City comes from the hint, then the entry's `name`, then `Unknown City`.
/// Country comes from the hint, then `sys.country`, then empty.
///
/// # Errors
///
/// Returns `WeatherError::InvalidData` when `main` is absent or `weather`
/// is absent or empty.
pub fn map_weather_data(
    entry: &WeatherEntry,
    hint: &PlaceHint,
) -> Result<NormalizedWeather, WeatherError> {
    let main = entry
        .main
        .as_ref()
        .ok_or_else(|| WeatherError::InvalidData("missing main block".to_string()))?;
    let condition = entry
        .weather
        .as_ref()
        .and_then(|w| w.first())
        .ok_or_else(|| WeatherError::InvalidData("missing weather conditions".to_string()))?;

    let city = non_empty(hint.name.clone())
        .or_else(|| non_empty(entry.name.clone()))
        .unwrap_or_else(|| UNKNOWN_CITY.to_string());
    let country = non_empty(hint.country.clone())
        .or_else(|| non_empty(entry.sys.as_ref().and_then(|s| s.country.clone())))
        .unwrap_or_default();

    Ok(NormalizedWeather {
        temp: main.temp,
        feels_like: main.feels_like,
        temp_min: main.temp_min,
        temp_max: main.temp_max,
        pressure: main.pressure,
        humidity: main.humidity,
        description: condition.description.clone(),
        icon: condition.icon.clone(),
        city,
        country,
    })
}

/// UTC calendar day of an upstream timestamp
///
/// # Errors
///
/// Returns `WeatherError::InvalidData` for timestamps chrono cannot represent.
pub fn observation_date(dt: i64) -> Result<NaiveDate, WeatherError> {
    DateTime::from_timestamp(dt, 0)
        .map(|t| t.date_naive())
        .ok_or_else(|| WeatherError::InvalidData(format!("timestamp out of range: {dt}")))
}

/// Normalized weather plus its observation day
///
/// # Errors
///
/// Same as [`map_weather_data`] and [`observation_date`].
pub fn to_reading(entry: &WeatherEntry, hint: &PlaceHint) -> Result<WeatherReading, WeatherError> {
    Ok(WeatherReading {
        weather: map_weather_data(entry, hint)?,
        observed_on: observation_date(entry.dt)?,
    })
}

/// One day of aggregated hourly history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Mean of the hourly `main.temp` values
    pub mean_temp: f64,
    /// First hourly description of the day
    pub description: Option<String>,
}

/// Fold hourly entries into one summary per UTC day, in date order
///
/// Entries without a `main` block or with an unrepresentable timestamp are
/// skipped.
#[must_use]
pub fn summarize_daily(entries: &[WeatherEntry]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, (f64, u32, Option<String>)> = BTreeMap::new();

    for entry in entries {
        let (Some(main), Ok(date)) = (entry.main.as_ref(), observation_date(entry.dt)) else {
            continue;
        };
        let description = entry
            .weather
            .as_ref()
            .and_then(|w| w.first())
            .map(|c| c.description.clone());

        let slot = days.entry(date).or_insert((0.0, 0, None));
        slot.0 += main.temp;
        slot.1 += 1;
        if slot.2.is_none() {
            slot.2 = description;
        }
    }

    days.into_iter()
        .map(|(date, (sum, count, description))| DailySummary {
            date,
            mean_temp: sum / f64::from(count),
            description,
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
