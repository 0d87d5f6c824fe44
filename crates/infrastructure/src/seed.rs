//! Database seeding with synthetic observations
//!
//! Generates one observation per day for a fixed set of locations, ending
//! today, and writes them through the observation store in batches.

use application::{
    error::ApplicationError,
    ports::{BatchWriteReport, ObservationStore},
};
use chrono::{Days, NaiveDate, Utc};
use domain::entities::WeatherObservation;
use rand::{Rng, seq::IndexedRandom};
use tracing::{info, instrument};

/// Locations seeded by default
pub const SEED_LOCATIONS: [&str; 5] = [
    "New York,US",
    "London,UK",
    "Tokyo,JP",
    "Sydney,AU",
    "Berlin,DE",
];

const DESCRIPTIONS: [&str; 6] = [
    "Sunny",
    "Partly Cloudy",
    "Cloudy",
    "Rainy",
    "Thunderstorm",
    "Snowy",
];

/// Rows per store batch
pub const SEED_BATCH_SIZE: usize = 50;

/// Seeding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOptions {
    /// Days of data per location, ending today
    pub days: u32,
    /// Keep existing rows instead of clearing the table first
    pub keep_existing: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            days: 30,
            keep_existing: false,
        }
    }
}

/// Progress of one written batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedProgress {
    /// 1-based batch number
    pub batch: usize,
    pub total_batches: usize,
    pub persisted: usize,
    pub failed: usize,
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows removed before seeding
    pub cleared: u64,
    pub batches: usize,
    pub writes: BatchWriteReport,
}

/// Build the synthetic observations for every seed location
///
/// Dates run from `today - (days - 1)` through `today`. Each day draws a base
/// temperature in [5, 30] and a temperature within 5 degrees of it, both
/// with one fractional digit.
pub fn generate_observations<R: Rng + ?Sized>(
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<WeatherObservation> {
    let mut observations = Vec::with_capacity(SEED_LOCATIONS.len() * days as usize);

    for location in SEED_LOCATIONS {
        for offset in (0..days).rev() {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                continue;
            };
            let base = one_decimal(rng.random_range(5.0..=30.0));
            let temperature = one_decimal(rng.random_range(base - 5.0..=base + 5.0));
            let description = DESCRIPTIONS.choose(rng).copied().unwrap_or("Sunny");

            // Seed values are always within column bounds.
            if let Ok(observation) = WeatherObservation::new(location, date, temperature)
                .and_then(|o| o.with_description(description))
            {
                observations.push(observation);
            }
        }
    }

    observations
}

/// Clear (unless asked to keep) and repopulate the store
///
/// `on_batch` is called after every batch is written.
#[instrument(skip(store, on_batch))]
pub async fn seed_database(
    store: &dyn ObservationStore,
    options: &SeedOptions,
    mut on_batch: impl FnMut(SeedProgress) + Send,
) -> Result<SeedReport, ApplicationError> {
    let mut report = SeedReport::default();

    if !options.keep_existing {
        report.cleared = store.clear().await?;
        info!(cleared = report.cleared, "Cleared existing observations");
    }

    let observations = generate_observations(
        options.days,
        Utc::now().date_naive(),
        &mut rand::rng(),
    );
    let total_batches = observations.len().div_ceil(SEED_BATCH_SIZE);

    for (index, batch) in observations.chunks(SEED_BATCH_SIZE).enumerate() {
        let written = store.save_batch(batch).await?;
        let progress = SeedProgress {
            batch: index + 1,
            total_batches,
            persisted: written.persisted,
            failed: written.failed,
        };
        info!(
            batch = progress.batch,
            total = total_batches,
            persisted = written.persisted,
            "Seeded batch"
        );
        on_batch(progress);
        report.writes.merge(written);
        report.batches += 1;
    }

    info!(
        persisted = report.writes.persisted,
        failed = report.writes.failed,
        "Database seeded"
    );
    Ok(report)
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
