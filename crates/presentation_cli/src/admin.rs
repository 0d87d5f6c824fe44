//! Database administration and request helpers for the CLI

use domain::LocationInput;
use infrastructure::{
    AppConfig, AsyncDatabase, AsyncDatabaseConfig, SqliteObservationStore,
    seed::{SeedOptions, SeedProgress, SeedReport, seed_database},
};
use tracing::info;

/// Open the configured database
pub async fn open_database(config: &AppConfig) -> anyhow::Result<AsyncDatabase> {
    let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(&config.database)).await?;
    info!(path = %config.database.path, "Database opened");
    Ok(database)
}

/// Apply pending migrations to the configured database
pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let database = open_database(config).await?;
    database.migrate().await?;
    database.close().await;
    Ok(())
}

/// Migrate, then clear and repopulate the observation table
pub async fn seed(
    config: &AppConfig,
    options: &SeedOptions,
    on_batch: impl FnMut(SeedProgress) + Send,
) -> anyhow::Result<SeedReport> {
    let database = open_database(config).await?;
    database.migrate().await?;

    let store = SqliteObservationStore::new(database.pool().clone());
    let report = seed_database(&store, options, on_batch).await?;

    database.close().await;
    Ok(report)
}

/// One-line description of how a location string classifies
pub fn describe_location(raw: &str) -> Result<String, String> {
    LocationInput::parse(raw)
        .map(|input| format!("{} ({})", input.label(), input.kind()))
        .map_err(|rejection| rejection.to_string())
}

/// Join a server base URL and a path
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Query parameters for the weather routes
pub fn weather_query(
    location: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Vec<(&'static str, String)> {
    match (location, lat, lon) {
        (_, Some(lat), Some(lon)) => vec![("lat", lat.to_string()), ("lon", lon.to_string())],
        (Some(location), _, _) => vec![("location", location.to_string())],
        _ => Vec::new(),
    }
}
