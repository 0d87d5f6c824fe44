//! Weather proxy CLI
//!
//! Database administration and quick checks against a running server.

#![allow(clippy::print_stdout)]

mod admin;

use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, TelemetryConfig, init_tracing, seed::SeedOptions};

/// Weather proxy CLI
#[derive(Debug, Parser)]
#[command(name = "weather-proxy-cli")]
#[command(author, version, about = "Weather proxy administration CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply database migrations to the configured database
    Migrate,

    /// Fill the database with synthetic observations
    ///
    /// Existing rows are removed first unless --keep is given.
    Seed {
        /// Days of data per location, ending today
        #[arg(short, long, default_value_t = 30)]
        days: u32,

        /// Keep existing observations
        #[arg(long)]
        keep: bool,
    },

    /// Classify a location string the way the server does
    Validate {
        /// City name, 5-digit zip code or "lat,lon"
        location: String,
    },

    /// Check server health
    Health {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },

    /// Fetch current weather from a running server
    Current {
        /// Server URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,

        /// Location string
        #[arg(short, long, required_unless_present = "lat", conflicts_with = "lat")]
        location: Option<String>,

        /// Latitude
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TelemetryConfig {
        log_filter: log_filter_from_verbosity(cli.verbose).to_string(),
        ..TelemetryConfig::default()
    })?;

    match cli.command {
        Commands::Migrate => {
            let config = AppConfig::load()?;
            admin::migrate(&config).await?;
            println!("✅ Migrations applied to {}", config.database.path);
        },

        Commands::Seed { days, keep } => {
            let config = AppConfig::load()?;
            let options = SeedOptions {
                days,
                keep_existing: keep,
            };
            println!("🌱 Seeding {} with {days} day(s) per location", config.database.path);

            let report = admin::seed(&config, &options, |progress| {
                println!(
                    "   Batch {}/{}: {} inserted, {} failed",
                    progress.batch, progress.total_batches, progress.persisted, progress.failed
                );
            })
            .await?;

            if !keep {
                println!("   Cleared {} existing row(s)", report.cleared);
            }
            println!(
                "✅ Seeded {} observation(s), {} failed",
                report.writes.persisted, report.writes.failed
            );
        },

        Commands::Validate { location } => match admin::describe_location(&location) {
            Ok(description) => println!("✅ {description}"),
            Err(reason) => {
                println!("❌ {reason}");
                std::process::exit(1);
            },
        },

        Commands::Health { url } => {
            let client = reqwest::Client::new();
            match client.get(admin::endpoint_url(&url, "/health")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body = resp.json::<serde_json::Value>().await?;
                    println!("✅ Healthy");
                    println!("{}", serde_json::to_string_pretty(&body)?);
                },
                Ok(resp) => {
                    println!("❌ Unhealthy: HTTP {}", resp.status());
                    std::process::exit(1);
                },
                Err(e) => {
                    println!("❌ Unhealthy: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Current {
            url,
            location,
            lat,
            lon,
        } => {
            let client = reqwest::Client::new();
            let resp = client
                .post(admin::endpoint_url(&url, "/api/weather/current"))
                .query(&admin::weather_query(location.as_deref(), lat, lon))
                .send()
                .await?;
            let status = resp.status();
            let body = resp.json::<serde_json::Value>().await?;

            if status.is_success() {
                println!("{}", serde_json::to_string_pretty(&body["data"])?);
            } else {
                let error = body["error"].as_str().unwrap_or("unknown error");
                println!("❌ HTTP {status}: {error}");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
