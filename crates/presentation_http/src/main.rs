//! Weather proxy HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};

use application::{ObservationStore, RecordService, WeatherPort, WeatherService};
use axum::http::{HeaderName, HeaderValue, Method, header};
use infrastructure::{
    AppConfig, AsyncDatabase, AsyncDatabaseConfig, ConfigValidator, SqliteObservationStore,
    WeatherAdapter, init_tracing,
};
use presentation_http::{
    RateLimiterConfig, RateLimiterLayer, middleware::spawn_cleanup_task, routes, state::AppState,
};
use tokio::{net::TcpListener, signal, sync::Notify};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.telemetry)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Weather proxy starting"
    );

    ConfigValidator::log_warnings(&config.validate());

    let database = AsyncDatabase::new(&AsyncDatabaseConfig::from(&config.database)).await?;
    if config.database.run_migrations {
        database.migrate().await?;
    }
    info!(path = %config.database.path, "Database ready");

    let store: Arc<dyn ObservationStore> =
        Arc::new(SqliteObservationStore::new(database.pool().clone()));
    let weather: Arc<dyn WeatherPort> =
        Arc::new(WeatherAdapter::with_config(config.weather.client_config())?);

    let weather_service = WeatherService::new(Arc::clone(&weather), Arc::clone(&store));
    let record_service = RecordService::new(store, weather);

    let config = Arc::new(config);
    let state = AppState::new(
        Arc::new(weather_service),
        Arc::new(record_service),
        Arc::clone(&config),
    );

    let rate_limiter = RateLimiterLayer::new(&RateLimiterConfig::from(&config.rate_limit));
    if config.rate_limit.enabled {
        spawn_cleanup_task(
            rate_limiter.state(),
            Duration::from_secs(config.rate_limit.cleanup_interval_secs.max(1)),
        );
    }

    // First added = innermost
    let mut app = routes::create_router(state)
        .layer(RequestBodyLimitLayer::new(
            config.server.max_body_size_json_bytes,
        ))
        .layer(rate_limiter);
    if config.server.cors_enabled {
        app = app.layer(cors_layer(&config));
    }
    let app = app.layer(TraceLayer::new_for_http());

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    let signalled = Arc::new(Notify::new());
    let notify = Arc::clone(&signalled);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        notify.notify_one();
    })
    .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        () = signalled.notified() => {
            let drain = Duration::from_secs(config.server.shutdown_timeout_secs);
            info!(timeout = ?drain, "Draining open connections");
            match tokio::time::timeout(drain, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!("Shutdown timeout elapsed, dropping remaining connections"),
            }
        }
    }

    database.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Any origin in development; in production only the configured origins, with credentials
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.is_production() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    // Credentials forbid wildcard methods and headers
    let allowed_headers: [HeaderName; 2] = [header::CONTENT_TYPE, header::AUTHORIZATION];
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(allowed_headers)
        .allow_credentials(true)
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
