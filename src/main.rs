//! Hotel Flor de Lima booking server.
//!
//! Main entry point that wires the crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use hotel_api::{AppState, build_router};
use hotel_core::config::AppConfig;
use hotel_core::error::AppError;
use hotel_database::DatabasePool;
use hotel_database::repositories::{CatalogRepository, OrderRepository, ReservationRepository};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the environment overlay and `HOTEL__` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("HOTEL_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        utc_offset_minutes = config.booking.utc_offset_minutes,
        "Starting Flor de Lima booking server"
    );

    let db_pool = DatabasePool::connect(&config.database).await?;
    hotel_database::migration::run_migrations(db_pool.pool()).await?;

    let catalog = Arc::new(CatalogRepository::new(db_pool.pool().clone()));
    let reservations = Arc::new(ReservationRepository::new(db_pool.pool().clone()));
    let orders = Arc::new(OrderRepository::new(db_pool.pool().clone()));

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, Some(db_pool.clone()), catalog, reservations, orders);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections");
    });

    let result = server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)));

    if tokio::time::timeout(grace, db_pool.close()).await.is_err() {
        tracing::warn!(grace_seconds = grace.as_secs(), "Database pool did not close in time");
    }
    tracing::info!("Server stopped");
    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
