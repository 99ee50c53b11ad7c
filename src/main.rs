//! Application entry point for the `weather-stats` service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Opening the configured sensor store (PostgreSQL pool plus schema, or
//!   the in-memory store)
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests until Ctrl-C
//!
//! # Environment Variables
//! - `STORE_BACKEND` (optional) – `postgres` (default) or `memory`
//! - `DATABASE_URL` (**required** for postgres) – PostgreSQL connection string
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `HTTP_ADDR` (optional) – listen address (default: `0.0.0.0:8080`)
//! - `QUERY_WINDOW_DAYS` (optional) – default query window (default: 7)
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, io::IsTerminal, sync::Arc};

use anyhow::{anyhow, Result};
use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use weather_stats::config::{self, mask_db_url};
use weather_stats::{routes, schema, Config, MemoryStore, PgStore, SensorStore, StoreBackend, WeatherService};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let store = open_store(&cfg).await?;
    let service = WeatherService::new(store);

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(service, cfg.clone());

    tracing::info!("Listening on {}", cfg.http_addr);

    let listener = tokio::net::TcpListener::bind(cfg.http_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

// ---

/// Open the store selected by `STORE_BACKEND`.
///
/// For PostgreSQL this connects the pool and creates the schema if needed.
async fn open_store(cfg: &Config) -> Result<Arc<dyn SensorStore>> {
    // ---
    match cfg.store_backend {
        StoreBackend::Postgres => {
            let db_url = cfg
                .db_url
                .as_deref()
                .ok_or_else(|| anyhow!("DATABASE_URL must be set for the postgres backend"))?;

            tracing::info!("Attempting to connect to database: {}", mask_db_url(db_url));

            let pool = PgPoolOptions::new()
                .max_connections(cfg.db_pool_max)
                .connect(db_url)
                .await
                .map_err(|e| anyhow!("Failed to connect to database '{}': {}", mask_db_url(db_url), e))?;

            tracing::info!("Successfully connected to database");

            schema::create_schema(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `AXUM_LOG_LEVEL` env var
///
/// Call once at startup, before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AXUM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
