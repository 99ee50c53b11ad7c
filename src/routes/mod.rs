//! HTTP gateway for the weather statistics API (EMBP).
//!
//! Each sibling module owns one endpoint and exports a subrouter; this
//! gateway merges them and attaches the shared state, so `main.rs` only
//! ever calls [`router`].
use axum::Router;

use crate::{Config, WeatherService};

mod create_sensor;
mod error;
mod health;
mod metrics;

// ---

/// State shared by every handler.
pub type AppState = (WeatherService, Config);

pub fn router(service: WeatherService, config: Config) -> Router {
    // ---
    Router::new()
        .merge(create_sensor::router())
        .merge(metrics::router())
        .merge(health::router())
        .with_state((service, config))
}
