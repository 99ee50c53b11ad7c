//! Weather sensor ingestion and statistics service.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): each
//! module exposes a small surface and this gateway re-exports what the
//! binary and the integration tests need.
//! - `config`    – environment-driven configuration
//! - `models`    – sensors, readings and request/response shapes
//! - `store`     – storage interface plus PostgreSQL and memory backends
//! - `service`   – ingestion and query components
//! - `statistic` – sum / min / max / average
//! - `window`    – query time windows and timestamp parsing
//! - `routes`    – axum HTTP gateway
//! - `schema`    – idempotent PostgreSQL schema setup

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod service;
pub mod statistic;
pub mod store;
pub mod window;

pub use config::{Config, StoreBackend};
pub use error::{Error, Result};
pub use service::{Ingestion, MetricQuery, SensorStats, WeatherService};
pub use statistic::Statistic;
pub use store::{MemoryStore, PgStore, SensorStore};
pub use window::TimeWindow;
