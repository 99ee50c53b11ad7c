//! Ingestion and query components.
//!
//! [`WeatherService`] holds a handle to the configured [`SensorStore`] and
//! is cheap to clone, so the router keeps one copy in its state. The two
//! operations live in sibling modules:
//! - `ingest` – validate and upsert a sensor with its readings
//! - `query`  – resolve sensors and aggregate their readings
use std::sync::Arc;

use crate::store::SensorStore;

mod ingest;
mod query;

pub use ingest::Ingestion;
pub use query::{MetricQuery, SensorStats};

// ---

#[derive(Clone)]
pub struct WeatherService {
    store: Arc<dyn SensorStore>,
}

impl WeatherService {
    pub fn new(store: Arc<dyn SensorStore>) -> Self {
        Self { store }
    }
}
