//! Storage interface for sensors and their metric readings.
//!
//! The ingestion and query components only ever talk to [`SensorStore`];
//! the concrete backend is picked at startup from configuration:
//! - [`PgStore`] – PostgreSQL through a `sqlx` pool
//! - [`MemoryStore`] – in-process arena, used for tests and local runs
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Metric, NewMetric, Sensor};
use crate::window::TimeWindow;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

#[async_trait]
pub trait SensorStore: Send + Sync {
    // ---
    /// Look up one sensor by business key.
    async fn find_by_sensor_id(&self, sensor_id: i64) -> Result<Option<Sensor>>;

    /// All sensors whose business key is in `sensor_ids`, in no particular order.
    async fn find_by_sensor_ids(&self, sensor_ids: &[i64]) -> Result<Vec<Sensor>>;

    /// Create a sensor. Returns `None` if `sensor_id` is already taken,
    /// leaving the existing record untouched.
    async fn insert_sensor(
        &self,
        sensor_id: i64,
        location: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Option<Sensor>>;

    /// An existing reading of `sensor` with the same type and value.
    async fn find_duplicate(
        &self,
        sensor: &Sensor,
        metric_type: &str,
        data: f64,
    ) -> Result<Option<Metric>>;

    /// Append a batch of readings atomically: either every non-duplicate
    /// reading is written or none is. Readings whose (sensor, type, data)
    /// already exist, including earlier entries of the same batch, are
    /// skipped. Returns how many were written.
    async fn insert_metrics(&self, sensor: &Sensor, metrics: &[NewMetric]) -> Result<usize>;

    /// Append a single reading. Returns `false` if an identical
    /// (sensor, type, data) reading already exists.
    async fn insert_metric(&self, sensor: &Sensor, metric: &NewMetric) -> Result<bool> {
        // ---
        let inserted = self.insert_metrics(sensor, std::slice::from_ref(metric)).await?;
        Ok(inserted == 1)
    }

    /// Readings of the given sensors and types recorded inside `window`,
    /// in insertion order.
    async fn find_metrics(
        &self,
        sensor_ids: &[i64],
        metric_types: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<Metric>>;

    /// Delete a sensor together with all of its readings.
    async fn delete_sensor(&self, sensor_id: i64) -> Result<bool>;
}
