use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::SensorStore;
use crate::error::Result;
use crate::models::{Metric, NewMetric, Sensor};
use crate::window::TimeWindow;

// ---

/// Sensor aggregate: the sensor row plus the readings it owns.
#[derive(Debug)]
struct SensorEntry {
    sensor: Sensor,
    metrics: Vec<Metric>,
}

#[derive(Debug, Default)]
struct Arena {
    /// Keyed by business id.
    sensors: BTreeMap<i64, SensorEntry>,
    next_sensor_id: i64,
    next_metric_id: i64,
}

/// In-process [`SensorStore`]. Every call takes the lock once, so each
/// operation is atomic with respect to concurrent requests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    arena: RwLock<Arena>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored readings across all sensors.
    pub async fn metric_count(&self) -> usize {
        let arena = self.arena.read().await;
        arena.sensors.values().map(|e| e.metrics.len()).sum()
    }
}

#[async_trait]
impl SensorStore for MemoryStore {
    // ---
    async fn find_by_sensor_id(&self, sensor_id: i64) -> Result<Option<Sensor>> {
        let arena = self.arena.read().await;
        Ok(arena.sensors.get(&sensor_id).map(|e| e.sensor.clone()))
    }

    async fn find_by_sensor_ids(&self, sensor_ids: &[i64]) -> Result<Vec<Sensor>> {
        // ---
        let arena = self.arena.read().await;
        Ok(sensor_ids
            .iter()
            .filter_map(|id| arena.sensors.get(id))
            .map(|e| e.sensor.clone())
            .collect())
    }

    async fn insert_sensor(
        &self,
        sensor_id: i64,
        location: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Option<Sensor>> {
        // ---
        let mut arena = self.arena.write().await;
        if arena.sensors.contains_key(&sensor_id) {
            return Ok(None);
        }

        arena.next_sensor_id += 1;
        let sensor = Sensor {
            id: arena.next_sensor_id,
            sensor_id,
            location: location.to_string(),
            created_at,
        };
        arena.sensors.insert(
            sensor_id,
            SensorEntry {
                sensor: sensor.clone(),
                metrics: Vec::new(),
            },
        );
        Ok(Some(sensor))
    }

    async fn find_duplicate(
        &self,
        sensor: &Sensor,
        metric_type: &str,
        data: f64,
    ) -> Result<Option<Metric>> {
        // ---
        let arena = self.arena.read().await;
        Ok(arena.sensors.get(&sensor.sensor_id).and_then(|e| {
            e.metrics
                .iter()
                .find(|m| m.metric_type == metric_type && m.data == data)
                .cloned()
        }))
    }

    async fn insert_metrics(&self, sensor: &Sensor, metrics: &[NewMetric]) -> Result<usize> {
        // ---
        let mut arena = self.arena.write().await;
        let mut next_metric_id = arena.next_metric_id;

        let Some(entry) = arena.sensors.get_mut(&sensor.sensor_id) else {
            return Ok(0);
        };

        let mut inserted = 0;
        for metric in metrics {
            let duplicate = entry
                .metrics
                .iter()
                .any(|m| m.metric_type == metric.metric_type && m.data == metric.data);
            if duplicate {
                continue;
            }

            next_metric_id += 1;
            entry.metrics.push(Metric {
                id: next_metric_id,
                sensor_id: sensor.sensor_id,
                metric_type: metric.metric_type.clone(),
                data: metric.data,
                recorded_time: metric.recorded_time,
            });
            inserted += 1;
        }

        arena.next_metric_id = next_metric_id;
        Ok(inserted)
    }

    async fn find_metrics(
        &self,
        sensor_ids: &[i64],
        metric_types: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<Metric>> {
        // ---
        let arena = self.arena.read().await;
        let mut found: Vec<Metric> = arena
            .sensors
            .iter()
            .filter(|(id, _)| sensor_ids.contains(*id))
            .flat_map(|(_, e)| e.metrics.iter())
            .filter(|m| metric_types.contains(&m.metric_type) && window.contains(m.recorded_time))
            .cloned()
            .collect();

        // Metric ids are allocated in insertion order
        found.sort_by_key(|m| m.id);
        Ok(found)
    }

    async fn delete_sensor(&self, sensor_id: i64) -> Result<bool> {
        let mut arena = self.arena.write().await;
        Ok(arena.sensors.remove(&sensor_id).is_some())
    }
}
