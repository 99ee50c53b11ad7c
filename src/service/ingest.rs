use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::WeatherService;
use crate::error::{Error, Result};
use crate::models::{location_len_ok, MetricReading, NewMetric, Sensor, LOCATION_MAX_CHARS, LOCATION_MIN_CHARS};

// ---

/// Outcome of one ingestion call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingestion {
    // ---
    /// `true` when this call created the sensor.
    #[serde(skip)]
    pub created: bool,
    #[serde(flatten)]
    pub sensor: Sensor,
    pub metrics_stored: usize,
    pub duplicates_skipped: usize,
}

impl WeatherService {
    // ---
    /// Create or update a sensor and append its readings.
    ///
    /// A new `sensor_id` creates the sensor; an existing one must carry the
    /// same location or the call fails with [`Error::LocationConflict`]
    /// before anything is written. Each reading whose (type, data) pair the
    /// sensor already holds is skipped.
    ///
    /// Stored readings are stamped with the server clock. A `recordedTime`
    /// sent by the client is not persisted.
    #[tracing::instrument(skip(self, location, readings), fields(readings = readings.len()))]
    pub async fn ingest(
        &self,
        sensor_id: Option<i64>,
        location: Option<&str>,
        readings: &[MetricReading],
    ) -> Result<Ingestion> {
        // ---
        let sensor_id = validate_sensor_id(sensor_id)?;
        let location = validate_location(location)?;

        let (sensor, created) = match self.store.find_by_sensor_id(sensor_id).await? {
            Some(existing) => (ensure_same_location(existing, location)?, false),
            None => match self.store.insert_sensor(sensor_id, location, Utc::now()).await? {
                Some(sensor) => {
                    info!("Created sensor {} at {}", sensor_id, location);
                    (sensor, true)
                }
                None => {
                    // Another request created it between lookup and insert
                    let Some(existing) = self.store.find_by_sensor_id(sensor_id).await? else {
                        warn!("Sensor {} was removed while being created", sensor_id);
                        return Err(Error::ConcurrentUpdate(sensor_id));
                    };
                    (ensure_same_location(existing, location)?, false)
                }
            },
        };

        let (metrics_stored, duplicates_skipped) = self.store_readings(&sensor, readings).await?;
        info!(
            "Sensor {}: stored {} readings, skipped {} duplicates",
            sensor_id, metrics_stored, duplicates_skipped
        );

        Ok(Ingestion {
            created,
            sensor,
            metrics_stored,
            duplicates_skipped,
        })
    }

    /// Write every reading the sensor does not already hold, as one batch.
    /// Returns (stored, skipped).
    async fn store_readings(&self, sensor: &Sensor, readings: &[MetricReading]) -> Result<(usize, usize)> {
        // ---
        let mut batch = Vec::with_capacity(readings.len());

        for reading in readings {
            let existing = self
                .store
                .find_duplicate(sensor, &reading.metric_type, reading.data)
                .await?;
            if existing.is_some() {
                debug!("Skipping duplicate {}={}", reading.metric_type, reading.data);
                continue;
            }

            if let Some(client_time) = reading.recorded_time {
                debug!("Ignoring client recordedTime {} for {}", client_time, reading.metric_type);
            }

            batch.push(NewMetric {
                metric_type: reading.metric_type.clone(),
                data: reading.data,
                recorded_time: Utc::now(),
            });
        }

        let stored = if batch.is_empty() {
            0
        } else {
            self.store.insert_metrics(sensor, &batch).await?
        };
        Ok((stored, readings.len() - stored))
    }
}

fn validate_sensor_id(sensor_id: Option<i64>) -> Result<i64> {
    // ---
    match sensor_id {
        Some(id) if id > 0 => Ok(id),
        other => {
            warn!("Rejected sensor id {:?}", other);
            Err(Error::InvalidSensor)
        }
    }
}

fn validate_location(location: Option<&str>) -> Result<&str> {
    // ---
    match location {
        None | Some("") => Err(Error::InvalidLocation(
            "Location cannot be null or empty".to_string(),
        )),
        Some(location) if !location_len_ok(location) => Err(Error::InvalidLocation(format!(
            "Location must be between {} and {} characters",
            LOCATION_MIN_CHARS, LOCATION_MAX_CHARS
        ))),
        Some(location) => Ok(location),
    }
}

fn ensure_same_location(sensor: Sensor, location: &str) -> Result<Sensor> {
    // ---
    if sensor.location != location {
        warn!(
            "Sensor {} is at {}, rejecting move to {}",
            sensor.sensor_id, sensor.location, location
        );
        return Err(Error::LocationConflict {
            sensor_id: sensor.sensor_id,
            existing: sensor.location,
            requested: location.to_string(),
        });
    }
    Ok(sensor)
}
