//! Data models for the weather statistics service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Inclusive bounds on the length of a sensor location, in characters.
pub const LOCATION_MIN_CHARS: usize = 2;
pub const LOCATION_MAX_CHARS: usize = 100;

/// A stored sensor, keyed by its business id (`sensor_id`).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    // ---
    /// Internal storage row id, never exposed over the API.
    #[serde(skip)]
    pub id: i64,
    pub sensor_id: i64,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// A stored metric reading.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    // ---
    #[serde(skip)]
    pub id: i64,
    /// Business id of the owning sensor.
    pub sensor_id: i64,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub data: f64,
    pub recorded_time: DateTime<Utc>,
}

/// A metric about to be persisted; `recorded_time` is server-assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    // ---
    pub metric_type: String,
    pub data: f64,
    pub recorded_time: DateTime<Utc>,
}

/// One reading as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReading {
    // ---
    #[serde(rename = "type")]
    pub metric_type: String,
    pub data: f64,
    /// Advisory only, storage uses the server clock.
    #[serde(default)]
    pub recorded_time: Option<NaiveDateTime>,
}

/// Body of `POST /weather/create`.
///
/// Every field is optional at the serde level so that missing fields can be
/// reported together by [`SensorDataRequest::validate`] instead of failing on
/// the first one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDataRequest {
    // ---
    pub sensor_id: Option<i64>,
    pub location: Option<String>,
    #[serde(alias = "metricReadings")]
    pub metric_list: Option<Vec<MetricReading>>,
}

impl SensorDataRequest {
    // ---
    /// Collect every schema-level rule the request violates.
    pub fn validate(&self) -> Vec<String> {
        // ---
        let mut errors = Vec::new();

        if self.sensor_id.is_none() {
            errors.push("Sensor ID is required".to_string());
        }
        match &self.location {
            None => errors.push("Location is required".to_string()),
            Some(location) if !location_len_ok(location) => errors.push(format!(
                "Location must be between {} and {} characters",
                LOCATION_MIN_CHARS, LOCATION_MAX_CHARS
            )),
            Some(_) => {}
        }
        if self.metric_list.is_none() {
            errors.push("Metric list is required".to_string());
        }

        errors
    }
}

/// Whether `location` is within the accepted length range.
pub fn location_len_ok(location: &str) -> bool {
    // ---
    let len = location.chars().count();
    (LOCATION_MIN_CHARS..=LOCATION_MAX_CHARS).contains(&len)
}

/// Uniform response envelope: `{status, message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    // ---
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            data,
        }
    }
}
