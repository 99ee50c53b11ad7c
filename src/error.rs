//! Error taxonomy for the `weather-stats` service.
//!
//! Every failure the ingestion and query components can produce is one
//! variant of [`Error`]. None of them are fatal to the process: the HTTP
//! boundary (`routes::error`) turns each one into a structured response.
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // ---
    /// Sensor id missing, zero or negative.
    #[error("Sensor ID must be a positive number")]
    InvalidSensor,

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Sensor {sensor_id} is already assigned to {existing}, cannot change to {requested}")]
    LocationConflict {
        sensor_id: i64,
        existing: String,
        requested: String,
    },

    /// The sensor changed under a concurrent request; the caller may retry.
    #[error("Sensor {0} was modified concurrently, retry the request")]
    ConcurrentUpdate(i64),

    #[error("No sensors found for the provided sensor IDs: {0:?}")]
    SensorNotFound(Vec<i64>),

    #[error("Sensors not found for IDs: {missing:?}")]
    PartialSensorNotFound { missing: Vec<i64> },

    #[error("Invalid statistic {0}")]
    InvalidStatistic(String),

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Schema-level request problems, all collected before failing.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors caused by the request rather than by infrastructure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}
