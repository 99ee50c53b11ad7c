// src/routes/error.rs
//! Translation of [`Error`] into HTTP responses.
//!
//! Every error becomes a JSON body of the form
//! `{timestamp, status, error, message, details}` with a matching status
//! code. Infrastructure failures are logged here and reported to the caller
//! with a generic message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::Error;

/// JSON body returned for every rejected request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    timestamp: DateTime<Utc>,
    status: u16,
    error: &'static str,
    message: String,
    details: Value,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSensor
            | Self::InvalidLocation(_)
            | Self::InvalidStatistic(_)
            | Self::InvalidDateFormat(_)
            | Self::InvalidDateRange { .. }
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::SensorNotFound(_) | Self::PartialSensorNotFound { .. } => StatusCode::NOT_FOUND,
            Self::LocationConflict { .. } | Self::ConcurrentUpdate(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::InvalidSensor => "Sensor ID Validation Failed",
            Self::InvalidLocation(_) => "Location Validation Failed",
            Self::LocationConflict { .. } | Self::ConcurrentUpdate(_) => "Conflict",
            Self::SensorNotFound(_) => "Sensor not found",
            Self::PartialSensorNotFound { .. } => "Some sensors not found",
            Self::InvalidStatistic(_) => "Statistic Validation Failed",
            Self::InvalidDateFormat(_) => "Date Format Validation Failed",
            Self::InvalidDateRange { .. } => "Date Range Validation Failed",
            Self::Validation(_) => "Validation Failed",
            Self::Database(_) => "Internal Server Error",
        }
    }

    fn details(&self) -> Value {
        // ---
        match self {
            Self::InvalidSensor => json!({ "sensorId": "Sensor ID must be a valid, non-null, positive number." }),
            Self::InvalidLocation(reason) => json!({ "location": reason }),
            Self::LocationConflict {
                sensor_id,
                existing,
                requested,
            } => json!({ "sensorId": sensor_id, "existingLocation": existing, "requestedLocation": requested }),
            Self::ConcurrentUpdate(sensor_id) => json!({ "sensorId": sensor_id }),
            Self::SensorNotFound(ids) => json!({ "notFound": ids }),
            Self::PartialSensorNotFound { missing } => json!({ "notFound": missing }),
            Self::InvalidStatistic(given) => json!({
                "statistic": format!("'{given}' is not one of 'average', 'min', 'max', 'sum'.")
            }),
            Self::InvalidDateFormat(given) => json!({
                "date": format!("'{given}' must be yyyy-MM-ddTHH:mm:ss or dd-MM-yyyyTHH:mm:ss.")
            }),
            Self::InvalidDateRange { .. } => json!({
                "dateRange": "Start date must not be after end date, if both are provided."
            }),
            Self::Validation(errors) => json!(errors),
            Self::Database(_) => Value::Null,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();

        let message = if self.is_rejection() {
            info!("Request rejected ({}): {}", status.as_u16(), self);
            self.to_string()
        } else {
            error!("Request failed: {}", self);
            "An internal error occurred".to_string()
        };

        let body = ErrorBody {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: self.title(),
            message,
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
