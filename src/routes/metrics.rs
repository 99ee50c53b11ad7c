// src/routes/metrics.rs
//! `GET /weather/metrics`: aggregated statistics per sensor and metric type.
//!
//! List parameters may be repeated (`sensorIds=1&sensorIds=2`) or
//! comma-separated (`sensorIds=1,2`), so the raw query string is read as
//! key/value pairs instead of a fixed struct. `startDateStr`/`endDateStr`
//! are accepted as aliases of `startDate`/`endDate`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tracing::{debug, info};

use super::AppState;
use crate::error::{Error, Result};
use crate::models::ApiResponse;
use crate::service::MetricQuery;
use crate::window::TimeWindow;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/weather/metrics", get(handler))
}

async fn handler(
    State((service, config)): State<AppState>,
    pairs: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response> {
    // ---
    let Query(pairs) = pairs.map_err(|rejection| Error::Validation(vec![rejection.body_text()]))?;
    let params = MetricsParams::from_pairs(pairs);
    debug!("GET /weather/metrics - {:?}", params);

    let sensor_ids = params.validate()?;
    let window = TimeWindow::resolve(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        Utc::now(),
        config.query_window_days,
    )?;
    let statistic = params.statistic.as_deref().unwrap_or_default();
    let query = MetricQuery::new(sensor_ids, params.metrics, statistic, window)?;

    let stats = service.query(&query).await?;

    if stats.is_empty() {
        info!("No readings matched {:?}", query.sensor_ids);
        let body = ApiResponse::new(404, "No data found for the provided sensor IDs", stats);
        return Ok((StatusCode::NOT_FOUND, Json(body)).into_response());
    }

    let body = ApiResponse::new(200, "Metrics fetched successfully", stats);
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Raw query parameters, before validation.
#[derive(Debug, Default, PartialEq)]
struct MetricsParams {
    // ---
    sensor_ids: Vec<String>,
    metrics: Vec<String>,
    statistic: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl MetricsParams {
    // ---
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        // ---
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "sensorIds" => params.sensor_ids.extend(split_list(&value)),
                "metrics" => params.metrics.extend(split_list(&value)),
                "statistic" => params.statistic = Some(value),
                "startDate" | "startDateStr" => params.start_date = Some(value),
                "endDate" | "endDateStr" => params.end_date = Some(value),
                _ => debug!("Ignoring unknown query parameter '{}'", key),
            }
        }
        params
    }

    /// Check required parameters, collecting every problem, and return the
    /// parsed sensor ids.
    fn validate(&self) -> Result<Vec<i64>> {
        // ---
        let mut errors = Vec::new();
        let mut sensor_ids = Vec::with_capacity(self.sensor_ids.len());

        if self.sensor_ids.is_empty() {
            errors.push("sensorIds is required".to_string());
        }
        for raw in &self.sensor_ids {
            match raw.parse::<i64>() {
                Ok(id) if id > 0 => sensor_ids.push(id),
                _ => errors.push(format!("Sensor ID '{raw}' must be a positive number")),
            }
        }
        if self.metrics.is_empty() {
            errors.push("metrics is required".to_string());
        }
        if self.statistic.as_deref().map_or(true, |s| s.trim().is_empty()) {
            errors.push("statistic is required".to_string());
        }

        if errors.is_empty() {
            Ok(sensor_ids)
        } else {
            Err(Error::Validation(errors))
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
