// src/routes/create_sensor.rs
//! `POST /weather/create`: register a sensor and append its readings.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::info;

use super::AppState;
use crate::error::Error;
use crate::models::{ApiResponse, SensorDataRequest};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/weather/create", post(handler))
}

/// Validate the body, then hand it to the ingestion component.
///
/// Responds `201 Created` for a new sensor and `200 OK` when readings were
/// added to an existing one. Malformed JSON and missing fields are reported
/// together as a single validation error.
async fn handler(
    State((service, _config)): State<AppState>,
    payload: Result<Json<SensorDataRequest>, JsonRejection>,
) -> Result<Response, Error> {
    // ---
    let Json(request) = payload.map_err(|rejection| Error::Validation(vec![rejection.body_text()]))?;

    let errors = request.validate();
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    info!("POST /weather/create - sensor {:?}", request.sensor_id);

    let readings = request.metric_list.as_deref().unwrap_or_default();
    let outcome = service
        .ingest(request.sensor_id, request.location.as_deref(), readings)
        .await?;

    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Sensor created successfully")
    } else {
        (StatusCode::OK, "Sensor already exists, metrics updated")
    };

    Ok((status, Json(ApiResponse::new(status.as_u16(), message, outcome))).into_response())
}
