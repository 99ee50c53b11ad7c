//! Database schema management for `weather-stats`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `sensors` table (one row per business `sensor_id`) and the
/// `metrics` table holding readings owned by a sensor. Deleting a sensor
/// cascades to its readings. Safe to call on every startup; no-op if objects
/// already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensors (
            id          BIGSERIAL   PRIMARY KEY,
            sensor_id   BIGINT      NOT NULL UNIQUE CHECK (sensor_id > 0),
            location    TEXT        NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // (sensor_pk, metric_type, data) is the dedup identity of a reading
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metrics (
            id             BIGSERIAL        PRIMARY KEY,
            sensor_pk      BIGINT           NOT NULL REFERENCES sensors (id) ON DELETE CASCADE,
            metric_type    TEXT             NOT NULL,
            data           DOUBLE PRECISION NOT NULL,
            recorded_time  TIMESTAMPTZ      NOT NULL,
            UNIQUE (sensor_pk, metric_type, data)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_metrics_type_time
            ON metrics (metric_type, recorded_time);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
