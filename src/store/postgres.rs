use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::SensorStore;
use crate::error::Result;
use crate::models::{Metric, NewMetric, Sensor};
use crate::window::TimeWindow;

// ---

/// [`SensorStore`] over the `sensors` / `metrics` tables created by
/// `schema::create_schema`.
///
/// Uniqueness of `sensors.sensor_id` and of `(sensor_pk, metric_type, data)`
/// is enforced by the database, so concurrent ingestion for the same sensor
/// cannot create a second sensor row or a duplicate reading.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const METRIC_COLUMNS: &str = r#"
    SELECT m.id, s.sensor_id, m.metric_type, m.data, m.recorded_time
    FROM metrics m
    JOIN sensors s ON s.id = m.sensor_pk
"#;

#[async_trait]
impl SensorStore for PgStore {
    // ---
    async fn find_by_sensor_id(&self, sensor_id: i64) -> Result<Option<Sensor>> {
        // ---
        let sensor = sqlx::query_as::<_, Sensor>(
            "SELECT id, sensor_id, location, created_at FROM sensors WHERE sensor_id = $1",
        )
        .bind(sensor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sensor)
    }

    async fn find_by_sensor_ids(&self, sensor_ids: &[i64]) -> Result<Vec<Sensor>> {
        // ---
        let sensors = sqlx::query_as::<_, Sensor>(
            "SELECT id, sensor_id, location, created_at FROM sensors WHERE sensor_id = ANY($1)",
        )
        .bind(sensor_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(sensors)
    }

    async fn insert_sensor(
        &self,
        sensor_id: i64,
        location: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Option<Sensor>> {
        // ---
        let sensor = sqlx::query_as::<_, Sensor>(
            r#"
            INSERT INTO sensors (sensor_id, location, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (sensor_id) DO NOTHING
            RETURNING id, sensor_id, location, created_at
            "#,
        )
        .bind(sensor_id)
        .bind(location)
        .bind(created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sensor)
    }

    async fn find_duplicate(
        &self,
        sensor: &Sensor,
        metric_type: &str,
        data: f64,
    ) -> Result<Option<Metric>> {
        // ---
        let query = format!(
            "{METRIC_COLUMNS} WHERE m.sensor_pk = $1 AND m.metric_type = $2 AND m.data = $3 LIMIT 1"
        );
        let metric = sqlx::query_as::<_, Metric>(&query)
            .bind(sensor.id)
            .bind(metric_type)
            .bind(data)
            .fetch_optional(&self.pool)
            .await?;

        Ok(metric)
    }

    async fn insert_metrics(&self, sensor: &Sensor, metrics: &[NewMetric]) -> Result<usize> {
        // ---
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for metric in metrics {
            let result = sqlx::query(
                r#"
                INSERT INTO metrics (sensor_pk, metric_type, data, recorded_time)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (sensor_pk, metric_type, data) DO NOTHING
                "#,
            )
            .bind(sensor.id)
            .bind(&metric.metric_type)
            .bind(metric.data)
            .bind(metric.recorded_time)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        // Dropping `tx` on an early return rolls the whole batch back
        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_metrics(
        &self,
        sensor_ids: &[i64],
        metric_types: &[String],
        window: &TimeWindow,
    ) -> Result<Vec<Metric>> {
        // ---
        let query = format!(
            r#"{METRIC_COLUMNS}
            WHERE s.sensor_id = ANY($1)
              AND m.metric_type = ANY($2)
              AND m.recorded_time BETWEEN $3 AND $4
            ORDER BY m.id
            "#
        );
        let metrics = sqlx::query_as::<_, Metric>(&query)
            .bind(sensor_ids)
            .bind(metric_types)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            "Fetched {} readings for {} sensors in [{}, {}]",
            metrics.len(),
            sensor_ids.len(),
            window.start,
            window.end
        );
        Ok(metrics)
    }

    async fn delete_sensor(&self, sensor_id: i64) -> Result<bool> {
        // ---
        // Readings go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM sensors WHERE sensor_id = $1")
            .bind(sensor_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
