use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use super::WeatherService;
use crate::error::{Error, Result};
use crate::models::Metric;
use crate::statistic::Statistic;
use crate::window::TimeWindow;

// ---

/// sensor id → metric type → aggregated value, ordered by key.
pub type SensorStats = BTreeMap<i64, BTreeMap<String, f64>>;

/// A statistics request over a set of sensors and metric types.
#[derive(Debug, Clone)]
pub struct MetricQuery {
    // ---
    pub sensor_ids: Vec<i64>,
    pub metric_types: Vec<String>,
    pub statistic: Statistic,
    pub window: TimeWindow,
}

impl MetricQuery {
    /// Build a query, parsing `statistic` case-insensitively.
    pub fn new(
        sensor_ids: Vec<i64>,
        metric_types: Vec<String>,
        statistic: &str,
        window: TimeWindow,
    ) -> Result<Self> {
        Ok(Self {
            sensor_ids,
            metric_types,
            statistic: statistic.parse()?,
            window,
        })
    }
}

impl WeatherService {
    // ---
    /// Compute `query.statistic` for every (sensor, metric type) pair that has
    /// readings inside the window.
    ///
    /// Every requested sensor must exist: none found is
    /// [`Error::SensorNotFound`], some missing is
    /// [`Error::PartialSensorNotFound`]. An empty map means the sensors exist
    /// but nothing matched.
    #[tracing::instrument(skip(self), fields(statistic = %query.statistic))]
    pub async fn query(&self, query: &MetricQuery) -> Result<SensorStats> {
        // ---
        let sensor_ids = unique_ids(&query.sensor_ids);

        let sensors = self.store.find_by_sensor_ids(&sensor_ids).await?;
        if sensors.is_empty() {
            info!("None of the sensors {:?} exist", sensor_ids);
            return Err(Error::SensorNotFound(sensor_ids));
        }

        let found: HashSet<i64> = sensors.iter().map(|s| s.sensor_id).collect();
        let missing: Vec<i64> = sensor_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            info!("Sensors {:?} do not exist", missing);
            return Err(Error::PartialSensorNotFound { missing });
        }

        let metrics = self
            .store
            .find_metrics(&sensor_ids, &query.metric_types, &query.window)
            .await?;
        debug!("Aggregating {} readings", metrics.len());

        Ok(aggregate(&metrics, query.statistic))
    }
}

/// Group readings by (sensor, type) and reduce each group.
///
/// Values within a group keep the order of `metrics`.
pub fn aggregate(metrics: &[Metric], statistic: Statistic) -> SensorStats {
    // ---
    let mut groups: BTreeMap<(i64, &str), Vec<f64>> = BTreeMap::new();
    for metric in metrics {
        groups
            .entry((metric.sensor_id, metric.metric_type.as_str()))
            .or_default()
            .push(metric.data);
    }

    let mut stats = SensorStats::new();
    for ((sensor_id, metric_type), values) in groups {
        stats
            .entry(sensor_id)
            .or_default()
            .insert(metric_type.to_string(), statistic.compute(&values));
    }
    stats
}

/// Drop repeated ids, keeping first-seen order.
fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    // ---
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use tokio_test::assert_ok;

    use super::*;
    use crate::models::{MetricReading, NewMetric};
    use crate::store::{MemoryStore, SensorStore};

    fn reading(metric_type: &str, data: f64) -> MetricReading {
        MetricReading {
            metric_type: metric_type.to_string(),
            data,
            recorded_time: None,
        }
    }

    fn metric(sensor_id: i64, metric_type: &str, data: f64) -> Metric {
        Metric {
            id: 0,
            sensor_id,
            metric_type: metric_type.to_string(),
            data,
            recorded_time: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    fn last_week() -> TimeWindow {
        TimeWindow::trailing_days(Utc::now() + Duration::seconds(1), 7)
    }

    fn query(ids: &[i64], types: &[&str], statistic: &str) -> MetricQuery {
        MetricQuery::new(
            ids.to_vec(),
            types.iter().map(|t| t.to_string()).collect(),
            statistic,
            last_week(),
        )
        .unwrap()
    }

    async fn seeded() -> (Arc<MemoryStore>, WeatherService) {
        // ---
        let store = Arc::new(MemoryStore::new());
        let service = WeatherService::new(store.clone());
        let batch = [
            reading("Temperature", 10.0),
            reading("Temperature", 20.0),
            reading("Temperature", 30.0),
            reading("Humidity", 55.0),
        ];
        assert_ok!(service.ingest(Some(1001), Some("London"), &batch).await);
        (store, service)
    }

    #[test]
    fn test_aggregate_groups_by_sensor_and_type() {
        // ---
        let metrics = [
            metric(2, "Temperature", 4.0),
            metric(1, "Temperature", 1.0),
            metric(2, "Temperature", 6.0),
            metric(1, "Humidity", 50.0),
        ];

        let stats = aggregate(&metrics, Statistic::Average);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[&1]["Temperature"], 1.0);
        assert_eq!(stats[&1]["Humidity"], 50.0);
        assert_eq!(stats[&2]["Temperature"], 5.0);
        assert!(aggregate(&[], Statistic::Sum).is_empty());
    }

    #[tokio::test]
    async fn test_each_statistic() {
        // ---
        let (_store, service) = seeded().await;

        for (name, expected) in [("sum", 60.0), ("max", 30.0), ("min", 10.0), ("average", 20.0)] {
            let stats = assert_ok!(service.query(&query(&[1001], &["Temperature"], name)).await);
            assert_eq!(stats[&1001]["Temperature"], expected, "{name}");
            assert!(!stats[&1001].contains_key("Humidity"));
        }
    }

    #[tokio::test]
    async fn test_statistic_name_is_case_insensitive() {
        // ---
        let (_store, service) = seeded().await;

        let mixed = assert_ok!(service.query(&query(&[1001], &["Temperature"], "Average")).await);
        let lower = assert_ok!(service.query(&query(&[1001], &["Temperature"], "average")).await);
        assert_eq!(mixed, lower);
    }

    #[test]
    fn test_invalid_statistic() {
        // ---
        let res = MetricQuery::new(vec![1001], vec!["Temperature".into()], "median", last_week());
        assert!(matches!(res, Err(Error::InvalidStatistic(s)) if s == "median"));
    }

    #[tokio::test]
    async fn test_unknown_sensor() {
        // ---
        let (_store, service) = seeded().await;

        let res = service.query(&query(&[4242], &["Temperature"], "sum")).await;
        assert!(matches!(res, Err(Error::SensorNotFound(ids)) if ids == vec![4242]));
    }

    #[tokio::test]
    async fn test_some_sensors_missing() {
        // ---
        let (_store, service) = seeded().await;

        let res = service.query(&query(&[1001, 9999], &["Temperature"], "sum")).await;
        match res {
            Err(Error::PartialSensorNotFound { missing }) => assert_eq!(missing, vec![9999]),
            other => panic!("expected PartialSensorNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_sensor_ids_are_not_missing() {
        // ---
        let (_store, service) = seeded().await;

        let stats = assert_ok!(service.query(&query(&[1001, 1001], &["Temperature"], "sum")).await);
        assert_eq!(stats[&1001]["Temperature"], 60.0);
    }

    #[tokio::test]
    async fn test_no_matching_metrics_is_empty() {
        // ---
        let (_store, service) = seeded().await;

        let stats = assert_ok!(service.query(&query(&[1001], &["Pressure"], "sum")).await);
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_window_excludes_old_readings() {
        // ---
        let (store, service) = seeded().await;
        let sensor = store.find_by_sensor_id(1001).await.unwrap().unwrap();
        let old = NewMetric {
            metric_type: "Temperature".to_string(),
            data: 1000.0,
            recorded_time: Utc::now() - Duration::days(8),
        };
        assert!(store.insert_metric(&sensor, &old).await.unwrap());

        let stats = assert_ok!(service.query(&query(&[1001], &["Temperature"], "max")).await);
        assert_eq!(stats[&1001]["Temperature"], 30.0);

        let wide = MetricQuery::new(
            vec![1001],
            vec!["Temperature".into()],
            "max",
            TimeWindow::trailing_days(Utc::now() + Duration::seconds(1), 30),
        )
        .unwrap();
        let stats = assert_ok!(service.query(&wide).await);
        assert_eq!(stats[&1001]["Temperature"], 1000.0);
    }

    #[tokio::test]
    async fn test_multiple_sensors_and_types() {
        // ---
        let (_store, service) = seeded().await;
        assert_ok!(
            service
                .ingest(Some(2002), Some("Paris"), &[reading("Temperature", 5.0), reading("Humidity", 70.0)])
                .await
        );

        let stats = assert_ok!(
            service
                .query(&query(&[2002, 1001], &["Temperature", "Humidity"], "sum"))
                .await
        );

        assert_eq!(stats.keys().copied().collect::<Vec<_>>(), vec![1001, 2002]);
        assert_eq!(stats[&1001]["Temperature"], 60.0);
        assert_eq!(stats[&1001]["Humidity"], 55.0);
        assert_eq!(stats[&2002]["Temperature"], 5.0);
        assert_eq!(stats[&2002]["Humidity"], 70.0);
    }

    #[tokio::test]
    async fn test_ingest_then_query_round_trip() {
        // ---
        let store = Arc::new(MemoryStore::new());
        let service = WeatherService::new(store);

        assert_ok!(service.ingest(Some(7), Some("Oslo"), &[reading("Temperature", 22.5)]).await);
        let stats = assert_ok!(service.query(&query(&[7], &["Temperature"], "sum")).await);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[&7].len(), 1);
        assert_eq!(stats[&7]["Temperature"], 22.5);
    }
}
