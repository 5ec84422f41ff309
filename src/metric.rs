//! Raw metric data as delivered by the controller.
//!
//! The field layout mirrors the AppDynamics `metric-data` JSON payload so the
//! REST source can decode straight into these types:
//!
//! ```json
//! [{
//!   "metricId": 2,
//!   "metricName": "BTM|Application Summary|Average Response Time (ms)",
//!   "metricPath": "Overall Application Performance|Average Response Time (ms)",
//!   "frequency": "ONE_MIN",
//!   "metricValues": [
//!     { "startTimeInMillis": 1472194800000, "value": 12, "min": 3, "max": 40,
//!       "current": 11, "sum": 480, "count": 40, "occurrences": 1,
//!       "standardDeviation": 0 }
//!   ]
//! }]
//! ```
//!
//! Unknown fields are ignored and missing optional fields default, so older
//! and newer controller versions decode alike.

use serde::{Deserialize, Serialize};

/// One sample point of a metric series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    /// Start of the sampled interval in milliseconds since the epoch.
    #[serde(default, rename = "startTimeInMillis")]
    pub start_time_ms: i64,
    /// Aggregated value of the interval.
    pub value: i64,
    /// Minimum observed during the interval.
    #[serde(default)]
    pub min: i64,
    /// Maximum observed during the interval.
    #[serde(default)]
    pub max: i64,
    /// Last observed value of the interval.
    #[serde(default)]
    pub current: i64,
    /// Sum of all observations.
    #[serde(default)]
    pub sum: i64,
    /// Number of observations.
    #[serde(default)]
    pub count: i64,
    /// Number of rolled-up occurrences.
    #[serde(default)]
    pub occurrences: i64,
    /// Standard deviation of the observations, when reported.
    #[serde(default)]
    pub standard_deviation: i64,
}

impl MetricValue {
    /// Creates a sample with explicit `value`, `min` and `max`.
    pub fn new(value: i64, min: i64, max: i64) -> Self {
        Self {
            value,
            min,
            max,
            current: value,
            ..Self::default()
        }
    }

    /// Creates a sample where `value`, `min` and `max` are all equal.
    pub fn flat(value: i64) -> Self {
        Self::new(value, value, value)
    }

    /// Sets the interval start time.
    pub fn at(mut self, start_time_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self
    }
}

/// All samples of one named metric over a time window.
///
/// An empty `values` list is valid: the controller had no data for the
/// window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    /// Pipe-delimited hierarchical metric path.
    pub metric_path: String,
    /// Controller-internal metric name, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    /// Rollup frequency such as `ONE_MIN`, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    /// Samples in time order.
    #[serde(default)]
    pub metric_values: Vec<MetricValue>,
}

impl MetricSeries {
    /// Creates a series for `path` with the given samples.
    pub fn new(path: impl Into<String>, values: Vec<MetricValue>) -> Self {
        Self {
            metric_path: path.into(),
            metric_name: None,
            frequency: None,
            metric_values: values,
        }
    }

    /// Creates a series without samples.
    pub fn empty(path: impl Into<String>) -> Self {
        Self::new(path, Vec::new())
    }

    /// The metric path this series belongs to.
    pub fn path(&self) -> &str {
        &self.metric_path
    }

    /// The samples in time order.
    pub fn values(&self) -> &[MetricValue] {
        &self.metric_values
    }

    /// Returns `true` when the series carries no samples.
    pub fn is_empty(&self) -> bool {
        self.metric_values.is_empty()
    }

    /// Arithmetic mean of the `value` field, `None` for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.metric_values.is_empty() {
            return None;
        }
        let sum: i128 = self.metric_values.iter().map(|v| i128::from(v.value)).sum();
        Some(sum as f64 / self.metric_values.len() as f64)
    }

    /// Largest `max` field across all samples.
    pub fn max(&self) -> Option<i64> {
        self.metric_values.iter().map(|v| v.max).max()
    }

    /// Smallest `min` field across all samples.
    pub fn min(&self) -> Option<i64> {
        self.metric_values.iter().map(|v| v.min).min()
    }
}

/// Application entry as listed by the controller.
///
/// Maps to `{ "description": "", "id": 9, "name": "CRM2" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    /// Controller-assigned application id.
    pub id: i64,
    /// Application name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mean_of_values() {
        let series = MetricSeries::new(
            "A",
            vec![MetricValue::flat(10), MetricValue::flat(20), MetricValue::flat(33)],
        );
        assert_eq!(series.mean(), Some(21.0));
    }

    #[test]
    fn test_mean_of_extreme_values_does_not_overflow() {
        let series = MetricSeries::new("A", vec![MetricValue::flat(i64::MAX), MetricValue::flat(1)]);
        let expected = (i128::from(i64::MAX) + 1) as f64 / 2.0;
        assert_eq!(series.mean(), Some(expected));
    }

    #[test]
    fn test_statistics_of_empty_series() {
        let series = MetricSeries::empty("A");
        assert!(series.is_empty());
        assert_eq!(series.mean(), None);
        assert_eq!(series.max(), None);
        assert_eq!(series.min(), None);
    }

    #[test]
    fn test_min_and_max_use_their_own_fields() {
        let series = MetricSeries::new(
            "A",
            vec![MetricValue::new(10, 2, 50), MetricValue::new(12, 5, 90)],
        );
        assert_eq!(series.max(), Some(90));
        assert_eq!(series.min(), Some(2));
    }

    #[test]
    fn test_decodes_controller_payload_and_ignores_unknown_fields() {
        let json = r#"[{
            "metricId": 2,
            "metricName": "BTM|Application Summary|Average Response Time (ms)",
            "metricPath": "Overall Application Performance|Average Response Time (ms)",
            "frequency": "ONE_MIN",
            "metricValues": [
                {"startTimeInMillis": 1000, "value": 12, "min": 3, "max": 40,
                 "current": 11, "sum": 480, "count": 40, "occurrences": 1,
                 "standardDeviation": 0, "useRange": true}
            ]
        }]"#;
        let decoded: Vec<MetricSeries> = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.len(), 1);
        let series = &decoded[0];
        assert_eq!(
            series.path(),
            "Overall Application Performance|Average Response Time (ms)"
        );
        assert_eq!(series.frequency.as_deref(), Some("ONE_MIN"));
        assert_eq!(series.values()[0].start_time_ms, 1000);
        assert_eq!(series.values()[0].max, 40);
        assert_eq!(series.values()[0].count, 40);
    }

    #[test]
    fn test_decodes_application_list() {
        let json = r#"[{"description": "", "id": 9, "name": "CRM2"}, {"id": 10, "name": "Shop"}]"#;
        let apps: Vec<ApplicationInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(apps[0].id, 9);
        assert_eq!(apps[1].name, "Shop");
        assert_eq!(apps[1].description, "");
    }
}
