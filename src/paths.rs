//! The metric paths collected for every build.
//!
//! Eight overall-application metrics are always fetched. A ninth, user
//! configured path is carried as [`MetricPath::Custom`] instead of a
//! placeholder string, so the custom path never has to be recognised by
//! string comparison at the call sites.

use std::fmt;

/// Metric paths fetched for every build, in report order.
pub const FIXED_METRIC_PATHS: [&str; 8] = [
    "Overall Application Performance|Average Response Time (ms)",
    "Overall Application Performance|Calls per Minute",
    "Overall Application Performance|Normal Average Response Time (ms)",
    "Overall Application Performance|Number of Slow Calls",
    "Overall Application Performance|Number of Very Slow Calls",
    "Overall Application Performance|Errors per Minute",
    "Overall Application Performance|Exceptions per Minute",
    "Overall Application Performance|Infrastructure Errors per Minute",
];

/// Label shown for the custom slot in selection lists.
///
/// A threshold metric configured with this label resolves to the custom
/// metric path.
pub const CUSTOM_METRIC_LABEL: &str = "Custom metric path";

/// Custom metric path used when none is configured.
pub const DEFAULT_CUSTOM_METRIC_PATH: &str = "Overall Application Performance|Stall Count";

/// Threshold metric used when none is configured.
pub const DEFAULT_THRESHOLD_METRIC: &str = FIXED_METRIC_PATHS[0];

/// A metric path to fetch: one of the fixed paths or the user's custom path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricPath {
    /// A path from the built-in list.
    Fixed(String),
    /// The user-configured custom path.
    Custom(String),
}

impl MetricPath {
    /// Creates a fixed path.
    pub fn fixed(path: impl Into<String>) -> Self {
        Self::Fixed(path.into())
    }

    /// Creates a custom path.
    pub fn custom(path: impl Into<String>) -> Self {
        Self::Custom(path.into())
    }

    /// The controller metric path.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fixed(path) | Self::Custom(path) => path,
        }
    }

    /// Returns `true` for the custom slot.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for MetricPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full list of paths to fetch: the fixed paths followed by `custom`.
///
/// # Examples
///
/// ```
/// use appd_regress::paths::{merged_metric_paths, FIXED_METRIC_PATHS};
///
/// let paths = merged_metric_paths("Business Transaction Performance|Checkout|Calls per Minute");
/// assert_eq!(paths.len(), FIXED_METRIC_PATHS.len() + 1);
/// assert!(paths.last().unwrap().is_custom());
/// ```
pub fn merged_metric_paths(custom: &str) -> Vec<MetricPath> {
    FIXED_METRIC_PATHS
        .iter()
        .map(|path| MetricPath::fixed(*path))
        .chain(std::iter::once(MetricPath::custom(custom)))
        .collect()
}

/// Labels offered when choosing a threshold metric.
///
/// The fixed paths plus [`CUSTOM_METRIC_LABEL`].
pub fn selectable_metric_labels() -> Vec<&'static str> {
    FIXED_METRIC_PATHS
        .iter()
        .copied()
        .chain(std::iter::once(CUSTOM_METRIC_LABEL))
        .collect()
}

/// Resolves a configured threshold metric to a concrete metric path.
///
/// Empty input falls back to [`DEFAULT_THRESHOLD_METRIC`]; the custom label
/// resolves to `custom`.
pub fn resolve_threshold_metric(configured: &str, custom: &str) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        DEFAULT_THRESHOLD_METRIC.to_string()
    } else if configured == CUSTOM_METRIC_LABEL {
        custom.to_string()
    } else {
        configured.to_string()
    }
}

/// Last segment of a pipe-delimited path, used as a short title.
///
/// ```
/// use appd_regress::paths::short_name;
///
/// assert_eq!(short_name("Overall Application Performance|Calls per Minute"), "Calls per Minute");
/// assert_eq!(short_name("Plain"), "Plain");
/// ```
pub fn short_name(path: &str) -> &str {
    path.rsplit('|').next().unwrap_or(path)
}
