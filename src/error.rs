//! Error types for report assembly and regression evaluation.
//!
//! Transport failures never show up here: a [`MetricSource`](crate::MetricSource)
//! absorbs them and reports the metric as absent. Only semantic misuse and
//! the conditions that block an evaluation are surfaced to the caller.

/// Errors raised by the library API.
///
/// # Examples
///
/// ```
/// use appd_regress::Error;
///
/// let err = Error::UnknownMetric {
///     path: "Overall Application Performance|Calls per Minute".to_string(),
/// };
/// assert!(err.to_string().contains("Calls per Minute"));
/// assert!(!err.is_evaluation_blocking());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pre-flight connection check against the controller failed.
    #[error("connection to AppDynamics controller '{controller}' could not be established")]
    ConnectionUnavailable {
        /// Controller URI that was checked.
        controller: String,
    },

    /// Statistics were requested for a metric path the report never fetched.
    #[error("metric is not available in this report: {path}")]
    UnknownMetric {
        /// The requested metric path.
        path: String,
    },

    /// The threshold metric has no usable average for the current build.
    #[error("threshold metric has no usable data: {metric}")]
    ThresholdMetricUnavailable {
        /// The configured threshold metric path.
        metric: String,
    },

    /// The configuration parsed but contains invalid values.
    #[error("config validation error: {message}")]
    Config {
        /// Human-readable description of the problem.
        message: String,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("failed to parse config TOML: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        source: std::io::Error,
        path: String,
    },
}

impl Error {
    /// Returns `true` for errors that leave the build without a verdict.
    ///
    /// Hosts map these onto a conservative status downgrade instead of
    /// treating the build as passing.
    pub fn is_evaluation_blocking(&self) -> bool {
        matches!(
            self,
            Self::ConnectionUnavailable { .. } | Self::ThresholdMetricUnavailable { .. }
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_carry_context() {
        let err = Error::ThresholdMetricUnavailable {
            metric: "A|B".to_string(),
        };
        assert_eq!(err.to_string(), "threshold metric has no usable data: A|B");

        let err = Error::ConnectionUnavailable {
            controller: "http://ctrl/controller/".to_string(),
        };
        assert!(err.to_string().contains("http://ctrl/controller/"));
    }

    #[test]
    fn test_blocking_classification() {
        assert!(Error::ConnectionUnavailable {
            controller: String::new()
        }
        .is_evaluation_blocking());
        assert!(Error::ThresholdMetricUnavailable {
            metric: String::new()
        }
        .is_evaluation_blocking());
        assert!(!Error::UnknownMetric {
            path: String::new()
        }
        .is_evaluation_blocking());
        assert!(!Error::Config {
            message: String::new()
        }
        .is_evaluation_blocking());
    }

    #[test]
    fn test_toml_errors_convert() {
        let parse_err = toml::from_str::<toml::Table>("= broken").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }
}
