//! AppDynamics metric collection and build regression gate.
//!
//! This crate fetches application-performance metrics from an AppDynamics
//! controller for the time window of a build, reduces them to summary
//! statistics and decides whether the build regressed compared to the
//! reports of earlier builds.
//!
//! # Overview
//!
//! ```text
//! build start ─► ReportBuilder ─► MetricSource (per metric path) ─► Report
//!                                                                    │
//!                      history of earlier Reports ─► RegressionEvaluator
//!                                                                    │
//!                                              (score, classification)
//! ```
//!
//! # Module Organization
//!
//! - [`metric`] - Raw metric series and application information
//! - [`paths`] - The fixed metric path list and the custom path variant
//! - [`report`] - Immutable per-build [`Report`] with derived statistics
//! - [`source`] - The [`MetricSource`] seam, an in-memory source and the REST client
//! - [`builder`] - Time-window derivation and report assembly
//! - [`history`] - Baseline selection and trend data over earlier reports
//! - [`evaluator`] - Pure regression scoring and threshold classification
//! - [`outcome`] - Build-result merge policy
//! - [`gate`] - End-to-end orchestration with progress logging
//! - [`config`] - TOML configuration with clamping and validation
//! - [`cache`] - Bounded, host-owned report cache
//! - [`links`] - Controller deep-link construction
//!
//! # Example
//!
//! ```
//! use appd_regress::{
//!     MetricPath, MetricSeries, MetricValue, RegressionEvaluator, ReportBuilder,
//!     StaticMetricSource, Thresholds, EvaluationSettings, Classification,
//! };
//!
//! # tokio_test_block(async {
//! let source = StaticMetricSource::new("http://controller:8090/controller/")
//!     .with_series(MetricSeries::new("A", vec![MetricValue::flat(120)]));
//!
//! let builder = ReportBuilder::new(10, vec![MetricPath::fixed("A"), MetricPath::custom("B")]);
//! let report = builder.build_at(&source, 0, 60_000).await;
//! assert_eq!(report.average("A").unwrap(), 120.0);
//!
//! let previous = builder.build_at(&source, -3_600_000, 0).await;
//! let evaluator = RegressionEvaluator::new(EvaluationSettings::new("A", true, Thresholds::new(80, 65)));
//! let evaluation = evaluator.evaluate(&report, [&previous]).unwrap();
//! assert_eq!(evaluation.classification, Classification::Ok);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     futures::executor::block_on(f)
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod history;
pub mod links;
pub mod metric;
pub mod outcome;
pub mod paths;
pub mod report;
pub mod source;

// Re-exports for ergonomic access
pub use builder::{duration_to_fetch, ReportBuilder};
pub use cache::ReportCache;
pub use config::{ControllerSettings, GateConfig, GateSettings};
pub use error::{Error, Result};
pub use evaluator::{Classification, Evaluation, EvaluationSettings, RegressionEvaluator, Thresholds};
pub use gate::{BuildGate, GateOutcome};
pub use history::{baseline_average, baseline_reports, trend, BuildReport, TrendPoint};
pub use metric::{ApplicationInfo, MetricSeries, MetricValue};
pub use outcome::BuildResult;
pub use paths::{MetricPath, FIXED_METRIC_PATHS};
pub use report::{ApplicationLink, Report, NO_DATA};
pub use source::{MetricSource, StaticMetricSource};

#[cfg(feature = "http-client")]
pub use source::rest::RestMetricSource;
