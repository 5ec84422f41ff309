//! End-to-end regression gate for a single build.
//!
//! [`BuildGate`] strings the pieces together the way a CI step runs them:
//! check the controller connection, assemble the report, evaluate it against
//! the history and merge the verdict into the build result. Progress is
//! reported through `tracing` events; the evaluator itself stays silent.

use tracing::{info, warn};

use crate::builder::ReportBuilder;
use crate::config::GateSettings;
use crate::error::Error;
use crate::evaluator::{Evaluation, RegressionEvaluator};
use crate::outcome::BuildResult;
use crate::report::Report;
use crate::source::MetricSource;

/// Everything a gate run produced.
#[derive(Debug)]
pub struct GateOutcome {
    /// The assembled report; `None` if the controller was unreachable.
    pub report: Option<Report>,
    /// The verdict; `None` if the evaluation could not be carried out.
    pub evaluation: Option<Evaluation>,
    /// Why the evaluation could not be carried out.
    pub error: Option<Error>,
    /// Build result after merging the verdict.
    pub result: BuildResult,
}

impl GateOutcome {
    fn blocked(report: Option<Report>, error: Error, previous: BuildResult) -> Self {
        let result = previous.degrade_for_error();
        warn!(%error, from = %previous, to = %result, "cannot evaluate build");
        Self {
            report,
            evaluation: None,
            error: Some(error),
            result,
        }
    }
}

/// Report assembly plus evaluation for one project.
#[derive(Debug, Clone)]
pub struct BuildGate {
    builder: ReportBuilder,
    evaluator: RegressionEvaluator,
}

impl BuildGate {
    pub fn new(builder: ReportBuilder, evaluator: RegressionEvaluator) -> Self {
        Self { builder, evaluator }
    }

    /// Creates a gate from the `[gate]` configuration table.
    pub fn from_settings(settings: &GateSettings) -> Self {
        Self::new(
            settings.report_builder(),
            RegressionEvaluator::new(settings.evaluation_settings()),
        )
    }

    pub fn builder(&self) -> &ReportBuilder {
        &self.builder
    }

    pub fn evaluator(&self) -> &RegressionEvaluator {
        &self.evaluator
    }

    /// Runs the gate with the current time as the end of the build window.
    pub async fn run<'a, S, I>(
        &self,
        source: &S,
        build_start_ms: i64,
        previous: BuildResult,
        history: I,
    ) -> GateOutcome
    where
        S: MetricSource + ?Sized,
        I: IntoIterator<Item = &'a Report>,
    {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.run_at(source, build_start_ms, now_ms, previous, history)
            .await
    }

    /// Runs the gate with an explicit window end.
    pub async fn run_at<'a, S, I>(
        &self,
        source: &S,
        build_start_ms: i64,
        now_ms: i64,
        previous: BuildResult,
        history: I,
    ) -> GateOutcome
    where
        S: MetricSource + ?Sized,
        I: IntoIterator<Item = &'a Report>,
    {
        info!(controller = %source.controller_uri(), "verifying connection to AppDynamics REST interface");
        if !source.validate_connection().await {
            let error = Error::ConnectionUnavailable {
                controller: source.controller_uri().to_string(),
            };
            return GateOutcome::blocked(None, error, previous);
        }
        info!("connection successful, fetching measurements from AppDynamics controller");

        let report = self.builder.build_at(source, build_start_ms, now_ms).await;
        let settings = self.evaluator.settings();
        info!(
            metrics = report.len(),
            duration_minutes = report.duration_minutes(),
            threshold_metric = %settings.threshold_metric,
            lower_is_better = settings.lower_is_better,
            "AppDynamics report ready, verifying performance"
        );
        info!(
            unstable_pct = settings.thresholds.unstable_pct(),
            failed_pct = settings.thresholds.failed_pct(),
            "scores below a threshold mark the build unstable or failed"
        );

        let evaluation = match self.evaluator.evaluate(&report, history) {
            Ok(evaluation) => evaluation,
            Err(error) => return GateOutcome::blocked(Some(report), error, previous),
        };

        info!(
            baseline_reports = evaluation.baseline_reports,
            baseline = evaluation.baseline_or_sentinel(),
            current = evaluation.current_average,
            score = evaluation.score,
            "compared current build with previous reports"
        );

        let result = previous.apply(evaluation.classification);
        info!(
            metric = %settings.threshold_metric,
            score = evaluation.score,
            classification = %evaluation.classification,
            result = %result,
            "performance compared to average"
        );

        GateOutcome {
            report: Some(report),
            evaluation: Some(evaluation),
            error: None,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Classification, EvaluationSettings, Thresholds};
    use crate::metric::{MetricSeries, MetricValue};
    use crate::paths::MetricPath;
    use crate::source::StaticMetricSource;
    use pretty_assertions::assert_eq;

    fn gate() -> BuildGate {
        BuildGate::new(
            ReportBuilder::new(10, vec![MetricPath::fixed("M")]),
            RegressionEvaluator::new(EvaluationSettings::new("M", true, Thresholds::new(80, 65))),
        )
    }

    fn history_report(timestamp_ms: i64, value: i64) -> Report {
        Report::new(
            timestamp_ms,
            10,
            vec![MetricSeries::new("M", vec![MetricValue::flat(value)])],
        )
    }

    #[tokio::test]
    async fn test_unreachable_controller_fails_build() {
        let source = StaticMetricSource::new("http://c/controller/").with_connection(false);
        let outcome = gate()
            .run_at(&source, 0, 0, BuildResult::Success, std::iter::empty())
            .await;
        assert!(outcome.report.is_none());
        assert!(matches!(outcome.error, Some(Error::ConnectionUnavailable { .. })));
        assert_eq!(outcome.result, BuildResult::Failure);
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_threshold_metric_keeps_report() {
        let source = StaticMetricSource::new("u");
        let outcome = gate()
            .run_at(&source, 0, 0, BuildResult::Unstable, std::iter::empty())
            .await;
        assert!(outcome.report.is_some());
        assert!(matches!(
            outcome.error,
            Some(Error::ThresholdMetricUnavailable { .. })
        ));
        assert_eq!(outcome.result, BuildResult::Failure);
    }

    #[tokio::test]
    async fn test_degraded_build_becomes_unstable() {
        let source = StaticMetricSource::new("u")
            .with_series(MetricSeries::new("M", vec![MetricValue::flat(130)]));
        let history = [history_report(-1, 100)];
        let outcome = gate()
            .run_at(&source, 0, 0, BuildResult::Success, &history)
            .await;
        let evaluation = outcome.evaluation.unwrap();
        // 100 / 130 * 100 = 76.9
        assert_eq!(evaluation.classification, Classification::Unstable);
        assert_eq!(outcome.result, BuildResult::Unstable);
    }

    #[tokio::test]
    async fn test_ok_keeps_previous_result() {
        let source = StaticMetricSource::new("u")
            .with_series(MetricSeries::new("M", vec![MetricValue::flat(90)]));
        let history = [history_report(-1, 100)];
        let outcome = gate()
            .run_at(&source, 0, 0, BuildResult::Unstable, &history)
            .await;
        assert_eq!(outcome.evaluation.unwrap().classification, Classification::Ok);
        assert_eq!(outcome.result, BuildResult::Unstable);
    }
}
