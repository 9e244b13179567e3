mod config;
mod interventions;
pub(crate) mod rules;

pub use config::{EvaluationConfig, InvalidThreshold, MetricThresholds, SentimentThresholds};
pub use interventions::{InterventionDetector, InterventionOutcome};

use super::domain::{KpiMetric, KpiSnapshot};

/// Stateless evaluator that checks a week's KPIs against the fixed thresholds.
#[derive(Debug, Clone, Default)]
pub struct MetricEvaluator {
    thresholds: MetricThresholds,
}

impl MetricEvaluator {
    pub fn new(thresholds: MetricThresholds) -> Self {
        Self { thresholds }
    }

    /// Failing metrics in evaluation order; empty when every threshold passes.
    pub fn evaluate(&self, snapshot: &KpiSnapshot) -> Vec<KpiMetric> {
        rules::failing_metrics(snapshot, &self.thresholds)
    }
}
