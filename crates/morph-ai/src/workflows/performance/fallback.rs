use super::domain::{KpiMetric, KpiSnapshot, StructuredSummary};

/// Deterministic four-section summary used whenever the model path is unusable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedFallback;

impl RuleBasedFallback {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(
        &self,
        current: &KpiSnapshot,
        prior: Option<&KpiSnapshot>,
        bad_metrics: &[KpiMetric],
        need_psychologist: bool,
        need_conflict_resolution: bool,
    ) -> StructuredSummary {
        let performance_summary = if bad_metrics.is_empty() { "good" } else { "poor" };

        let improvement_areas = if bad_metrics.is_empty() {
            "No areas requiring urgent improvement.".to_string()
        } else {
            let labels: Vec<&str> = bad_metrics.iter().map(|metric| metric.label()).collect();
            format!("Needs improvement in: {}.", labels.join(", "))
        };

        let recommendation = if need_psychologist {
            "Psychologist - signs of stress/anxiety detected"
        } else if need_conflict_resolution {
            "Conflict resolution - signs of team conflict detected"
        } else {
            "Not needed"
        };

        StructuredSummary {
            performance_summary: performance_summary.to_string(),
            comparison: compare_weeks(current, prior),
            improvement_areas,
            recommendation: recommendation.to_string(),
        }
    }
}

fn compare_weeks(current: &KpiSnapshot, prior: Option<&KpiSnapshot>) -> String {
    let Some(prior) = prior else {
        return "No comparison data available.".to_string();
    };

    let task_delta = i64::from(current.tasks_completed) - i64::from(prior.tasks_completed);
    let error_delta = current.error_rate_pct - prior.error_rate_pct;

    if task_delta > 0 && error_delta < 0.0 {
        format!("Performance improved (tasks +{task_delta}, error {error_delta:.2}%).")
    } else if task_delta < 0 || error_delta > 0.0 {
        format!("Performance declined (tasks {task_delta}, error {error_delta:.2}%).")
    } else {
        "Performance relatively stable compared to previous week.".to_string()
    }
}
