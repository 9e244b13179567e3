use super::super::domain::{KpiMetric, KpiSnapshot};
use super::config::MetricThresholds;

fn violates(metric: KpiMetric, snapshot: &KpiSnapshot, thresholds: &MetricThresholds) -> bool {
    match metric {
        KpiMetric::TasksCompleted => snapshot.tasks_completed < thresholds.min_tasks_completed,
        KpiMetric::TimePerTask => snapshot.time_per_task_hours > thresholds.max_time_per_task_hours,
        KpiMetric::ErrorRate => snapshot.error_rate_pct > thresholds.max_error_rate_pct,
        KpiMetric::CustomerSatisfaction => {
            snapshot.customer_satisfaction_pct < thresholds.min_customer_satisfaction_pct
        }
    }
}

pub(crate) fn failing_metrics(
    snapshot: &KpiSnapshot,
    thresholds: &MetricThresholds,
) -> Vec<KpiMetric> {
    KpiMetric::ordered()
        .into_iter()
        .filter(|metric| violates(*metric, snapshot, thresholds))
        .collect()
}

/// Human-readable threshold list quoted in the model prompt.
pub(crate) fn describe_thresholds(thresholds: &MetricThresholds) -> String {
    format!(
        "min. {} tasks, max. {} hours/task, max. {}% error, min. {}% satisfaction",
        thresholds.min_tasks_completed,
        thresholds.max_time_per_task_hours,
        thresholds.max_error_rate_pct,
        thresholds.min_customer_satisfaction_pct,
    )
}
