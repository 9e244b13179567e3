use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{EmployeeId, EvaluationRecord, FlaggedEmployee, KpiMetric};
use super::service::{BatchOutcome, SkippedEmployee};

#[derive(Debug, Clone, Serialize)]
pub struct MetricIssueEntry {
    pub metric: KpiMetric,
    pub count: usize,
}

/// Counts of each failing metric across a set of records.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MetricIssueBreakdown {
    pub entries: Vec<MetricIssueEntry>,
}

impl MetricIssueBreakdown {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) -> Self {
        let mut counts: BTreeMap<KpiMetric, usize> = BTreeMap::new();
        for record in records {
            for metric in &record.bad_metrics {
                *counts.entry(*metric).or_default() += 1;
            }
        }

        Self {
            entries: counts
                .into_iter()
                .map(|(metric, count)| MetricIssueEntry { metric, count })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReportView {
    pub evaluated: usize,
    pub skipped: usize,
    pub skipped_employees: Vec<SkippedEmployee>,
    pub summaries: BTreeMap<EmployeeId, EvaluationRecord>,
    pub psychologist: Vec<FlaggedEmployee>,
    pub conflict_resolution: Vec<FlaggedEmployee>,
    pub metric_issues: MetricIssueBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_total: Option<usize>,
}

impl From<BatchOutcome> for BatchReportView {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            evaluated: outcome.evaluated(),
            skipped: outcome.skipped_count(),
            metric_issues: MetricIssueBreakdown::from_records(outcome.records.values()),
            skipped_employees: outcome.skipped,
            summaries: outcome.records,
            psychologist: outcome.psychologist,
            conflict_resolution: outcome.conflict_resolution,
            persistence_error: outcome.persistence_error,
            stored_total: outcome.stored_total,
        }
    }
}
