use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::dataset::PerformanceDataset;
use super::domain::{
    EmployeeId, EvaluationRecord, FlaggedEmployee, KpiMetric, KpiSnapshot, PerformanceMetrics,
    StructuredSummary, SummarySource, SurveyResponse,
};
use super::evaluation::{
    EvaluationConfig, InterventionDetector, InterventionOutcome, MetricEvaluator,
};
use super::extractor::SummaryExtractor;
use super::fallback::RuleBasedFallback;
use super::gateways::{SentimentClassifier, SummaryGenerator};
use super::narrative::NarrativeComposer;
use super::repository::SummaryStore;

/// Batch-level failures. Everything below this level degrades per employee instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("current-period KPI table is missing or empty")]
    MissingInputTable,
    #[error("none of the requested employees appear in the current-period KPI table")]
    NoRequestedEmployees,
}

/// Employee left out of a batch and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEmployee {
    pub employee_id: EmployeeId,
    pub reason: String,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: BTreeMap<EmployeeId, EvaluationRecord>,
    pub skipped: Vec<SkippedEmployee>,
    pub psychologist: Vec<FlaggedEmployee>,
    pub conflict_resolution: Vec<FlaggedEmployee>,
    pub persistence_error: Option<String>,
    pub stored_total: Option<usize>,
}

impl BatchOutcome {
    pub fn evaluated(&self) -> usize {
        self.records.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Runs the evaluation steps for each employee and persists the records.
pub struct EmployeeEvaluationPipeline<S> {
    store: Arc<S>,
    evaluator: MetricEvaluator,
    detector: InterventionDetector,
    composer: NarrativeComposer,
    generator: Arc<dyn SummaryGenerator>,
    extractor: SummaryExtractor,
    fallback: RuleBasedFallback,
}

impl<S> EmployeeEvaluationPipeline<S>
where
    S: SummaryStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        classifier: Arc<dyn SentimentClassifier>,
        generator: Arc<dyn SummaryGenerator>,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            store,
            evaluator: MetricEvaluator::new(config.metrics.clone()),
            detector: InterventionDetector::new(classifier, config.sentiment),
            composer: NarrativeComposer::new(config.metrics),
            generator,
            extractor: SummaryExtractor::new(),
            fallback: RuleBasedFallback::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn generator(&self) -> Arc<dyn SummaryGenerator> {
        Arc::clone(&self.generator)
    }

    /// Evaluates `requested` ids, or every current-week employee when `None`.
    pub fn run(
        &self,
        dataset: &PerformanceDataset,
        requested: Option<&[EmployeeId]>,
    ) -> Result<BatchOutcome, PipelineError> {
        if dataset.current.is_empty() {
            return Err(PipelineError::MissingInputTable);
        }

        let employee_ids = match requested {
            Some(ids) => {
                let mut seen = BTreeSet::new();
                ids.iter()
                    .filter(|id| seen.insert((*id).clone()))
                    .cloned()
                    .collect::<Vec<_>>()
            }
            None => dataset.current.employee_ids(),
        };

        if requested.is_some()
            && !employee_ids
                .iter()
                .any(|id| dataset.current.get(id).is_some())
        {
            return Err(PipelineError::NoRequestedEmployees);
        }

        info!(employees = employee_ids.len(), "starting evaluation batch");

        let mut outcome = BatchOutcome::default();
        for employee_id in &employee_ids {
            let Some(current) = dataset.current.get(employee_id) else {
                warn!(%employee_id, "employee missing from current-period KPI table; skipped");
                outcome.skipped.push(SkippedEmployee {
                    employee_id: employee_id.clone(),
                    reason: "absent from current-period KPI table".to_string(),
                });
                continue;
            };

            let record = self.evaluate_employee(
                current,
                dataset.prior_for(employee_id),
                dataset.survey_for(employee_id),
            );

            if record.need_psychologist {
                outcome.psychologist.push(FlaggedEmployee::from(&record));
            }
            if record.need_conflict_resolution {
                outcome.conflict_resolution.push(FlaggedEmployee::from(&record));
            }
            outcome.records.insert(employee_id.clone(), record);
        }

        if !outcome.records.is_empty() {
            match self.store.merge(outcome.records.clone()) {
                Ok(total) => outcome.stored_total = Some(total),
                Err(err) => {
                    error!(error = %err, "failed to persist evaluation records");
                    outcome.persistence_error = Some(err.to_string());
                }
            }
        }

        info!(
            evaluated = outcome.evaluated(),
            skipped = outcome.skipped_count(),
            psychologist = outcome.psychologist.len(),
            conflict_resolution = outcome.conflict_resolution.len(),
            "evaluation batch finished"
        );

        Ok(outcome)
    }

    fn evaluate_employee(
        &self,
        current: &KpiSnapshot,
        prior: Option<&KpiSnapshot>,
        survey: Option<&SurveyResponse>,
    ) -> EvaluationRecord {
        let employee_id = &current.employee_id;
        debug!(%employee_id, has_prior = prior.is_some(), has_survey = survey.is_some(), "evaluating employee");

        let bad_metrics = self.evaluator.evaluate(current);

        let interventions = catch_unwind(AssertUnwindSafe(|| self.detector.detect(survey)))
            .unwrap_or_else(|_| {
                warn!(%employee_id, "sentiment detection panicked; flags cleared");
                InterventionOutcome::default()
            });

        let (structured_summary, summary_source) =
            match catch_unwind(AssertUnwindSafe(|| self.model_summary(current, prior, survey))) {
                Ok(Ok(summary)) => (summary, SummarySource::Model),
                Ok(Err(reason)) => {
                    warn!(%employee_id, %reason, "model summary unusable; using rule-based summary");
                    (
                        self.rule_based(current, prior, &bad_metrics, &interventions),
                        SummarySource::RuleBased,
                    )
                }
                Err(_) => {
                    warn!(%employee_id, "summary generation panicked; using rule-based summary");
                    (
                        self.rule_based(current, prior, &bad_metrics, &interventions),
                        SummarySource::RuleBased,
                    )
                }
            };

        EvaluationRecord {
            employee_id: employee_id.clone(),
            employee_name: current.employee_name.clone(),
            bad_metrics,
            need_psychologist: interventions.need_psychologist,
            need_conflict_resolution: interventions.need_conflict_resolution,
            summary: structured_summary.to_text(),
            structured_summary,
            summary_source,
            performance_metrics: PerformanceMetrics::from(current),
            created_at: Utc::now(),
        }
    }

    fn model_summary(
        &self,
        current: &KpiSnapshot,
        prior: Option<&KpiSnapshot>,
        survey: Option<&SurveyResponse>,
    ) -> Result<StructuredSummary, String> {
        let prompt = self.composer.compose(current, prior, survey);
        let raw = self
            .generator
            .generate(&prompt)
            .map_err(|err| err.to_string())?;
        self.extractor
            .extract_checked(&raw)
            .map_err(|err| err.to_string())
    }

    fn rule_based(
        &self,
        current: &KpiSnapshot,
        prior: Option<&KpiSnapshot>,
        bad_metrics: &[KpiMetric],
        interventions: &InterventionOutcome,
    ) -> StructuredSummary {
        self.fallback.summarize(
            current,
            prior,
            bad_metrics,
            interventions.need_psychologist,
            interventions.need_conflict_resolution,
        )
    }
}
