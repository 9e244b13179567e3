use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::performance::dataset::{KpiTable, PerformanceDataset};
use crate::workflows::performance::domain::{
    EmployeeId, EvaluationRecord, KpiSnapshot, PerformanceMetrics, SentimentLabel,
    SentimentResult, StructuredSummary, SummarySource,
};
use crate::workflows::performance::evaluation::EvaluationConfig;
use crate::workflows::performance::gateways::{
    LlmError, SentimentClassifier, SentimentError, SummaryGenerator,
};
use crate::workflows::performance::repository::{RepositoryError, SummaryStore};
use crate::workflows::performance::service::EmployeeEvaluationPipeline;

pub(super) const WELL_FORMED_REPLY: &str = "Performance Summary: good, all targets met\n\
Comparison: tasks up by two compared to last week\n\
Improvement Areas: none urgent\n\
Recommendation: not needed";

pub(super) fn snapshot(
    id: &str,
    name: &str,
    tasks: u32,
    time: f64,
    error: f64,
    satisfaction: f64,
) -> KpiSnapshot {
    KpiSnapshot {
        employee_id: EmployeeId::from(id),
        employee_name: name.to_string(),
        tasks_completed: tasks,
        time_per_task_hours: time,
        error_rate_pct: error,
        customer_satisfaction_pct: satisfaction,
        attendance_pct: 96.0,
        punctuality_pct: 94.5,
        individual_goal_pct: 88.0,
        team_goal_pct: 82.5,
        vision_contribution: 4.0,
        communication_score: 4.2,
        teamwork_score: 3.8,
    }
}

pub(super) fn compliant(id: &str, name: &str) -> KpiSnapshot {
    snapshot(id, name, 20, 2.0, 2.0, 90.0)
}

pub(super) fn struggling(id: &str, name: &str) -> KpiSnapshot {
    snapshot(id, name, 10, 4.0, 8.0, 70.0)
}

pub(super) fn dataset(rows: Vec<KpiSnapshot>) -> PerformanceDataset {
    PerformanceDataset::new(KpiTable::from_rows(rows))
}

pub(super) fn record(
    id: &str,
    name: &str,
    need_psychologist: bool,
    need_conflict_resolution: bool,
) -> EvaluationRecord {
    let current = compliant(id, name);
    let summary = StructuredSummary {
        performance_summary: "good".to_string(),
        comparison: "No comparison data available.".to_string(),
        improvement_areas: "No areas requiring urgent improvement.".to_string(),
        recommendation: "Not needed".to_string(),
    };
    EvaluationRecord {
        employee_id: current.employee_id.clone(),
        employee_name: name.to_string(),
        bad_metrics: Vec::new(),
        need_psychologist,
        need_conflict_resolution,
        summary: summary.to_text(),
        structured_summary: summary,
        summary_source: SummarySource::RuleBased,
        performance_metrics: PerformanceMetrics::from(&current),
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

/// Classifier returning canned results per text and counting calls.
#[derive(Default)]
pub(super) struct ScriptedClassifier {
    results: HashMap<String, SentimentResult>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub(super) fn with(mut self, text: &str, label: SentimentLabel, score: f64) -> Self {
        self.results
            .insert(text.to_string(), SentimentResult::normalized(label, score));
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SentimentClassifier for ScriptedClassifier {
    fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .results
            .get(text)
            .copied()
            .unwrap_or_else(SentimentResult::neutral))
    }
}

pub(super) struct FailingClassifier;

impl SentimentClassifier for FailingClassifier {
    fn classify(&self, _text: &str) -> Result<SentimentResult, SentimentError> {
        Err(SentimentError::Timeout(20))
    }
}

pub(super) struct PanickingClassifier;

impl SentimentClassifier for PanickingClassifier {
    fn classify(&self, _text: &str) -> Result<SentimentResult, SentimentError> {
        panic!("classifier crashed")
    }
}

/// Generator replaying one fixed reply and recording prompts.
pub(super) struct ScriptedGenerator {
    reply: Result<String, LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(error: LlmError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

impl SummaryGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(prompt.to_string());
        self.reply.clone()
    }
}

/// Panics for one employee's prompt, answers normally otherwise.
pub(super) struct PanicsFor(pub(super) &'static str);

impl SummaryGenerator for PanicsFor {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.contains(self.0) {
            panic!("generator crashed");
        }
        Ok(WELL_FORMED_REPLY.to_string())
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<BTreeMap<EmployeeId, EvaluationRecord>>,
}

impl MemoryStore {
    pub(super) fn seeded(records: Vec<EvaluationRecord>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("store mutex poisoned");
            for record in records {
                guard.insert(record.employee_id.clone(), record);
            }
        }
        store
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }
}

impl SummaryStore for MemoryStore {
    fn all(&self) -> Result<BTreeMap<EmployeeId, EvaluationRecord>, RepositoryError> {
        Ok(self.records.lock().expect("store mutex poisoned").clone())
    }

    fn merge(
        &self,
        records: BTreeMap<EmployeeId, EvaluationRecord>,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.extend(records);
        Ok(guard.len())
    }
}

pub(super) struct UnavailableStore;

impl SummaryStore for UnavailableStore {
    fn all(&self) -> Result<BTreeMap<EmployeeId, EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn merge(
        &self,
        _records: BTreeMap<EmployeeId, EvaluationRecord>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) fn pipeline_with<S: SummaryStore + 'static>(
    store: Arc<S>,
    classifier: Arc<dyn SentimentClassifier>,
    generator: Arc<dyn SummaryGenerator>,
) -> EmployeeEvaluationPipeline<S> {
    EmployeeEvaluationPipeline::new(store, classifier, generator, EvaluationConfig::default())
}

pub(super) fn memory_pipeline(
    generator: Arc<dyn SummaryGenerator>,
) -> (EmployeeEvaluationPipeline<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let pipeline = pipeline_with(
        store.clone(),
        Arc::new(ScriptedClassifier::default()),
        generator,
    );
    (pipeline, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
