//! Weekly employee evaluation: KPI thresholds, survey sentiment, model-written
//! summaries with a deterministic fallback, and the persisted per-employee record.

pub mod assistants;
pub mod dataset;
pub mod domain;
pub mod evaluation;
pub mod export;
pub mod extractor;
pub mod fallback;
pub mod gateways;
pub mod narrative;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use assistants::{AssistantKind, ChatReply, ServiceRecommendation};
pub use dataset::{KpiTable, PerformanceDataset, SurveyTable};
pub use domain::{
    EmployeeId, EvaluationRecord, FlaggedEmployee, KpiMetric, KpiSnapshot, PerformanceMetrics,
    SentimentLabel, SentimentResult, StructuredSummary, SummarySection, SummarySource,
    SurveyQuestion, SurveyResponse, NO_INFORMATION,
};
pub use evaluation::{
    EvaluationConfig, InterventionDetector, InterventionOutcome, MetricEvaluator,
    MetricThresholds, SentimentThresholds,
};
pub use export::{export_summaries_csv, write_summaries_csv, ExportError};
pub use extractor::{ExtractionError, SummaryExtractor};
pub use fallback::RuleBasedFallback;
pub use gateways::{
    DisabledSummaryGenerator, LlmError, OllamaSummaryGenerator, SentimentClassifier,
    SentimentError, SummaryGenerator,
};
pub use narrative::NarrativeComposer;
pub use repository::{JsonFileSummaryStore, RepositoryError, SummaryStore};
pub use router::performance_router;
pub use service::{BatchOutcome, EmployeeEvaluationPipeline, PipelineError, SkippedEmployee};
pub use views::{BatchReportView, MetricIssueBreakdown, MetricIssueEntry};
