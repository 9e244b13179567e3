use metrics_exporter_prometheus::PrometheusHandle;
use morph_ai::config::AppConfig;
use morph_ai::error::AppError;
use morph_ai::workflows::performance::gateways::classifier_from_config;
use morph_ai::workflows::performance::{
    AssistantKind, DisabledSummaryGenerator, EmployeeEvaluationPipeline, JsonFileSummaryStore,
    OllamaSummaryGenerator, SummaryGenerator,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Pipeline = EmployeeEvaluationPipeline<JsonFileSummaryStore>;

/// Wires the model, classifier, and JSON store from configuration.
///
/// The gateways hold blocking HTTP clients, so call this off the async runtime.
pub(crate) fn build_pipeline(
    config: &AppConfig,
    store_path: Option<PathBuf>,
    rule_based_only: bool,
) -> Result<Pipeline, AppError> {
    config
        .evaluation
        .validate()
        .map_err(|err| AppError::Runtime(err.to_string()))?;

    let generator: Arc<dyn SummaryGenerator> = if rule_based_only {
        Arc::new(DisabledSummaryGenerator)
    } else {
        Arc::new(OllamaSummaryGenerator::new(&config.model)?)
    };
    let classifier = classifier_from_config(&config.sentiment, Arc::clone(&generator))?;
    let store = Arc::new(JsonFileSummaryStore::new(
        store_path.unwrap_or_else(|| config.store.path.clone()),
    ));

    info!(
        store = %store.path().display(),
        model = %config.model.model,
        sentiment_backend = ?config.sentiment.backend,
        rule_based_only,
        "evaluation pipeline configured"
    );

    Ok(EmployeeEvaluationPipeline::new(
        store,
        classifier,
        generator,
        config.evaluation.clone(),
    ))
}

pub(crate) fn parse_assistant(raw: &str) -> Result<AssistantKind, String> {
    AssistantKind::parse(raw).ok_or_else(|| {
        format!("unknown assistant '{raw}' (expected sidekick, psycholog or conflict)")
    })
}
