use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::assistants::{self, AssistantError, AssistantKind};
use super::domain::{EmployeeId, EvaluationRecord};
use super::repository::{RepositoryError, SummaryStore};
use super::service::EmployeeEvaluationPipeline;
use super::views::BatchReportView;
use crate::workflows::ingest::PerformanceDatasetImporter;

/// CSV payloads for one batch. Prior week and survey are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
    pub current_kpi: String,
    #[serde(default)]
    pub prior_kpi: Option<String>,
    #[serde(default)]
    pub survey: Option<String>,
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextQuery {
    pub employee: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub employee: Option<String>,
}

/// Router exposing batch evaluation, stored summaries, and assistant contexts.
pub fn performance_router<S>(pipeline: Arc<EmployeeEvaluationPipeline<S>>) -> Router
where
    S: SummaryStore + 'static,
{
    Router::new()
        .route("/api/v1/evaluations", post(evaluate_handler::<S>))
        .route("/api/v1/summaries", get(summaries_handler::<S>))
        .route(
            "/api/v1/summaries/:employee_id",
            get(summary_handler::<S>),
        )
        .route(
            "/api/v1/interventions/psychologist",
            get(psychologist_handler::<S>),
        )
        .route(
            "/api/v1/interventions/conflict-resolution",
            get(conflict_resolution_handler::<S>),
        )
        .route("/api/v1/assistants/recommend", post(recommend_handler::<S>))
        .route(
            "/api/v1/assistants/:assistant/context",
            get(context_handler::<S>),
        )
        .route("/api/v1/assistants/:assistant/chat", post(chat_handler::<S>))
        .with_state(pipeline)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, Json(payload)).into_response()
}

fn repository_failure(err: RepositoryError) -> Response {
    error!(error = %err, "summary store request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub(crate) async fn evaluate_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
    Json(request): Json<EvaluationRequest>,
) -> Response
where
    S: SummaryStore + 'static,
{
    let dataset = match PerformanceDatasetImporter::from_csv_strings(
        &request.current_kpi,
        request.prior_kpi.as_deref(),
        request.survey.as_deref(),
    ) {
        Ok(dataset) => dataset,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let requested: Option<Vec<EmployeeId>> = request
        .employee_ids
        .filter(|ids| !ids.is_empty())
        .map(|ids| ids.into_iter().map(EmployeeId::new).collect());

    let worker = Arc::clone(&pipeline);
    let joined =
        tokio::task::spawn_blocking(move || worker.run(&dataset, requested.as_deref())).await;

    match joined {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(BatchReportView::from(outcome))).into_response(),
        Ok(Err(err)) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        Err(join_error) => {
            error!(error = %join_error, "evaluation worker failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "evaluation worker failed",
            )
        }
    }
}

/// Runs a store read on the blocking pool. File-backed stores touch the disk under a lock.
async fn read_store<S, T, F>(
    pipeline: &Arc<EmployeeEvaluationPipeline<S>>,
    read: F,
) -> Result<T, Response>
where
    S: SummaryStore + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T, RepositoryError> + Send + 'static,
{
    let store = Arc::clone(pipeline.store());
    match tokio::task::spawn_blocking(move || read(store.as_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(repository_failure(err)),
        Err(join_error) => {
            error!(error = %join_error, "summary store worker failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "summary store worker failed",
            ))
        }
    }
}

pub(crate) async fn summaries_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
    Query(query): Query<SummaryQuery>,
) -> Response
where
    S: SummaryStore + 'static,
{
    let records = read_store(&pipeline, move |store| match query.days {
        Some(days) => store.recent(days, Utc::now()).map(|records| {
            records
                .into_iter()
                .map(|record| (record.employee_id.clone(), record))
                .collect::<BTreeMap<EmployeeId, EvaluationRecord>>()
        }),
        None => store.all(),
    })
    .await;

    match records {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn summary_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    S: SummaryStore + 'static,
{
    let id = EmployeeId::new(employee_id);
    let lookup = id.clone();
    match read_store(&pipeline, move |store| store.get(&lookup)).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("no summary stored for employee {id}"),
        ),
        Err(response) => response,
    }
}

pub(crate) async fn psychologist_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
) -> Response
where
    S: SummaryStore + 'static,
{
    match read_store(&pipeline, |store| assistants::flagged_for_psychologist(store)).await {
        Ok(employees) => (StatusCode::OK, Json(employees)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn conflict_resolution_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
) -> Response
where
    S: SummaryStore + 'static,
{
    match read_store(&pipeline, |store| {
        assistants::flagged_for_conflict_resolution(store)
    })
    .await
    {
        Ok(employees) => (StatusCode::OK, Json(employees)).into_response(),
        Err(response) => response,
    }
}

fn unknown_assistant(name: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("unknown assistant '{name}'; expected sidekick, psycholog or conflict"),
    )
}

pub(crate) async fn context_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
    Path(assistant): Path<String>,
    Query(query): Query<ContextQuery>,
) -> Response
where
    S: SummaryStore + 'static,
{
    let Some(kind) = AssistantKind::parse(&assistant) else {
        return unknown_assistant(&assistant);
    };

    let context = read_store(&pipeline, move |store| {
        assistants::context_for(kind, store, query.employee.as_deref())
    })
    .await;

    match context {
        Ok(context) => {
            let payload = json!({
                "assistant": kind,
                "context": context,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(response) => response,
    }
}

pub(crate) async fn recommend_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
    Json(request): Json<ChatRequest>,
) -> Response
where
    S: SummaryStore + 'static,
{
    let recommendation = read_store(&pipeline, move |store| {
        let record = match request.employee.as_deref() {
            Some(name) => store.find_by_name(name)?,
            None => assistants::mentioned_employee(store, &request.message)?,
        };
        Ok(assistants::recommend_services(
            &request.message,
            record.as_ref(),
        ))
    })
    .await;

    match recommendation {
        Ok(recommendation) => (StatusCode::OK, Json(recommendation)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn chat_handler<S>(
    State(pipeline): State<Arc<EmployeeEvaluationPipeline<S>>>,
    Path(assistant): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Response
where
    S: SummaryStore + 'static,
{
    let Some(kind) = AssistantKind::parse(&assistant) else {
        return unknown_assistant(&assistant);
    };

    let worker = Arc::clone(&pipeline);
    let joined = tokio::task::spawn_blocking(move || {
        let generator = worker.generator();
        assistants::respond(
            kind,
            worker.store().as_ref(),
            generator.as_ref(),
            &request.message,
            request.employee.as_deref(),
        )
    })
    .await;

    match joined {
        Ok(Ok(reply)) => (StatusCode::OK, Json(reply)).into_response(),
        Ok(Err(AssistantError::Model(err))) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        Ok(Err(AssistantError::Repository(err))) => repository_failure(err),
        Err(join_error) => {
            error!(error = %join_error, "assistant worker failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "assistant worker failed")
        }
    }
}
