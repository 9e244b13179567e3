use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::ingest::DatasetImportError;
use crate::workflows::performance::{
    ExportError, LlmError, PipelineError, RepositoryError, SentimentError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Import(DatasetImportError),
    Pipeline(PipelineError),
    Repository(RepositoryError),
    Export(ExportError),
    Model(LlmError),
    Sentiment(SentimentError),
    Runtime(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Pipeline(err) => write!(f, "evaluation error: {}", err),
            AppError::Repository(err) => write!(f, "store error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Model(err) => write!(f, "model error: {}", err),
            AppError::Sentiment(err) => write!(f, "sentiment error: {}", err),
            AppError::Runtime(message) => write!(f, "runtime error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Model(err) => Some(err),
            AppError::Sentiment(err) => Some(err),
            AppError::Runtime(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Import(_) | AppError::Pipeline(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Repository(_)
            | AppError::Export(_)
            | AppError::Model(_)
            | AppError::Sentiment(_)
            | AppError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DatasetImportError> for AppError {
    fn from(value: DatasetImportError) -> Self {
        Self::Import(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<LlmError> for AppError {
    fn from(value: LlmError) -> Self {
        Self::Model(value)
    }
}

impl From<SentimentError> for AppError {
    fn from(value: SentimentError) -> Self {
        Self::Sentiment(value)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Runtime(value.to_string())
    }
}
