use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::llm::{LlmError, SummaryGenerator};
use crate::config::{SentimentBackend, SentimentConfig};
use crate::workflows::performance::domain::{SentimentLabel, SentimentResult};

/// Texts shorter than this (after trimming) are neutral without a classifier call.
pub const MIN_CLASSIFIABLE_CHARS: usize = 5;

/// Free-text sentiment collaborator. Implementations return a neutral result for
/// empty or very short input instead of an error.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SentimentError {
    #[error("sentiment request failed: {0}")]
    Http(String),
    #[error("sentiment request timed out after {0} seconds")]
    Timeout(u64),
    #[error("sentiment backend returned an unusable response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Generator(#[from] LlmError),
}

fn too_short(text: &str) -> bool {
    text.trim().chars().count() < MIN_CLASSIFIABLE_CHARS
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferencePayload {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Failure { error: String },
}

impl InferencePayload {
    fn best(self) -> Result<LabelScore, SentimentError> {
        let candidates = match self {
            InferencePayload::Nested(batches) => batches.into_iter().flatten().collect(),
            InferencePayload::Flat(candidates) => candidates,
            InferencePayload::Failure { error } => {
                return Err(SentimentError::InvalidResponse(error))
            }
        };

        candidates
            .into_iter()
            .max_by(|left, right| {
                left.score
                    .partial_cmp(&right.score)
                    .unwrap_or(Ordering::Equal)
            })
            .ok_or_else(|| SentimentError::InvalidResponse("no labels returned".to_string()))
    }
}

/// Sequence-classification model served over a Hugging Face style inference endpoint.
pub struct HuggingFaceSentimentClassifier {
    client: reqwest::blocking::Client,
    url: String,
    api_token: Option<String>,
    timeout_secs: u64,
}

impl HuggingFaceSentimentClassifier {
    pub fn new(config: &SentimentConfig) -> Result<Self, SentimentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| SentimentError::Http(format!("failed to build client: {err}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.model.trim_start_matches('/')
            ),
            api_token: config.api_token.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

impl SentimentClassifier for HuggingFaceSentimentClassifier {
    fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        if too_short(text) {
            return Ok(SentimentResult::neutral());
        }

        let mut request = self.client.post(&self.url).json(&json!({ "inputs": text }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|err| {
            if err.is_timeout() {
                SentimentError::Timeout(self.timeout_secs)
            } else {
                SentimentError::Http(format!("request to {} failed: {err}", self.url))
            }
        })?;

        if !response.status().is_success() {
            return Err(SentimentError::Http(format!(
                "{} responded with status {}",
                self.url,
                response.status()
            )));
        }

        let payload: InferencePayload = response
            .json()
            .map_err(|err| SentimentError::InvalidResponse(err.to_string()))?;
        let best = payload.best()?;
        let label = SentimentLabel::parse(&best.label).ok_or_else(|| {
            SentimentError::InvalidResponse(format!("unknown label '{}'", best.label))
        })?;

        debug!(label = ?label, score = best.score, "classified survey answer");
        Ok(SentimentResult::normalized(label, best.score))
    }
}

/// Sentiment obtained by prompting a text-generation model for `label:` and `score:` lines.
pub struct PromptedSentimentClassifier {
    generator: Arc<dyn SummaryGenerator>,
}

impl PromptedSentimentClassifier {
    pub fn new(generator: Arc<dyn SummaryGenerator>) -> Self {
        Self { generator }
    }

    fn prompt(text: &str) -> String {
        format!(
            "Classify the sentiment of the following employee survey answer.\n\
             Reply with exactly two lines and nothing else:\n\
             label: <positive|negative|neutral>\n\
             score: <confidence between 0 and 1>\n\n\
             Answer: {}",
            text.trim()
        )
    }
}

impl SentimentClassifier for PromptedSentimentClassifier {
    fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        if too_short(text) {
            return Ok(SentimentResult::neutral());
        }

        let reply = self.generator.generate(&Self::prompt(text))?;
        parse_prompted_reply(&reply)
    }
}

pub(crate) fn parse_prompted_reply(reply: &str) -> Result<SentimentResult, SentimentError> {
    let mut label = None;
    let mut score = None;

    for line in reply.lines() {
        let line = line.trim().trim_start_matches(['-', '*']).trim();
        let lowered = line.to_ascii_lowercase();
        if let Some(value) = lowered.strip_prefix("label:") {
            label = SentimentLabel::parse(value);
        } else if let Some(value) = lowered.strip_prefix("score:") {
            score = value
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<f64>().ok());
        }
    }

    let label = label.ok_or_else(|| {
        SentimentError::InvalidResponse(format!("no label line in '{}'", reply.trim()))
    })?;
    let score = score.ok_or_else(|| {
        SentimentError::InvalidResponse(format!("no score line in '{}'", reply.trim()))
    })?;

    Ok(SentimentResult::normalized(label, score))
}

/// Builds the configured classifier backend. The prompted backend reuses `generator`.
pub fn classifier_from_config(
    config: &SentimentConfig,
    generator: Arc<dyn SummaryGenerator>,
) -> Result<Arc<dyn SentimentClassifier>, SentimentError> {
    match config.backend {
        SentimentBackend::HuggingFace => Ok(Arc::new(HuggingFaceSentimentClassifier::new(config)?)),
        SentimentBackend::Prompted => Ok(Arc::new(PromptedSentimentClassifier::new(generator))),
    }
}
