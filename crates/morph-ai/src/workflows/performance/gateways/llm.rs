use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;

/// Text-generation collaborator used for narrative summaries and assistant chat.
pub trait SummaryGenerator: Send + Sync {
    /// Summary completion with the bounded sampling options.
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Free-form assistant reply. Backends without separate chat settings reuse `generate`.
    fn converse(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Http(String),
    #[error("model request timed out after {0} seconds")]
    Timeout(u64),
    #[error("model returned an unreadable payload: {0}")]
    InvalidJson(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

const TEMPERATURE: f32 = 0.2;
const TOP_P: f32 = 0.95;
const MAX_NEW_TOKENS: u32 = 250;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Blocking client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaSummaryGenerator {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaSummaryGenerator {
    pub fn new(config: &ModelConfig) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| LlmError::Http(format!("failed to build client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn request(&self, prompt: &str, options: Option<GenerateOptions>) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            bounded = body.options.is_some(),
            "requesting generation"
        );

        let response = self.client.post(&url).json(&body).send().map_err(|err| {
            if err.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Http(format!("request to {url} failed: {err}"))
            }
        })?;

        if !response.status().is_success() {
            return Err(LlmError::Http(format!(
                "{url} responded with status {}",
                response.status()
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .map_err(|err| LlmError::InvalidJson(err.to_string()))?;

        let text = strip_prompt_echo(&payload.response, prompt);
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

fn summary_options() -> GenerateOptions {
    GenerateOptions {
        temperature: TEMPERATURE,
        top_p: TOP_P,
        num_predict: MAX_NEW_TOKENS,
    }
}

impl SummaryGenerator for OllamaSummaryGenerator {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.request(prompt, Some(summary_options()))
    }

    /// Chat replies use the model's own defaults, with no token cap.
    fn converse(&self, prompt: &str) -> Result<String, LlmError> {
        self.request(prompt, None)
    }
}

/// Removes a verbatim copy of the prompt some models prepend to their completion.
fn strip_prompt_echo(response: &str, prompt: &str) -> String {
    let trimmed_prompt = prompt.trim();
    if !trimmed_prompt.is_empty() && response.contains(trimmed_prompt) {
        response.replace(trimmed_prompt, "").trim().to_string()
    } else {
        response.trim().to_string()
    }
}

/// Generator that always declines, forcing the deterministic summary path.
#[derive(Debug, Clone, Default)]
pub struct DisabledSummaryGenerator;

impl SummaryGenerator for DisabledSummaryGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Unavailable(
            "text generation disabled for this run".to_string(),
        ))
    }
}
