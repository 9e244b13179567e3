use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::performance::EvaluationConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the evaluation service and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub model: ModelConfig,
    pub sentiment: SentimentConfig,
    pub evaluation: EvaluationConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let model = ModelConfig {
            endpoint: env_or("MODEL_ENDPOINT", DEFAULT_MODEL_ENDPOINT),
            model: env_or("MODEL_NAME", DEFAULT_MODEL_NAME),
            timeout_secs: timeout_from_env("MODEL_TIMEOUT_SECS", 60)?,
        };

        let backend = match env::var("SENTIMENT_BACKEND") {
            Ok(raw) => SentimentBackend::parse(&raw)
                .ok_or(ConfigError::InvalidSentimentBackend { value: raw })?,
            Err(_) => SentimentBackend::HuggingFace,
        };
        let sentiment = SentimentConfig {
            backend,
            endpoint: env_or("SENTIMENT_ENDPOINT", DEFAULT_SENTIMENT_ENDPOINT),
            model: env_or("SENTIMENT_MODEL", DEFAULT_SENTIMENT_MODEL),
            api_token: env::var("SENTIMENT_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            timeout_secs: timeout_from_env("SENTIMENT_TIMEOUT_SECS", 20)?,
        };

        let mut evaluation = EvaluationConfig::default();
        if let Some(value) = threshold_from_env("STRESS_THRESHOLD")? {
            evaluation.sentiment.stress_threshold = value;
        }
        if let Some(value) = threshold_from_env("CONFLICT_THRESHOLD")? {
            evaluation.sentiment.conflict_threshold = value;
        }

        let store = StoreConfig {
            path: PathBuf::from(env_or("SUMMARY_STORE_PATH", DEFAULT_STORE_PATH)),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            model,
            sentiment,
            evaluation,
            store,
        })
    }
}

const DEFAULT_MODEL_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_MODEL_NAME: &str = "granite3.3:2b";
const DEFAULT_SENTIMENT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_SENTIMENT_MODEL: &str = "tabularisai/multilingual-sentiment-analysis";
const DEFAULT_STORE_PATH: &str = "data/summaries.json";

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn timeout_from_env(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidTimeout { key }),
        },
        Err(_) => Ok(default),
    }
}

fn threshold_from_env(key: &'static str) -> Result<Option<f64>, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidThreshold { key, value: raw.clone() })?;

    if !(-1.0..0.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold { key, value: raw });
    }

    Ok(Some(value))
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Text-generation backend used for narrative summaries and chat replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackend {
    /// Sequence-classification model served over an inference endpoint.
    HuggingFace,
    /// Sentiment obtained by prompting the text-generation model.
    Prompted,
}

impl SentimentBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" | "local" => Some(Self::HuggingFace),
            "prompted" | "llm" | "remote" => Some(Self::Prompted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentConfig {
    pub backend: SentimentBackend,
    pub endpoint: String,
    pub model: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

/// Location of the persisted summary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout { key: &'static str },
    InvalidThreshold { key: &'static str, value: String },
    InvalidSentimentBackend { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout { key } => {
                write!(f, "{key} must be a positive number of seconds")
            }
            ConfigError::InvalidThreshold { key, value } => write!(
                f,
                "{key} must be a number in [-1, 0), got '{}'",
                value.trim()
            ),
            ConfigError::InvalidSentimentBackend { value } => write!(
                f,
                "SENTIMENT_BACKEND must be 'huggingface' or 'prompted', got '{}'",
                value.trim()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout { .. }
            | ConfigError::InvalidThreshold { .. }
            | ConfigError::InvalidSentimentBackend { .. } => None,
        }
    }
}
