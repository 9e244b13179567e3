//! Outbound collaborators: the text-generation model and the sentiment classifier.

pub mod llm;
pub mod sentiment;

pub use llm::{DisabledSummaryGenerator, LlmError, OllamaSummaryGenerator, SummaryGenerator};
pub use sentiment::{
    classifier_from_config, HuggingFaceSentimentClassifier, PromptedSentimentClassifier,
    SentimentClassifier, SentimentError,
};
