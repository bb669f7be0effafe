//! Processor trait definition and error taxonomy

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::record::StructuredResult;
use crate::retry::Retryable;

/// Error types for processor operations
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("malformed reply: no JSON object found")]
    MalformedResponse { raw: String },

    #[error("required field `{field}` missing from reply")]
    MissingField { field: &'static str },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Retryable for ProcessorError {
    /// Transport and backend failures are transient. Shape problems are
    /// not: the prompt is deterministic, so the same reply would come
    /// back malformed again.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorError::Http(_)
                | ProcessorError::Backend { .. }
                | ProcessorError::Timeout { .. }
        )
    }
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// Generation parameters biasing the backend toward literal JSON output
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

/// Trait for text-analysis processors
///
/// A processor wraps one model backend and turns free text into a
/// [`StructuredResult`] by prompting the backend, repairing its reply
/// into a JSON object, and normalizing the fields.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Origin tag for this processor (e.g. "remote", "local")
    fn name(&self) -> &str;

    /// Analyze a single text.
    async fn process(&self, text: &str) -> ProcessorResult<StructuredResult>;

    /// Analyze multiple texts independently.
    ///
    /// A failure on one item yields `None` for that item; the batch
    /// itself never fails as a whole.
    async fn batch_process(&self, texts: &[String]) -> Vec<Option<StructuredResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            match self.process(text).await {
                Ok(result) => results.push(Some(result)),
                Err(error) => {
                    tracing::warn!(
                        processor = self.name(),
                        index,
                        %error,
                        "batch item failed"
                    );
                    results.push(None);
                }
            }
        }
        results
    }

    /// Model configuration details for diagnostics and reports.
    fn describe_model(&self) -> serde_json::Value;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> ProcessorResult<bool>;
}
