//! Local llama-server processor

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::prompt::{self, ANALYSIS_PROMPT};
use super::repair;
use super::traits::{GenerationConfig, Processor, ProcessorError, ProcessorResult};
use crate::record::StructuredResult;
use crate::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_MODEL_ALIAS: &str = "llama-2-7b-chat";
const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Processor backed by a locally served model (llama.cpp server).
///
/// Same contract and repair/normalize path as the remote variant;
/// only the transport and the `describe_model` payload differ.
pub struct LocalModelProcessor {
    base_url: String,
    http_client: Client,
    model_alias: String,
    generation: GenerationConfig,
    retry: RetryPolicy,
    timeout_ms: u64,
}

impl LocalModelProcessor {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: Client::new(),
            model_alias: DEFAULT_MODEL_ALIAS.to_string(),
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model_alias(mut self, alias: impl Into<String>) -> Self {
        self.model_alias = alias.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn call_backend(&self, prompt: &str) -> ProcessorResult<String> {
        let timeout = Duration::from_millis(self.timeout_ms);
        match tokio::time::timeout(timeout, self.request(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ProcessorError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
        }
    }

    async fn request(&self, prompt: &str) -> ProcessorResult<String> {
        let body = CompletionRequest {
            prompt: prompt.to_string(),
            temperature: self.generation.temperature,
            top_p: self.generation.top_p,
            top_k: self.generation.top_k,
            n_predict: self.generation.max_output_tokens,
        };

        let url = format!("{}/completion", self.base_url);
        let response = self.http_client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProcessorError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let reply: CompletionReply = response.json().await?;
        Ok(reply.content)
    }
}

impl Default for LocalModelProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    prompt: String,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    n_predict: u32,
}

#[derive(Deserialize)]
struct CompletionReply {
    content: String,
}

#[async_trait]
impl Processor for LocalModelProcessor {
    fn name(&self) -> &str {
        "local"
    }

    async fn process(&self, text: &str) -> ProcessorResult<StructuredResult> {
        let prompt = prompt::render(ANALYSIS_PROMPT, text);
        let raw = self
            .retry
            .run("local completion", || self.call_backend(&prompt))
            .await?;

        tracing::debug!(processor = self.name(), bytes = raw.len(), "raw reply received");

        let fields = repair::extract_object(&raw)?;
        repair::normalize(fields)
    }

    fn describe_model(&self) -> serde_json::Value {
        json!({
            "model_alias": self.model_alias,
            "backend": "llama-server",
            "endpoint": self.base_url,
            "temperature": self.generation.temperature,
            "top_p": self.generation.top_p,
            "top_k": self.generation.top_k,
            "max_output_tokens": self.generation.max_output_tokens,
        })
    }

    async fn health_check(&self) -> ProcessorResult<bool> {
        let url = format!("{}/health", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
