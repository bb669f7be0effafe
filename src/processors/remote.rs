//! Remote hosted-model processor (generateContent-style API)

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

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-pro";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Processor backed by a hosted generateContent API.
///
/// One network call per [`process`](Processor::process); the retry
/// policy wraps the backend call only, never repair/normalization.
pub struct RemoteModelProcessor {
    api_key: String,
    base_url: String,
    http_client: Client,
    model: String,
    generation: GenerationConfig,
    retry: RetryPolicy,
    timeout_ms: u64,
}

impl RemoteModelProcessor {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Create from an environment variable holding the API key.
    pub fn from_env(api_key_env: &str) -> ProcessorResult<Self> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| ProcessorError::Config(format!("{api_key_env} not set")))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
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
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationSettings::from(&self.generation),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(error) => error.to_string(),
            };
            return Err(ProcessorError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            // The hosted API returns an empty candidate set under load
            // or safety filtering; treat it as transient.
            return Err(ProcessorError::Backend {
                status: status.as_u16(),
                message: "reply contained no candidates".to_string(),
            });
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationSettings,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl Processor for RemoteModelProcessor {
    fn name(&self) -> &str {
        "remote"
    }

    async fn process(&self, text: &str) -> ProcessorResult<StructuredResult> {
        let prompt = prompt::render(ANALYSIS_PROMPT, text);
        let raw = self
            .retry
            .run("remote generate", || self.call_backend(&prompt))
            .await?;

        tracing::debug!(processor = self.name(), bytes = raw.len(), "raw reply received");

        let fields = repair::extract_object(&raw)?;
        repair::normalize(fields)
    }

    fn describe_model(&self) -> serde_json::Value {
        json!({
            "model_name": self.model,
            "backend": "hosted-api",
            "temperature": self.generation.temperature,
            "top_p": self.generation.top_p,
            "top_k": self.generation.top_k,
            "max_output_tokens": self.generation.max_output_tokens,
        })
    }

    async fn health_check(&self) -> ProcessorResult<bool> {
        match self.call_backend("Reply with the word ok.").await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
