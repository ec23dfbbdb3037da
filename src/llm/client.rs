//! Chat-completions client with retry, timeout, and circuit breaker

use super::circuit_breaker::{BreakerStats, CircuitBreaker, CircuitBreakerConfig};
use super::config::LlmConfig;
use super::{FactClassifier, LlmError, TextGenerator};
use crate::documents::Document;
use crate::metrics::METRICS;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

const GENERATE: &str = "generate";
const CLASSIFY: &str = "classify";

/// OpenAI-compatible chat-completions client
pub struct ChatCompletionsClient {
    http: Client,
    config: LlmConfig,
    api_key: Option<SecretString>,
    breaker: CircuitBreaker,
}

impl ChatCompletionsClient {
    /// Create a new client
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!(
                "No API key configured (checked llm.api_key and ${}); requests are sent unauthenticated",
                config.api_key_env
            );
        }

        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: config.circuit_breaker_failures,
            reset_timeout: config.breaker_reset_timeout(),
        });

        Ok(Self {
            http,
            config,
            api_key,
            breaker,
        })
    }

    /// Send one prompt and return the first choice's content
    ///
    /// Retryable failures are retried with exponential backoff up to
    /// `retry_attempts` times.
    async fn complete(&self, operation: &str, prompt: String) -> Result<String, LlmError> {
        let start = Instant::now();

        if !self.config.enabled {
            METRICS.record_llm_request(operation, "disabled");
            return Err(LlmError::Disabled);
        }

        if self.breaker.is_open(operation) {
            METRICS.record_llm_request(operation, "circuit_open");
            error!("Circuit breaker is open for {} operation", operation);
            return Err(LlmError::CircuitOpen(operation.to_string()));
        }

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let mut attempt = 0;
        let text = loop {
            attempt += 1;

            match self.call_api(&request).await {
                Ok(text) => {
                    self.breaker.mark_success(operation);
                    METRICS.record_llm_request(operation, "success");
                    break text;
                }
                Err(e) => {
                    self.breaker.mark_failure(operation);
                    METRICS.record_llm_request(operation, "error");

                    if !e.is_retryable() || attempt > self.config.retry_attempts {
                        error!("{} failed after {} attempts: {}", operation, attempt, e);
                        return Err(e);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        "{} attempt {} failed: {}, retrying in {:?}",
                        operation, attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        };

        METRICS
            .llm_request_duration
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());

        Ok(text)
    }

    async fn call_api(&self, request: &ChatCompletionRequest) -> Result<String, LlmError> {
        debug!("Calling chat completions: model={}", request.model);

        let mut req = self.http.post(&self.config.api_url).json(request);

        if let Some(api_key) = &self.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(e.to_string())
            } else {
                LlmError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }

    /// Calculate exponential backoff
    fn calculate_backoff(&self, attempt: usize) -> Duration {
        let base = self.config.retry_backoff();
        let multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1) as u32);
        base.saturating_mul(multiplier)
    }

    /// Get circuit breaker statistics
    pub fn breaker_stats(&self, operation: &str) -> BreakerStats {
        self.breaker.stats(operation)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, document: &Document, instruction: &str) -> Result<String, LlmError> {
        debug!(
            "Generating from document {} ({} bytes)",
            document.reference,
            document.content.len()
        );

        let prompt = format!(
            "{}\n\n--- Document: {} ---\n{}",
            instruction, document.reference, document.content
        );
        self.complete(GENERATE, prompt).await
    }
}

#[async_trait]
impl FactClassifier for ChatCompletionsClient {
    async fn classify(&self, claim: &str, reference: &str) -> Result<String, LlmError> {
        let prompt = format!(
            "I have a fact that I want you to validate. Only use this reference to validate: {}\n\
            Only return 'true' or 'false'.\n\
            The fact is: {}",
            reference, claim
        );
        self.complete(CLASSIFY, prompt).await
    }
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
