//! Upstream language-model services
//!
//! The pipeline only sees two narrow capabilities:
//! - `TextGenerator`: document + instruction in, free text out
//! - `FactClassifier`: claim + reference in, verdict text out
//!
//! `ChatCompletionsClient` implements both against an OpenAI-compatible
//! chat-completions endpoint.

pub mod circuit_breaker;
pub mod client;
pub mod config;

pub use circuit_breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
pub use client::ChatCompletionsClient;
pub use config::LlmConfig;

use crate::documents::Document;
use async_trait::async_trait;

/// Upstream LLM error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("LLM integration is disabled")]
    Disabled,

    #[error("Circuit breaker is open: {0}")]
    CircuitOpen(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: status {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RequestFailed(_) | LlmError::Timeout(_) => true,
            LlmError::UpstreamError { status, .. } => *status == 429 || *status >= 500,
            LlmError::Disabled | LlmError::CircuitOpen(_) | LlmError::InvalidResponse(_) => false,
        }
    }
}

/// Generates free text from a document and an instruction
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, document: &Document, instruction: &str) -> Result<String, LlmError>;
}

/// Classifies a claim against a named reference source
#[async_trait]
pub trait FactClassifier: Send + Sync {
    /// Returns the raw verdict text, expected to be "true" or "false"
    async fn classify(&self, claim: &str, reference: &str) -> Result<String, LlmError>;
}
