//! Error types for the fact pipeline

use thiserror::Error;

/// Crate-level result for initialisation and wiring paths
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or building components
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM client error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Failure to produce a candidate fact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Source document not found: {0}")]
    NotFound(String),

    #[error("Fact generation failed: {0}")]
    UpstreamFailure(String),
}

/// Failure to obtain a verdict for a candidate fact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Fact validation failed: {0}")]
    UpstreamFailure(String),

    #[error("Unparsable verdict: {0:?}")]
    UnparsableVerdict(String),
}

/// Sampling was attempted on a store with no facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Fact store is empty")]
pub struct EmptyStoreError;

/// A pipeline run that ended in the Failed state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    /// Stage that failed, used as a metrics label
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Source(_) => "source",
            PipelineError::Validation(_) => "validation",
        }
    }
}
