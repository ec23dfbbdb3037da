//! Candidate fact generation

use crate::documents::{DocumentError, DocumentStore};
use crate::error::SourceError;
use crate::facts::Fact;
use crate::llm::TextGenerator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Produces one candidate fact per call
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn produce(&self) -> Result<Fact, SourceError>;
}

/// Fact source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path or URL of the source document
    #[serde(default = "default_document")]
    pub document: String,

    /// Directory that relative document paths resolve against
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Instruction sent with the document
    #[serde(default = "default_instruction")]
    pub instruction: String,
}

fn default_document() -> String {
    "interview.txt".to_string()
}

fn default_base_dir() -> String {
    ".".to_string()
}

fn default_instruction() -> String {
    "This file is a transcript of an interview between an interviewer and the musician \
    Taylor Swift. From this interview get a single fact that is 1 sentence long. \
    Only return the fact. Do not include any markup in the response."
        .to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            document: default_document(),
            base_dir: default_base_dir(),
            instruction: default_instruction(),
        }
    }
}

/// Generates a fact from a document through a text generator
pub struct DocumentFactSource {
    documents: Arc<dyn DocumentStore>,
    generator: Arc<dyn TextGenerator>,
    document_ref: String,
    instruction: String,
}

impl DocumentFactSource {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        document_ref: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            documents,
            generator,
            document_ref: document_ref.into(),
            instruction: instruction.into(),
        }
    }

    pub fn from_config(
        documents: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        config: &SourceConfig,
    ) -> Self {
        Self::new(documents, generator, &config.document, &config.instruction)
    }
}

#[async_trait]
impl FactSource for DocumentFactSource {
    async fn produce(&self) -> Result<Fact, SourceError> {
        let document = self
            .documents
            .fetch(&self.document_ref)
            .await
            .map_err(|e| match e {
                DocumentError::NotFound(what) => SourceError::NotFound(what),
                other => SourceError::UpstreamFailure(other.to_string()),
            })?;

        let text = self
            .generator
            .generate(&document, &self.instruction)
            .await
            .map_err(|e| SourceError::UpstreamFailure(e.to_string()))?;

        match Fact::new(text) {
            Some(fact) => {
                debug!("Generated fact from {}: {}", self.document_ref, fact);
                Ok(fact)
            }
            None => {
                warn!("Generator returned an empty response for {}", self.document_ref);
                Err(SourceError::UpstreamFailure("empty generation response".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::llm::LlmError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticDocuments(Option<&'static str>);

    #[async_trait]
    impl DocumentStore for StaticDocuments {
        async fn fetch(&self, reference: &str) -> Result<Document, DocumentError> {
            match self.0 {
                Some(content) => Ok(Document {
                    reference: reference.to_string(),
                    content: content.to_string(),
                }),
                None => Err(DocumentError::NotFound(reference.to_string())),
            }
        }
    }

    struct ScriptedGenerator {
        reply: Result<String, LlmError>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(reply: Result<&str, LlmError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _document: &Document, _instruction: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn source(docs: Option<&'static str>, generator: Arc<ScriptedGenerator>) -> DocumentFactSource {
        DocumentFactSource::new(
            Arc::new(StaticDocuments(docs)),
            generator,
            "interview.txt",
            "Get a fact.",
        )
    }

    #[tokio::test]
    async fn test_produce_trims_generated_fact() {
        let generator = Arc::new(ScriptedGenerator::new(Ok(" She owns a record label\n")));
        let fact = source(Some("transcript"), generator).produce().await.unwrap();
        assert_eq!(fact.as_str(), "She owns a record label");
    }

    #[tokio::test]
    async fn test_missing_document_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::new(Ok("unused")));
        let err = source(None, generator.clone()).produce().await.unwrap_err();

        assert_eq!(err, SourceError::NotFound("interview.txt".to_string()));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generator_failure_is_upstream_failure() {
        let generator = Arc::new(ScriptedGenerator::new(Err(LlmError::Timeout("30s".to_string()))));
        let err = source(Some("transcript"), generator).produce().await.unwrap_err();
        assert!(matches!(err, SourceError::UpstreamFailure(_)));
    }

    #[tokio::test]
    async fn test_empty_generation_is_upstream_failure() {
        let generator = Arc::new(ScriptedGenerator::new(Ok("   ")));
        let err = source(Some("transcript"), generator).produce().await.unwrap_err();
        assert_eq!(
            err,
            SourceError::UpstreamFailure("empty generation response".to_string())
        );
    }
}
