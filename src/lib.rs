//! Sequential fact pipeline over language-model services
//!
//! One run generates a candidate fact from a source document, validates it
//! against a reference source, and appends it to an in-memory store when
//! the verdict is valid.

pub mod config;
pub mod documents;
pub mod error;
pub mod facts;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod tools;

pub use config::Config;
pub use error::{EmptyStoreError, Error, PipelineError, Result, SourceError, ValidationError};
pub use facts::{Fact, FactStore, ValidationVerdict};
pub use pipeline::{CommitOutcome, PipelineController, PipelineReport};

use documents::FsDocumentStore;
use llm::ChatCompletionsClient;
use pipeline::{DocumentFactSource, FactSource, FactValidator, ReferenceFactValidator};
use std::sync::Arc;
use tools::ToolRegistry;
use tracing::info;

/// A wired pipeline: controller, its store, and the matching tools
pub struct FactPipeline {
    pub controller: PipelineController,
    pub store: Arc<FactStore>,
    pub tools: ToolRegistry,
}

/// Build the pipeline and its collaborators from configuration
pub fn init_pipeline(config: &Config) -> Result<FactPipeline> {
    info!(
        "Initializing fact pipeline: model={}, document={}",
        config.llm.model, config.source.document
    );

    let client = Arc::new(ChatCompletionsClient::new(config.llm.clone())?);
    let documents = Arc::new(
        FsDocumentStore::new(&config.source.base_dir, config.llm.timeout())
            .map_err(|e| Error::Internal(e.to_string()))?,
    );

    let source: Arc<dyn FactSource> = Arc::new(DocumentFactSource::from_config(
        documents,
        client.clone(),
        &config.source,
    ));
    let validator: Arc<dyn FactValidator> = Arc::new(ReferenceFactValidator::from_config(
        client,
        &config.validation,
    ));
    let store = Arc::new(FactStore::from_config(&config.store));

    let mut tools = ToolRegistry::for_facts(source.clone(), validator.clone(), store.clone());
    tools.merge(ToolRegistry::lookups());
    let controller = PipelineController::new(source, validator, store.clone(), config.pipeline.clone());

    info!("Fact pipeline initialized with {} known facts", store.len());

    Ok(FactPipeline {
        controller,
        store,
        tools,
    })
}
