//! Fact pipeline stages exposed as tools

use super::{required_str, Tool, ToolError};
use crate::facts::{Fact, FactStore};
use crate::pipeline::{FactSource, FactValidator};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

fn fact_input(input: &Value) -> Result<Fact, ToolError> {
    let text = required_str(input, "fact")?;
    Fact::new(text).ok_or_else(|| ToolError::Invalid("fact is blank".to_string()))
}

/// Produce a candidate fact from the configured source
pub struct GetFactTool {
    source: Arc<dyn FactSource>,
}

impl GetFactTool {
    pub fn new(source: Arc<dyn FactSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetFactTool {
    fn name(&self) -> &'static str {
        "get_fact"
    }

    fn description(&self) -> &'static str {
        "Gets a single one-sentence fact about the subject from the source document"
    }

    async fn invoke(&self, _input: Value) -> Result<Value, ToolError> {
        let fact = self
            .source
            .produce()
            .await
            .map_err(|e| ToolError::Failed(e.to_string()))?;
        Ok(json!({ "status": "success", "fact": fact }))
    }
}

/// Check a fact against the reference source
pub struct ValidateFactTool {
    validator: Arc<dyn FactValidator>,
}

impl ValidateFactTool {
    pub fn new(validator: Arc<dyn FactValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl Tool for ValidateFactTool {
    fn name(&self) -> &'static str {
        "validate_fact"
    }

    fn description(&self) -> &'static str {
        "Validates that the given fact is an actual fact about the subject and not made up"
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let fact = fact_input(&input)?;
        let verdict = self
            .validator
            .validate(&fact)
            .await
            .map_err(|e| ToolError::Failed(e.to_string()))?;
        Ok(json!({ "status": "success", "fact_is_valid": verdict.is_valid() }))
    }
}

/// Append a fact to the store
pub struct AddFactTool {
    store: Arc<FactStore>,
}

impl AddFactTool {
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddFactTool {
    fn name(&self) -> &'static str {
        "add_fact"
    }

    fn description(&self) -> &'static str {
        "Adds a validated fact to the known facts"
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let fact = fact_input(&input)?;
        info!("New fact added: {}", fact);
        self.store.append(fact.clone());
        Ok(json!({ "status": "success", "fact": fact, "known_facts": self.store.len() }))
    }
}

/// Return a known fact picked at random
pub struct GetSafeFactTool {
    store: Arc<FactStore>,
}

impl GetSafeFactTool {
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetSafeFactTool {
    fn name(&self) -> &'static str {
        "get_safe_fact"
    }

    fn description(&self) -> &'static str {
        "Returns a fact from the known facts, which are already validated"
    }

    async fn invoke(&self, _input: Value) -> Result<Value, ToolError> {
        let fact = self
            .store
            .sample_random()
            .map_err(|e| ToolError::Failed(e.to_string()))?;
        Ok(json!({ "status": "success", "fact": fact }))
    }
}

/// Log and return the known facts
pub struct LogInfoTool {
    store: Arc<FactStore>,
}

impl LogInfoTool {
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for LogInfoTool {
    fn name(&self) -> &'static str {
        "log_info"
    }

    fn description(&self) -> &'static str {
        "Logs the current list of known facts"
    }

    async fn invoke(&self, _input: Value) -> Result<Value, ToolError> {
        self.store.log_known_facts();
        Ok(json!({ "status": "success", "known_facts": self.store.snapshot() }))
    }
}
