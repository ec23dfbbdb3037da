//! Agent-callable tools
//!
//! Each tool takes a JSON object and answers with a JSON object tagged by
//! `status`: `{"status": "success", ...}` or
//! `{"status": "error", "error_message": "..."}`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub mod facts;
pub mod time;
pub mod weather;

pub use facts::{AddFactTool, GetFactTool, GetSafeFactTool, LogInfoTool, ValidateFactTool};
pub use time::CurrentTimeTool;
pub use weather::WeatherTool;

use crate::facts::FactStore;
use crate::pipeline::{FactSource, FactValidator};

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Unknown tool: {0}")]
    Unknown(String),

    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// Error response in the tool wire format
    pub fn to_response(&self) -> Value {
        json!({ "status": "error", "error_message": self.to_string() })
    }
}

/// Tool trait for agent-invoked operations
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must be unique)
    fn name(&self) -> &'static str;

    /// Tool description
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Execute the tool; the returned value carries `"status": "success"`
    async fn invoke(&self, input: Value) -> Result<Value, ToolError>;
}

/// Tool registry for managing available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the fact pipeline tools
    pub fn for_facts(
        source: Arc<dyn FactSource>,
        validator: Arc<dyn FactValidator>,
        store: Arc<FactStore>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GetFactTool::new(source)));
        registry.register(Arc::new(ValidateFactTool::new(validator)));
        registry.register(Arc::new(AddFactTool::new(store.clone())));
        registry.register(Arc::new(GetSafeFactTool::new(store.clone())));
        registry.register(Arc::new(LogInfoTool::new(store)));
        registry
    }

    /// Registry holding the weather and time lookups
    pub fn lookups() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WeatherTool::new()));
        registry.register(Arc::new(CurrentTimeTool));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("Tool {} registered twice; keeping the latest", name);
        }
    }

    /// Move every tool from `other` into this registry
    pub fn merge(&mut self, other: ToolRegistry) {
        for tool in other.tools.into_values() {
            self.register(tool);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Registered tool names, sorted
    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Invoke a tool by name, folding errors into the wire format
    pub async fn call(&self, name: &str, input: Value) -> Value {
        debug!("Calling tool {}", name);

        let Some(tool) = self.get(name) else {
            return ToolError::Unknown(name.to_string()).to_response();
        };

        match tool.invoke(input).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                e.to_response()
            }
        }
    }
}

/// Read a required, non-blank string field from a tool input
pub(crate) fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::Invalid(format!("missing string field '{}'", key)))
}
