//! Layered configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. optional TOML file (`FACT_PIPELINE_CONFIG`, default `config.toml`)
//! 3. environment, e.g. `FACT_PIPELINE__LLM__MODEL=gemini-2.5-flash`

use crate::error::{Error, Result};
use crate::facts::FactStoreConfig;
use crate::llm::LlmConfig;
use crate::pipeline::{PipelineConfig, SourceConfig, ValidationConfig};
use serde::Deserialize;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "FACT_PIPELINE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const ENV_PREFIX: &str = "FACT_PIPELINE";

/// Full application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub store: FactStoreConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Metrics output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Print the Prometheus text exposition to stdout after the run
    #[serde(default)]
    pub print_on_exit: bool,
}

impl Config {
    /// Load from `.env`, the config file named by `FACT_PIPELINE_CONFIG`, and the environment
    pub fn load() -> Result<Self> {
        // A missing .env is normal outside development
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&path)
    }

    /// Load from an optional TOML file plus environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(Self::environment())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("llm.model cannot be empty".to_string()));
        }
        if self.llm.api_url.trim().is_empty() {
            return Err(Error::Config("llm.api_url cannot be empty".to_string()));
        }
        if self.llm.timeout_ms == 0 {
            return Err(Error::Config("llm.timeout_ms must be positive".to_string()));
        }
        if self.source.document.trim().is_empty() {
            return Err(Error::Config("source.document cannot be empty".to_string()));
        }
        if self.validation.reference.trim().is_empty() {
            return Err(Error::Config("validation.reference cannot be empty".to_string()));
        }
        if self.pipeline.source_timeout_ms == 0 || self.pipeline.validation_timeout_ms == 0 {
            return Err(Error::Config("pipeline stage timeouts must be positive".to_string()));
        }

        // The source stage also fetches the document with the same request timeout
        let call_budget = self.llm.worst_case_duration();
        let source_budget = call_budget.saturating_add(self.llm.timeout());
        if source_budget > self.pipeline.source_timeout() {
            return Err(Error::Config(format!(
                "pipeline.source_timeout_ms ({:?}) is shorter than the document fetch plus LLM retry budget ({:?})",
                self.pipeline.source_timeout(),
                source_budget
            )));
        }
        if call_budget > self.pipeline.validation_timeout() {
            return Err(Error::Config(format!(
                "pipeline.validation_timeout_ms ({:?}) is shorter than the LLM retry budget ({:?})",
                self.pipeline.validation_timeout(),
                call_budget
            )));
        }

        if self.store.seed_facts.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::Config("store.seed_facts cannot contain blank entries".to_string()));
        }
        Ok(())
    }
}
