//! Configuration for the chat-completions client

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Chat-completions client configuration
///
/// Defaults target Gemini's OpenAI-compatible endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Enable/disable upstream calls globally
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Chat-completions endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; falls back to the variable named by `api_key_env`
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Max completion tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of retry attempts after the first failure
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Base backoff in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Circuit breaker failure threshold
    #[serde(default = "default_breaker_failures")]
    pub circuit_breaker_failures: usize,

    /// Circuit breaker reset timeout in seconds
    #[serde(default = "default_breaker_reset")]
    pub circuit_breaker_reset_secs: u64,
}

fn default_enabled() -> bool { true }
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions".to_string()
}
fn default_model() -> String { "gemini-2.5-flash-lite".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_timeout_ms() -> u64 { 10_000 }
fn default_max_tokens() -> u32 { 256 }
fn default_temperature() -> f32 { 0.2 }
fn default_retry_attempts() -> usize { 2 }
fn default_retry_backoff_ms() -> u64 { 200 }
fn default_breaker_failures() -> usize { 5 }
fn default_breaker_reset() -> u64 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            circuit_breaker_failures: default_breaker_failures(),
            circuit_breaker_reset_secs: default_breaker_reset(),
        }
    }
}

impl LlmConfig {
    /// API key from config, or from the configured environment variable
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::new)
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get circuit breaker reset timeout as Duration
    pub fn breaker_reset_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }

    /// Get retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Longest one call can take with every retry timing out
    ///
    /// `timeout * (retry_attempts + 1)` plus the backoff sleeps in between.
    pub fn worst_case_duration(&self) -> Duration {
        let attempts = u32::try_from(self.retry_attempts).unwrap_or(u32::MAX);
        let requests = self.timeout().saturating_mul(attempts.saturating_add(1));
        let backoff_units = 2_u32.saturating_pow(attempts).saturating_sub(1);
        requests.saturating_add(self.retry_backoff().saturating_mul(backoff_units))
    }
}
