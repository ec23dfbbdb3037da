//! Single-pass generate → validate → commit controller

use super::source::FactSource;
use super::validator::FactValidator;
use crate::error::{EmptyStoreError, PipelineError, SourceError, ValidationError};
use crate::facts::{Fact, FactStore, ValidationVerdict};
use crate::metrics::METRICS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deadline for the source stage in milliseconds
    #[serde(default = "default_stage_timeout_ms")]
    pub source_timeout_ms: u64,

    /// Deadline for the validation stage in milliseconds
    #[serde(default = "default_stage_timeout_ms")]
    pub validation_timeout_ms: u64,

    /// Attach a known fact to rejected runs
    #[serde(default)]
    pub fallback_on_reject: bool,
}

fn default_stage_timeout_ms() -> u64 {
    60_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_timeout_ms: default_stage_timeout_ms(),
            validation_timeout_ms: default_stage_timeout_ms(),
            fallback_on_reject: false,
        }
    }
}

impl PipelineConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }
}

/// Controller states for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Generated,
    Validated,
    Committed,
    Rejected,
    Done,
    Failed,
}

/// How a completed run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed,
    Rejected,
}

impl CommitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitOutcome::Committed => "committed",
            CommitOutcome::Rejected => "rejected",
        }
    }
}

/// Result of a run that reached Done
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub outcome: CommitOutcome,
    pub fact: Fact,
    pub verdict: ValidationVerdict,
    /// Store length after the commit step
    pub store_len: usize,
    /// Known fact sampled for a rejected run, when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fact>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Sequences source, validator, and store for one pass
pub struct PipelineController {
    source: Arc<dyn FactSource>,
    validator: Arc<dyn FactValidator>,
    store: Arc<FactStore>,
    config: PipelineConfig,
}

impl PipelineController {
    pub fn new(
        source: Arc<dyn FactSource>,
        validator: Arc<dyn FactValidator>,
        store: Arc<FactStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            validator,
            store,
            config,
        }
    }

    /// Get reference to configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The store this controller commits to
    pub fn store(&self) -> &Arc<FactStore> {
        &self.store
    }

    /// Run the pipeline exactly once
    ///
    /// A stage failure ends the run in `Failed` and is returned as the
    /// error; the store is only mutated on a valid verdict.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let mut state = PipelineState::Start;

        info!(%run_id, "Starting fact pipeline run");

        let result = self.execute(run_id, &mut state).await;

        match result {
            Ok((fact, verdict)) => {
                let outcome = self.commit(run_id, &mut state, &fact, verdict);
                self.store.log_known_facts();
                advance(run_id, &mut state, PipelineState::Done);

                let fallback = match outcome {
                    CommitOutcome::Rejected if self.config.fallback_on_reject => {
                        self.safe_fact().ok()
                    }
                    _ => None,
                };

                METRICS.record_run(outcome.as_str());

                Ok(PipelineReport {
                    run_id,
                    outcome,
                    fact,
                    verdict,
                    store_len: self.store.len(),
                    fallback,
                    started_at,
                    elapsed: start.elapsed(),
                })
            }
            Err(e) => {
                advance(run_id, &mut state, PipelineState::Failed);
                error!(%run_id, stage = e.stage(), "Pipeline run failed: {}", e);
                METRICS.record_run("failed");
                Err(e)
            }
        }
    }

    /// A fact sampled from the store, without validation
    pub fn safe_fact(&self) -> Result<Fact, EmptyStoreError> {
        self.store.sample_random()
    }

    async fn execute(
        &self,
        run_id: Uuid,
        state: &mut PipelineState,
    ) -> Result<(Fact, ValidationVerdict), PipelineError> {
        let source_timeout = self.config.source_timeout();
        let fact = crate::time_operation!(
            METRICS.stage_duration,
            "source",
            timeout(source_timeout, self.source.produce()).await
        )
        .map_err(|_| {
            SourceError::UpstreamFailure(format!("timed out after {:?}", source_timeout))
        })??;
        advance(run_id, state, PipelineState::Generated);

        let validation_timeout = self.config.validation_timeout();
        let verdict = crate::time_operation!(
            METRICS.stage_duration,
            "validation",
            timeout(validation_timeout, self.validator.validate(&fact)).await
        )
        .map_err(|_| {
            ValidationError::UpstreamFailure(format!("timed out after {:?}", validation_timeout))
        })??;
        advance(run_id, state, PipelineState::Validated);

        Ok((fact, verdict))
    }

    fn commit(
        &self,
        run_id: Uuid,
        state: &mut PipelineState,
        fact: &Fact,
        verdict: ValidationVerdict,
    ) -> CommitOutcome {
        if verdict.is_valid() {
            self.store.append(fact.clone());
            advance(run_id, state, PipelineState::Committed);
            info!(%run_id, "New fact added: {}", fact);
            CommitOutcome::Committed
        } else {
            advance(run_id, state, PipelineState::Rejected);
            warn!(%run_id, "Fact rejected by validator: {}", fact);
            CommitOutcome::Rejected
        }
    }
}

fn advance(run_id: Uuid, state: &mut PipelineState, next: PipelineState) {
    debug!(%run_id, "Pipeline state {:?} -> {:?}", state, next);
    *state = next;
}
