//! The generate → validate → commit fact pipeline

pub mod controller;
pub mod source;
pub mod validator;

pub use controller::{CommitOutcome, PipelineConfig, PipelineController, PipelineReport, PipelineState};
pub use source::{DocumentFactSource, FactSource, SourceConfig};
pub use validator::{FactValidator, ReferenceFactValidator, ValidationConfig};
