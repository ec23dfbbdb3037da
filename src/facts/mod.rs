//! Facts and the in-memory fact store
//!
//! - `Fact`: trimmed, non-empty single-sentence claim
//! - `ValidationVerdict`: parsed classifier answer
//! - `FactStore`: ordered, append-only, lock-protected collection

pub mod models;
pub mod store;

pub use models::{Fact, ValidationVerdict};
pub use store::{FactStore, FactStoreConfig};
