//! In-memory fact store

use super::models::Fact;
use crate::error::EmptyStoreError;
use crate::metrics::METRICS;
use prometheus::IntGauge;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Facts store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactStoreConfig {
    /// Facts the store starts with
    #[serde(default = "default_seed_facts")]
    pub seed_facts: Vec<String>,
}

fn default_seed_facts() -> Vec<String> {
    vec![
        "She is born in 1989".to_string(),
        "She is an American".to_string(),
        "She has released over 10 albums".to_string(),
        "She owns her own record label".to_string(),
    ]
}

impl Default for FactStoreConfig {
    fn default() -> Self {
        Self {
            seed_facts: default_seed_facts(),
        }
    }
}

/// Ordered, append-only collection of accepted facts
///
/// Facts are kept in insertion order. Duplicates are allowed. A single
/// lock guards the sequence so one store can be shared between runs.
pub struct FactStore {
    facts: RwLock<Vec<Fact>>,
    size_gauge: IntGauge,
}

impl Default for FactStore {
    fn default() -> Self {
        Self::with_seed(Vec::new())
    }
}

impl fmt::Debug for FactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactStore")
            .field("facts", &*self.read())
            .finish_non_exhaustive()
    }
}

impl FactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given facts in order
    pub fn with_seed(seed: impl IntoIterator<Item = Fact>) -> Self {
        Self::with_gauge(seed, METRICS.store_size.clone())
    }

    /// Shared constructor; sets the size gauge to the seed length
    fn with_gauge(seed: impl IntoIterator<Item = Fact>, size_gauge: IntGauge) -> Self {
        let facts: Vec<Fact> = seed.into_iter().collect();
        size_gauge.set(facts.len() as i64);
        Self {
            facts: RwLock::new(facts),
            size_gauge,
        }
    }

    /// Create a store from configuration, skipping blank seed entries
    pub fn from_config(config: &FactStoreConfig) -> Self {
        Self::with_seed(config.seed_facts.iter().filter_map(|s| Fact::new(s.as_str())))
    }

    /// Append a fact to the end of the sequence
    pub fn append(&self, fact: Fact) {
        let mut facts = self.write();
        debug!("Appending fact #{}: {}", facts.len() + 1, fact);
        facts.push(fact);
        self.size_gauge.set(facts.len() as i64);
    }

    /// Return a uniformly random fact
    pub fn sample_random(&self) -> Result<Fact, EmptyStoreError> {
        let facts = self.read();
        facts
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(EmptyStoreError)
    }

    /// Copy of the current contents, in order
    pub fn snapshot(&self) -> Vec<Fact> {
        self.read().clone()
    }

    /// Emit the current contents to the log
    pub fn log_known_facts(&self) {
        let facts = self.read();
        let listed: Vec<&str> = facts.iter().map(Fact::as_str).collect();
        info!(count = facts.len(), "Known facts are: {:?}", listed);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock still holds a consistent Vec: every mutation is a single push.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Fact>> {
        self.facts.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Fact>> {
        self.facts.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fact(text: &str) -> Fact {
        Fact::new(text).unwrap()
    }

    #[test]
    fn test_default_seed() {
        let store = FactStore::from_config(&FactStoreConfig::default());
        assert_eq!(store.len(), 4);
        assert_eq!(store.snapshot()[0].as_str(), "She is born in 1989");
    }

    #[test]
    fn test_blank_seed_entries_skipped() {
        let config = FactStoreConfig {
            seed_facts: vec!["She is an American".to_string(), "  ".to_string()],
        };
        let store = FactStore::from_config(&config);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_is_last_in_snapshot() {
        let store = FactStore::with_seed(vec![fact("She is born in 1989")]);
        store.append(fact("She owns a record label"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.last().unwrap().as_str(), "She owns a record label");
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let store = FactStore::new();
        store.append(fact("She is an American"));
        store.append(fact("She is an American"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sample_random_returns_member() {
        let store = FactStore::with_seed(vec![
            fact("She is born in 1989"),
            fact("She is an American"),
            fact("She owns her own record label"),
        ]);
        let snapshot = store.snapshot();

        for _ in 0..50 {
            let sampled = store.sample_random().unwrap();
            assert!(snapshot.contains(&sampled));
        }
    }

    #[test]
    fn test_sample_random_empty_store() {
        let store = FactStore::new();
        assert!(store.is_empty());
        assert_eq!(store.sample_random(), Err(EmptyStoreError));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = FactStore::with_seed(vec![fact("She is born in 1989")]);
        let before = store.snapshot();
        store.append(fact("She is an American"));
        assert_eq!(before.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_store_resets_size_gauge() {
        let gauge = IntGauge::new("test_fact_store_size", "store size").unwrap();
        gauge.set(7);

        let store = FactStore::with_gauge(Vec::new(), gauge.clone());
        assert_eq!(gauge.get(), 0);

        store.append(fact("She is an American"));
        assert_eq!(gauge.get(), 1);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = Arc::new(FactStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.append(fact(&format!("Fact {} from writer {}", j, i)));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 200);
    }
}
