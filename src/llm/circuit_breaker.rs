//! Circuit breaker guarding the upstream LLM operations

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,   // Normal operation
    Open,     // Failing, reject requests
    HalfOpen, // Probing whether the service recovered
}

#[derive(Debug, Clone)]
struct BreakerEntry {
    state: BreakerState,
    failure_count: usize,
    last_failure: Option<Instant>,
    opened_at: Option<Instant>,
}

impl BreakerEntry {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            last_failure: None,
            opened_at: None,
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-operation circuit breaker
///
/// Each operation name (`generate`, `classify`) trips independently.
pub struct CircuitBreaker {
    breakers: Mutex<HashMap<String, BreakerEntry>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Check if the circuit is open for an operation
    ///
    /// An open circuit whose reset timeout has elapsed moves to half-open
    /// and lets the next call through.
    pub fn is_open(&self, operation: &str) -> bool {
        let mut breakers = self.lock();
        let entry = breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);

        match entry.state {
            BreakerState::Closed | BreakerState::HalfOpen => false,
            BreakerState::Open => match entry.opened_at {
                Some(opened_at) if opened_at.elapsed() >= self.config.reset_timeout => {
                    entry.state = BreakerState::HalfOpen;
                    false
                }
                _ => true,
            },
        }
    }

    /// Mark a successful operation
    pub fn mark_success(&self, operation: &str) {
        let mut breakers = self.lock();
        breakers.insert(operation.to_string(), BreakerEntry::new());
    }

    /// Mark a failed operation
    pub fn mark_failure(&self, operation: &str) {
        let mut breakers = self.lock();
        let entry = breakers
            .entry(operation.to_string())
            .or_insert_with(BreakerEntry::new);

        entry.failure_count += 1;
        entry.last_failure = Some(Instant::now());

        // A failed half-open probe reopens immediately
        if entry.state == BreakerState::HalfOpen
            || entry.failure_count >= self.config.failure_threshold
        {
            entry.state = BreakerState::Open;
            entry.opened_at = Some(Instant::now());
        }
    }

    /// Get the current state for an operation
    pub fn state(&self, operation: &str) -> BreakerState {
        self.lock()
            .get(operation)
            .map(|e| e.state)
            .unwrap_or(BreakerState::Closed)
    }

    /// Get statistics for an operation
    pub fn stats(&self, operation: &str) -> BreakerStats {
        match self.lock().get(operation) {
            Some(entry) => BreakerStats {
                state: entry.state,
                failure_count: entry.failure_count,
                last_failure: entry.last_failure,
            },
            None => BreakerStats {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure: None,
            },
        }
    }

    /// Reset a specific circuit breaker
    pub fn reset(&self, operation: &str) {
        self.lock().remove(operation);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BreakerEntry>> {
        self.breakers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

/// Circuit breaker statistics
#[derive(Debug, Clone)]
pub struct BreakerStats {
    pub state: BreakerState,
    pub failure_count: usize,
    pub last_failure: Option<Instant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: usize, reset: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            reset_timeout: reset,
        })
    }

    #[test]
    fn test_closed_by_default() {
        let breaker = CircuitBreaker::default();
        assert!(!breaker.is_open("generate"));
        assert_eq!(breaker.state("generate"), BreakerState::Closed);
    }

    #[test]
    fn test_opens_after_threshold() {
        let breaker = breaker(3, Duration::from_secs(30));

        breaker.mark_failure("classify");
        breaker.mark_failure("classify");
        assert!(!breaker.is_open("classify"));

        breaker.mark_failure("classify");
        assert!(breaker.is_open("classify"));
        assert_eq!(breaker.state("classify"), BreakerState::Open);
    }

    #[test]
    fn test_operations_trip_independently() {
        let breaker = breaker(1, Duration::from_secs(30));
        breaker.mark_failure("generate");

        assert!(breaker.is_open("generate"));
        assert!(!breaker.is_open("classify"));
    }

    #[test]
    fn test_success_resets() {
        let breaker = breaker(3, Duration::from_secs(30));
        breaker.mark_failure("generate");
        breaker.mark_failure("generate");
        breaker.mark_success("generate");

        let stats = breaker.stats("generate");
        assert_eq!(stats.state, BreakerState::Closed);
        assert_eq!(stats.failure_count, 0);
        assert!(stats.last_failure.is_none());
    }

    #[test]
    fn test_half_open_after_timeout() {
        let breaker = breaker(2, Duration::from_millis(50));
        breaker.mark_failure("generate");
        breaker.mark_failure("generate");
        assert!(breaker.is_open("generate"));

        std::thread::sleep(Duration::from_millis(80));

        assert!(!breaker.is_open("generate"));
        assert_eq!(breaker.state("generate"), BreakerState::HalfOpen);
    }

    #[test]
    fn test_failed_probe_reopens() {
        let breaker = breaker(2, Duration::from_millis(50));
        breaker.mark_failure("generate");
        breaker.mark_failure("generate");
        std::thread::sleep(Duration::from_millis(80));
        assert!(!breaker.is_open("generate"));

        breaker.mark_failure("generate");
        assert!(breaker.is_open("generate"));
    }

    #[test]
    fn test_reset() {
        let breaker = breaker(1, Duration::from_secs(30));
        breaker.mark_failure("classify");
        breaker.reset("classify");

        let stats = breaker.stats("classify");
        assert_eq!(stats.state, BreakerState::Closed);
        assert_eq!(stats.failure_count, 0);
    }
}
