//! Fact validation against a reference source

use crate::error::ValidationError;
use crate::facts::{Fact, ValidationVerdict};
use crate::llm::FactClassifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Classifies a candidate fact as valid or invalid
#[async_trait]
pub trait FactValidator: Send + Sync {
    async fn validate(&self, fact: &Fact) -> Result<ValidationVerdict, ValidationError>;
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reference the classifier must check claims against
    #[serde(default = "default_reference")]
    pub reference: String,
}

fn default_reference() -> String {
    "https://en.wikipedia.org/wiki/Taylor_Swift".to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reference: default_reference(),
        }
    }
}

/// Delegates validation to a classifier bound to one reference
pub struct ReferenceFactValidator {
    classifier: Arc<dyn FactClassifier>,
    reference: String,
}

impl ReferenceFactValidator {
    pub fn new(classifier: Arc<dyn FactClassifier>, reference: impl Into<String>) -> Self {
        Self {
            classifier,
            reference: reference.into(),
        }
    }

    pub fn from_config(classifier: Arc<dyn FactClassifier>, config: &ValidationConfig) -> Self {
        Self::new(classifier, &config.reference)
    }
}

#[async_trait]
impl FactValidator for ReferenceFactValidator {
    async fn validate(&self, fact: &Fact) -> Result<ValidationVerdict, ValidationError> {
        let answer = self
            .classifier
            .classify(fact.as_str(), &self.reference)
            .await
            .map_err(|e| ValidationError::UpstreamFailure(e.to_string()))?;

        debug!("Classifier answered {:?} for: {}", answer.trim(), fact);
        ValidationVerdict::parse(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use std::sync::Mutex;

    struct RecordingClassifier {
        reply: Result<String, LlmError>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl RecordingClassifier {
        fn new(reply: Result<&str, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl FactClassifier for RecordingClassifier {
        async fn classify(&self, claim: &str, reference: &str) -> Result<String, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((claim.to_string(), reference.to_string()));
            self.reply.clone()
        }
    }

    fn fact() -> Fact {
        Fact::new("She is an American").unwrap()
    }

    #[tokio::test]
    async fn test_valid_verdict_and_reference_passed() {
        let classifier = RecordingClassifier::new(Ok("True"));
        let validator = ReferenceFactValidator::new(classifier.clone(), "wiki/Taylor_Swift");

        let verdict = validator.validate(&fact()).await.unwrap();
        assert_eq!(verdict, ValidationVerdict::Valid);

        let seen = classifier.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[("She is an American".to_string(), "wiki/Taylor_Swift".to_string())]
        );
    }

    #[tokio::test]
    async fn test_invalid_verdict() {
        let validator = ReferenceFactValidator::from_config(
            RecordingClassifier::new(Ok("false")),
            &ValidationConfig::default(),
        );
        assert_eq!(
            validator.validate(&fact()).await.unwrap(),
            ValidationVerdict::Invalid
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_distinct_from_invalid() {
        let validator = ReferenceFactValidator::new(
            RecordingClassifier::new(Err(LlmError::RequestFailed("connection reset".to_string()))),
            "ref",
        );
        let err = validator.validate(&fact()).await.unwrap_err();
        assert!(matches!(err, ValidationError::UpstreamFailure(_)));
    }

    #[tokio::test]
    async fn test_unparsable_verdict() {
        let validator =
            ReferenceFactValidator::new(RecordingClassifier::new(Ok("I cannot say")), "ref");
        let err = validator.validate(&fact()).await.unwrap_err();
        assert_eq!(err, ValidationError::UnparsableVerdict("I cannot say".to_string()));
    }
}
