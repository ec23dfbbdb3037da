//! Data models for facts and verdicts

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-sentence claim about the subject
///
/// The text is trimmed on construction and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fact(String);

impl Fact {
    /// Create a fact, returning `None` for blank text
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.len() == text.len() {
            Some(Self(text))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fact {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fact {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Fact::new(value).ok_or_else(|| "fact text cannot be empty".to_string())
    }
}

impl From<Fact> for String {
    fn from(fact: Fact) -> Self {
        fact.0
    }
}

/// Outcome of checking a fact against the reference source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationVerdict {
    Valid,
    Invalid,
}

impl ValidationVerdict {
    /// Parse the classifier's free-text answer
    ///
    /// Surrounding whitespace, quotes and punctuation are ignored, so
    /// `"True."` and `'false'` are accepted. Matching is case-insensitive.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let cleaned = text
            .trim()
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());

        if cleaned.eq_ignore_ascii_case("true") {
            Ok(ValidationVerdict::Valid)
        } else if cleaned.eq_ignore_ascii_case("false") {
            Ok(ValidationVerdict::Invalid)
        } else {
            Err(ValidationError::UnparsableVerdict(text.to_string()))
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationVerdict::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_creation_trims() {
        let fact = Fact::new("  She owns a record label\n").unwrap();
        assert_eq!(fact.as_str(), "She owns a record label");
    }

    #[test]
    fn test_blank_fact_rejected() {
        assert!(Fact::new("").is_none());
        assert!(Fact::new("   \n\t").is_none());
    }

    #[test]
    fn test_fact_serde_is_plain_string() {
        let fact = Fact::new("She is an American").unwrap();
        let json = serde_json::to_string(&fact).unwrap();
        assert_eq!(json, "\"She is an American\"");

        let back: Fact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fact);

        assert!(serde_json::from_str::<Fact>("\"  \"").is_err());
    }

    #[test]
    fn test_verdict_parse_case_insensitive() {
        assert_eq!(ValidationVerdict::parse("true").unwrap(), ValidationVerdict::Valid);
        assert_eq!(ValidationVerdict::parse("TRUE").unwrap(), ValidationVerdict::Valid);
        assert_eq!(ValidationVerdict::parse("False").unwrap(), ValidationVerdict::Invalid);
    }

    #[test]
    fn test_verdict_parse_ignores_decoration() {
        assert_eq!(ValidationVerdict::parse(" True.\n").unwrap(), ValidationVerdict::Valid);
        assert_eq!(ValidationVerdict::parse("'false'").unwrap(), ValidationVerdict::Invalid);
        assert_eq!(ValidationVerdict::parse("**true**").unwrap(), ValidationVerdict::Valid);
    }

    #[test]
    fn test_verdict_parse_unrecognized() {
        let err = ValidationVerdict::parse("probably true").unwrap_err();
        assert_eq!(err, ValidationError::UnparsableVerdict("probably true".to_string()));

        assert!(ValidationVerdict::parse("").is_err());
        assert!(ValidationVerdict::parse("yes").is_err());
    }
}
