//! Canonical analysis record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of key topics kept on a record
pub const MAX_TOPICS: usize = 10;

/// Sentiment classification of an analyzed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse a sentiment label case-insensitively.
    ///
    /// Anything outside the three known labels reads as `Neutral`:
    /// sentiment is advisory, so an unknown label is repaired rather
    /// than rejected.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized output of one analysis pass by one processor.
///
/// Constructed once per processed text and immutable afterwards. The
/// constructor enforces the record invariants: `confidence_score` is
/// clamped into [0, 1] and `key_topics` is capped at [`MAX_TOPICS`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredResult {
    pub sentiment: Sentiment,
    pub key_topics: Vec<String>,
    pub summary: String,
    pub confidence_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl StructuredResult {
    pub fn new(
        sentiment: Sentiment,
        mut key_topics: Vec<String>,
        summary: impl Into<String>,
        confidence_score: f64,
    ) -> Self {
        key_topics.truncate(MAX_TOPICS);
        Self {
            sentiment,
            key_topics,
            summary: summary.into(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_known_labels() {
        assert_eq!(Sentiment::parse_lenient("Positive"), Sentiment::Positive);
        assert_eq!(Sentiment::parse_lenient("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::parse_lenient(" neutral "), Sentiment::Neutral);
    }

    #[test]
    fn test_parse_lenient_unknown_reads_neutral() {
        assert_eq!(Sentiment::parse_lenient("mixed"), Sentiment::Neutral);
        assert_eq!(Sentiment::parse_lenient(""), Sentiment::Neutral);
        assert_eq!(Sentiment::parse_lenient("very positive"), Sentiment::Neutral);
    }

    #[test]
    fn test_constructor_clamps_confidence() {
        let high = StructuredResult::new(Sentiment::Neutral, vec![], "s", 1.7);
        assert_eq!(high.confidence_score, 1.0);

        let low = StructuredResult::new(Sentiment::Neutral, vec![], "s", -0.2);
        assert_eq!(low.confidence_score, 0.0);
    }

    #[test]
    fn test_constructor_caps_topics() {
        let topics: Vec<String> = (0..15).map(|i| format!("topic-{i}")).collect();
        let result = StructuredResult::new(Sentiment::Positive, topics, "s", 0.5);
        assert_eq!(result.key_topics.len(), MAX_TOPICS);
        assert_eq!(result.key_topics[0], "topic-0");
    }
}
