//! Cross-model comparison engine

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::metrics::{self, ComparisonMetrics, MetricStats};
use crate::record::StructuredResult;

/// Number of top topics reported per origin
const TOP_TOPICS: usize = 5;

/// Analysis errors
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("cannot aggregate an empty set of comparison records")]
    EmptyInput,
}

/// An analysis result tagged with the processor it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedResult {
    pub origin: String,
    pub result: StructuredResult,
}

/// Paired agreement metrics between two analysis results for one input.
///
/// Created once per pipeline run and never mutated; persisted records
/// may be re-loaded read-only for aggregate reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub timestamp: DateTime<Utc>,
    pub metrics: ComparisonMetrics,
    pub responses: [TaggedResult; 2],
}

/// A topic with its contribution count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Statistical report derived from a collection of comparison records.
///
/// Regenerated on demand; carries no identity beyond its generation
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub generated_at: DateTime<Utc>,
    pub total_comparisons: usize,
    /// Fraction of comparisons with matching sentiment
    pub sentiment_agreement_rate: f64,
    pub topic_overlap: MetricStats,
    pub summary_similarity: MetricStats,
    pub confidence_difference: MetricStats,
    /// Most frequent topics contributed by each origin, ranked by
    /// frequency with ties in first-seen order
    pub top_topics_by_origin: IndexMap<String, Vec<TopicCount>>,
}

/// Comparison engine for scoring agreement between two processors
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine;

impl ComparisonEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compare two analysis results for the same input.
    ///
    /// Commutative in its two arguments except for the origin tags on
    /// the output.
    pub fn compare(
        &self,
        origin_a: &str,
        result_a: &StructuredResult,
        origin_b: &str,
        result_b: &StructuredResult,
    ) -> ComparisonRecord {
        let metrics = ComparisonMetrics {
            sentiment_match: result_a.sentiment == result_b.sentiment,
            topic_overlap: metrics::topic_overlap(&result_a.key_topics, &result_b.key_topics),
            confidence_difference: (result_a.confidence_score - result_b.confidence_score).abs(),
            summary_similarity: metrics::summary_similarity(&result_a.summary, &result_b.summary),
        };

        ComparisonRecord {
            timestamp: Utc::now(),
            metrics,
            responses: [
                TaggedResult {
                    origin: origin_a.to_string(),
                    result: result_a.clone(),
                },
                TaggedResult {
                    origin: origin_b.to_string(),
                    result: result_b.clone(),
                },
            ],
        }
    }

    /// Aggregate many comparison records into summary statistics.
    pub fn aggregate(&self, records: &[ComparisonRecord]) -> Result<AggregateReport, AnalysisError> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut matches = 0usize;
        let mut topic_overlaps = Vec::with_capacity(records.len());
        let mut summary_similarities = Vec::with_capacity(records.len());
        let mut confidence_differences = Vec::with_capacity(records.len());
        let mut topics_by_origin: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();

        for record in records {
            if record.metrics.sentiment_match {
                matches += 1;
            }
            topic_overlaps.push(record.metrics.topic_overlap);
            summary_similarities.push(record.metrics.summary_similarity);
            confidence_differences.push(record.metrics.confidence_difference);

            for tagged in &record.responses {
                let counts = topics_by_origin.entry(tagged.origin.clone()).or_default();
                for topic in &tagged.result.key_topics {
                    *counts.entry(topic.clone()).or_insert(0) += 1;
                }
            }
        }

        let top_topics_by_origin = topics_by_origin
            .into_iter()
            .map(|(origin, counts)| {
                let mut ranked: Vec<TopicCount> = counts
                    .into_iter()
                    .map(|(topic, count)| TopicCount { topic, count })
                    .collect();
                // Stable sort over insertion order keeps first-seen
                // topics ahead on ties.
                ranked.sort_by(|a, b| b.count.cmp(&a.count));
                ranked.truncate(TOP_TOPICS);
                (origin, ranked)
            })
            .collect();

        Ok(AggregateReport {
            generated_at: Utc::now(),
            total_comparisons: records.len(),
            sentiment_agreement_rate: matches as f64 / records.len() as f64,
            topic_overlap: MetricStats::from_values(&topic_overlaps),
            summary_similarity: MetricStats::from_values(&summary_similarities),
            confidence_difference: MetricStats::from_values(&confidence_differences),
            top_topics_by_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Sentiment;

    fn result(
        sentiment: Sentiment,
        topics: &[&str],
        summary: &str,
        confidence: f64,
    ) -> StructuredResult {
        StructuredResult::new(
            sentiment,
            topics.iter().map(|t| t.to_string()).collect(),
            summary,
            confidence,
        )
    }

    #[test]
    fn test_compare_end_to_end_metrics() {
        let a = result(Sentiment::Positive, &["a", "b"], "the cat sat", 0.8);
        let b = result(Sentiment::Positive, &["a", "c"], "the cat ran", 0.6);

        let record = ComparisonEngine::new().compare("remote", &a, "local", &b);

        assert!(record.metrics.sentiment_match);
        assert!((record.metrics.topic_overlap - 1.0 / 3.0).abs() < 1e-12);
        assert!((record.metrics.confidence_difference - 0.2).abs() < 1e-12);
        assert_eq!(record.metrics.summary_similarity, 0.5);
        assert_eq!(record.responses[0].origin, "remote");
        assert_eq!(record.responses[1].origin, "local");
    }

    #[test]
    fn test_confidence_difference_is_symmetric() {
        let a = result(Sentiment::Neutral, &["x"], "s", 0.9);
        let b = result(Sentiment::Neutral, &["x"], "s", 0.3);

        let engine = ComparisonEngine::new();
        let forward = engine.compare("remote", &a, "local", &b);
        let backward = engine.compare("local", &b, "remote", &a);

        assert_eq!(
            forward.metrics.confidence_difference,
            backward.metrics.confidence_difference
        );
    }

    #[test]
    fn test_aggregate_empty_input_fails() {
        let error = ComparisonEngine::new().aggregate(&[]).unwrap_err();
        assert!(matches!(error, AnalysisError::EmptyInput));
    }

    #[test]
    fn test_aggregate_agreement_rate_and_stats() {
        let engine = ComparisonEngine::new();
        let records = vec![
            engine.compare(
                "remote",
                &result(Sentiment::Positive, &["ai"], "good", 0.8),
                "local",
                &result(Sentiment::Positive, &["ai"], "good", 0.6),
            ),
            engine.compare(
                "remote",
                &result(Sentiment::Negative, &["db"], "bad", 0.9),
                "local",
                &result(Sentiment::Neutral, &["db"], "bad", 0.5),
            ),
        ];

        let report = engine.aggregate(&records).unwrap();

        assert_eq!(report.total_comparisons, 2);
        assert_eq!(report.sentiment_agreement_rate, 0.5);
        assert_eq!(report.topic_overlap.mean, 1.0);
        assert!((report.confidence_difference.mean - 0.3).abs() < 1e-12);
        // Lower-middle median for the even-length [0.2, 0.4]
        assert!((report.confidence_difference.median - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_top_topics_frequency_and_tie_order() {
        let engine = ComparisonEngine::new();
        let records = vec![
            engine.compare(
                "remote",
                &result(Sentiment::Neutral, &["rust", "ai"], "s", 0.5),
                "local",
                &result(Sentiment::Neutral, &["go"], "s", 0.5),
            ),
            engine.compare(
                "remote",
                &result(Sentiment::Neutral, &["ai", "ml"], "s", 0.5),
                "local",
                &result(Sentiment::Neutral, &["go", "zig"], "s", 0.5),
            ),
        ];

        let report = engine.aggregate(&records).unwrap();
        let remote_topics = &report.top_topics_by_origin["remote"];

        // "ai" leads on frequency; "rust" beats "ml" on first-seen tie order
        assert_eq!(
            remote_topics[0],
            TopicCount {
                topic: "ai".to_string(),
                count: 2
            }
        );
        assert_eq!(remote_topics[1].topic, "rust");
        assert_eq!(remote_topics[2].topic, "ml");

        let local_topics = &report.top_topics_by_origin["local"];
        assert_eq!(local_topics[0].topic, "go");
        assert_eq!(local_topics[0].count, 2);
    }

    #[test]
    fn test_aggregate_caps_topics_per_origin() {
        let engine = ComparisonEngine::new();
        let many: Vec<String> = (0..8).map(|i| format!("t{i}")).collect();
        let topics: Vec<&str> = many.iter().map(String::as_str).collect();

        let records = vec![engine.compare(
            "remote",
            &result(Sentiment::Neutral, &topics, "s", 0.5),
            "local",
            &result(Sentiment::Neutral, &topics, "s", 0.5),
        )];

        let report = engine.aggregate(&records).unwrap();
        assert_eq!(report.top_topics_by_origin["remote"].len(), 5);
    }
}
