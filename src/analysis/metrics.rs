//! Pairwise agreement metrics

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Agreement metrics between two analysis results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    /// Exact equality of the two sentiment values
    pub sentiment_match: bool,
    /// Case-folded Jaccard similarity over topic sets (0.0 - 1.0)
    pub topic_overlap: f64,
    /// Absolute difference of the two confidence scores (0.0 - 1.0)
    pub confidence_difference: f64,
    /// Jaccard similarity over lower-cased summary tokens (0.0 - 1.0)
    pub summary_similarity: f64,
}

/// Jaccard similarity between topic lists after case-folding each topic.
pub fn topic_overlap(topics_a: &[String], topics_b: &[String]) -> f64 {
    let set_a: HashSet<String> = topics_a.iter().map(|t| t.to_lowercase()).collect();
    let set_b: HashSet<String> = topics_b.iter().map(|t| t.to_lowercase()).collect();
    jaccard(&set_a, &set_b)
}

/// Jaccard similarity over the whitespace-delimited, lower-cased tokens
/// of two summaries.
pub fn summary_similarity(summary_a: &str, summary_b: &str) -> f64 {
    let words_a: HashSet<String> = summary_a
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let words_b: HashSet<String> = summary_b
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    jaccard(&words_a, &words_b)
}

/// Two empty sets agree vacuously (1.0); an empty union is only
/// possible when both sets are empty, so division is otherwise safe.
fn jaccard(set_a: &HashSet<String>, set_b: &HashSet<String>) -> f64 {
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }

    let intersection = set_a.intersection(set_b).count();
    let union = set_a.union(set_b).count();

    intersection as f64 / union as f64
}

/// Summary statistics for one metric across many comparisons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    /// Compute stats over a non-empty sequence of values.
    ///
    /// Median is the lower-middle element of the ascending sort for
    /// even-length inputs, not the two-element average.
    pub fn from_values(values: &[f64]) -> Self {
        debug_assert!(!values.is_empty());

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let median = sorted[(sorted.len() - 1) / 2];
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        Self {
            mean,
            median,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_topic_overlap_both_empty_is_full_agreement() {
        assert_eq!(topic_overlap(&[], &[]), 1.0);
    }

    #[test]
    fn test_topic_overlap_partial() {
        let overlap = topic_overlap(&topics(&["ai"]), &topics(&["ai", "ml"]));
        assert_eq!(overlap, 0.5);
    }

    #[test]
    fn test_topic_overlap_case_fold_invariance() {
        assert_eq!(topic_overlap(&topics(&["AI"]), &topics(&["ai"])), 1.0);
    }

    #[test]
    fn test_topic_overlap_disjoint() {
        assert_eq!(topic_overlap(&topics(&["a"]), &topics(&["b"])), 0.0);
    }

    #[test]
    fn test_topic_overlap_duplicates_collapse() {
        let overlap = topic_overlap(&topics(&["ai", "AI", "ai"]), &topics(&["ai"]));
        assert_eq!(overlap, 1.0);
    }

    #[test]
    fn test_summary_similarity_tokens() {
        let similarity = summary_similarity("the cat sat", "the cat ran");
        assert_eq!(similarity, 0.5);
    }

    #[test]
    fn test_summary_similarity_both_empty() {
        assert_eq!(summary_similarity("", ""), 1.0);
        assert_eq!(summary_similarity("  ", ""), 1.0);
    }

    #[test]
    fn test_summary_similarity_is_case_insensitive() {
        assert_eq!(summary_similarity("The Cat", "the cat"), 1.0);
    }

    #[test]
    fn test_stats_odd_length() {
        let stats = MetricStats::from_values(&[0.3, 0.1, 0.5]);
        assert_eq!(stats.median, 0.3);
        assert_eq!(stats.min, 0.1);
        assert_eq!(stats.max, 0.5);
        assert!((stats.mean - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_stats_even_length_uses_lower_middle() {
        let stats = MetricStats::from_values(&[0.4, 0.1, 0.3, 0.2]);
        assert_eq!(stats.median, 0.2);
    }

    #[test]
    fn test_stats_single_value() {
        let stats = MetricStats::from_values(&[0.7]);
        assert_eq!(stats.mean, 0.7);
        assert_eq!(stats.median, 0.7);
        assert_eq!(stats.min, 0.7);
        assert_eq!(stats.max, 0.7);
    }
}
