//! Result persistence and reporting

pub mod json_writer;

pub use json_writer::{load_comparisons, JsonFileSink};

use std::path::PathBuf;

use crate::analysis::{AggregateReport, ComparisonRecord};
use crate::record::StructuredResult;

/// Collaborator that persists pipeline output.
///
/// The sink owns the persisted bytes, the storage format, and the
/// serialization of concurrent writes; the pipeline never inspects the
/// returned locator beyond logging it.
pub trait ResultSink: Send + Sync {
    /// Persist one processor's result, tagged with its origin and the
    /// input's context label.
    fn persist_result(
        &self,
        result: &StructuredResult,
        origin: &str,
        context: &str,
    ) -> std::io::Result<PathBuf>;

    /// Persist a comparison record.
    fn persist_comparison(
        &self,
        record: &ComparisonRecord,
        context: &str,
    ) -> std::io::Result<PathBuf>;

    /// Persist an aggregate report.
    fn persist_report(&self, report: &AggregateReport) -> std::io::Result<PathBuf>;
}

/// Print a human-readable aggregate report to the console.
pub fn print_console_report(report: &AggregateReport) {
    println!("\n=== Model Agreement Report ===\n");
    println!("Comparisons analyzed: {}", report.total_comparisons);
    println!(
        "Sentiment agreement:  {:.1}%",
        report.sentiment_agreement_rate * 100.0
    );
    println!();

    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>8}",
        "Metric", "Mean", "Median", "Min", "Max"
    );
    for (name, stats) in [
        ("topic_overlap", &report.topic_overlap),
        ("summary_similarity", &report.summary_similarity),
        ("confidence_difference", &report.confidence_difference),
    ] {
        println!(
            "{:<24} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
            name, stats.mean, stats.median, stats.min, stats.max
        );
    }

    for (origin, topics) in &report.top_topics_by_origin {
        println!("\nTop topics ({origin}):");
        for entry in topics {
            println!("  {:>4}x  {}", entry.count, entry.topic);
        }
    }
    println!();
}
