//! JSON file sink
//!
//! One pretty-printed JSON file per record under a bootstrapped output
//! tree. A process-wide sequence counter keeps filenames unique, so
//! concurrent pipeline inputs never write to the same path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

use super::ResultSink;
use crate::analysis::{AggregateReport, ComparisonRecord};
use crate::record::StructuredResult;

const RAW_DIR: &str = "raw_results";
const COMPARISONS_DIR: &str = "comparisons";
const REPORTS_DIR: &str = "reports";

/// File-based sink writing timestamped JSON records
pub struct JsonFileSink {
    raw_dir: PathBuf,
    comparisons_dir: PathBuf,
    reports_dir: PathBuf,
    sequence: AtomicU64,
}

impl JsonFileSink {
    /// Create the sink, bootstrapping the output directory tree.
    pub fn new(output_root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = output_root.into();
        let raw_dir = root.join(RAW_DIR);
        let comparisons_dir = root.join(COMPARISONS_DIR);
        let reports_dir = root.join(REPORTS_DIR);

        for dir in [&raw_dir, &comparisons_dir, &reports_dir] {
            fs::create_dir_all(dir)?;
        }

        Ok(Self {
            raw_dir,
            comparisons_dir,
            reports_dir,
            sequence: AtomicU64::new(0),
        })
    }

    /// Directory holding persisted comparison records.
    pub fn comparisons_dir(&self) -> &Path {
        &self.comparisons_dir
    }

    fn next_filename(&self, stem: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{stem}_{timestamp}_{seq:04}.json")
    }

    fn write_json<T: Serialize>(&self, path: PathBuf, value: &T) -> std::io::Result<PathBuf> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

impl ResultSink for JsonFileSink {
    fn persist_result(
        &self,
        result: &StructuredResult,
        origin: &str,
        context: &str,
    ) -> std::io::Result<PathBuf> {
        let filename = self.next_filename(&format!(
            "{}_{}",
            sanitize_label(origin),
            sanitize_label(context)
        ));
        self.write_json(self.raw_dir.join(filename), result)
    }

    fn persist_comparison(
        &self,
        record: &ComparisonRecord,
        context: &str,
    ) -> std::io::Result<PathBuf> {
        let filename = self.next_filename(&format!("comparison_{}", sanitize_label(context)));
        self.write_json(self.comparisons_dir.join(filename), record)
    }

    fn persist_report(&self, report: &AggregateReport) -> std::io::Result<PathBuf> {
        let filename = self.next_filename("report");
        self.write_json(self.reports_dir.join(filename), report)
    }
}

fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Load all persisted comparison records from a directory.
///
/// Files that fail to parse are skipped with a warning; persisted
/// records are read-only inputs to aggregate reporting.
pub fn load_comparisons(dir: impl AsRef<Path>) -> std::io::Result<Vec<ComparisonRecord>> {
    let mut records = Vec::new();

    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str::<ComparisonRecord>(&content) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unparseable comparison file");
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ComparisonEngine;
    use crate::record::{Sentiment, StructuredResult};

    fn sample_result() -> StructuredResult {
        StructuredResult::new(
            Sentiment::Positive,
            vec!["ai".to_string()],
            "a summary",
            0.8,
        )
    }

    #[test]
    fn test_bootstrap_creates_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        let _sink = JsonFileSink::new(&root).unwrap();

        assert!(root.join(RAW_DIR).is_dir());
        assert!(root.join(COMPARISONS_DIR).is_dir());
        assert!(root.join(REPORTS_DIR).is_dir());
    }

    #[test]
    fn test_persist_and_reload_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path()).unwrap();

        let record =
            ComparisonEngine::new().compare("remote", &sample_result(), "local", &sample_result());
        let locator = sink.persist_comparison(&record, "input-0").unwrap();
        assert!(locator.is_file());

        let loaded = load_comparisons(sink.comparisons_dir()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].metrics.sentiment_match);
    }

    #[test]
    fn test_reload_skips_unparseable_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path()).unwrap();

        let record =
            ComparisonEngine::new().compare("remote", &sample_result(), "local", &sample_result());
        sink.persist_comparison(&record, "ok").unwrap();
        fs::write(sink.comparisons_dir().join("junk.json"), "not json").unwrap();

        let loaded = load_comparisons(sink.comparisons_dir()).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_persist_result_filenames_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path()).unwrap();

        let first = sink
            .persist_result(&sample_result(), "remote", "same label!")
            .unwrap();
        let second = sink
            .persist_result(&sample_result(), "remote", "same label!")
            .unwrap();

        assert_ne!(first, second);
    }
}
