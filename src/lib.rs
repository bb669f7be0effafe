//! Cross-model text analysis agreement pipeline
//!
//! Concord routes free text through two independently hosted
//! text-analysis backends (a remote hosted model and a locally served
//! model), repairs and normalizes their loosely structured replies into
//! a common record, and scores how well the two analyses agree.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use concord::config::Config;
//! use concord::pipeline::Pipeline;
//! use concord::reporting::JsonFileSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default();
//!
//!     let remote = Arc::new(config.build_remote()?);
//!     let local = Arc::new(config.build_local());
//!     let sink = Arc::new(JsonFileSink::new(&config.output.output_dir)?);
//!
//!     let pipeline = Pipeline::new(remote, local, sink);
//!     let record = pipeline
//!         .process_single("Rust makes systems programming pleasant.", "demo")
//!         .await?;
//!
//!     println!("topic overlap: {}", record.metrics.topic_overlap);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod pipeline;
pub mod processors;
pub mod record;
pub mod reporting;
pub mod retry;

pub use config::Config;
pub use record::{Sentiment, StructuredResult};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::analysis::{
        AggregateReport, AnalysisError, ComparisonEngine, ComparisonMetrics, ComparisonRecord,
        MetricStats, TaggedResult,
    };
    pub use crate::config::Config;
    pub use crate::pipeline::{Pipeline, PipelineError};
    pub use crate::processors::{
        GenerationConfig, LocalModelProcessor, Processor, ProcessorError, ProcessorResult,
        RemoteModelProcessor,
    };
    pub use crate::record::{Sentiment, StructuredResult};
    pub use crate::reporting::{load_comparisons, print_console_report, JsonFileSink, ResultSink};
    pub use crate::retry::{RetryPolicy, Retryable};
}
