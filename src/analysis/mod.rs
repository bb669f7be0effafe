//! Agreement metrics and cross-model comparison

pub mod comparator;
pub mod metrics;

pub use comparator::{
    AggregateReport, AnalysisError, ComparisonEngine, ComparisonRecord, TaggedResult, TopicCount,
};
pub use metrics::{ComparisonMetrics, MetricStats};
