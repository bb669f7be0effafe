//! Pipeline orchestration

use std::sync::Arc;

use crate::analysis::{AggregateReport, AnalysisError, ComparisonEngine, ComparisonRecord};
use crate::processors::{Processor, ProcessorError};
use crate::reporting::ResultSink;

/// Pipeline-level errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{origin} processor failed on `{context}`: {source}")]
    Processor {
        origin: String,
        context: String,
        #[source]
        source: ProcessorError,
    },

    #[error("failed to persist results: {0}")]
    Sink(#[from] std::io::Error),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Orchestrates two processors, the comparison engine, and the sink.
///
/// The two processors share no mutable state, so each input fans out to
/// both concurrently. If either fails permanently the input's
/// comparison and persistence are skipped entirely; no partial
/// comparison is ever produced.
pub struct Pipeline {
    first: Arc<dyn Processor>,
    second: Arc<dyn Processor>,
    engine: ComparisonEngine,
    sink: Arc<dyn ResultSink>,
}

impl Pipeline {
    pub fn new(
        first: Arc<dyn Processor>,
        second: Arc<dyn Processor>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            first,
            second,
            engine: ComparisonEngine::new(),
            sink,
        }
    }

    /// Process one input through both models, compare, and persist.
    pub async fn process_single(
        &self,
        text: &str,
        context: &str,
    ) -> Result<ComparisonRecord, PipelineError> {
        tracing::info!(context, "processing input through both models");

        let (result_a, result_b) =
            tokio::join!(self.first.process(text), self.second.process(text));

        let result_a = result_a.map_err(|source| PipelineError::Processor {
            origin: self.first.name().to_string(),
            context: context.to_string(),
            source,
        })?;
        let result_b = result_b.map_err(|source| PipelineError::Processor {
            origin: self.second.name().to_string(),
            context: context.to_string(),
            source,
        })?;

        let locator_a = self.sink.persist_result(&result_a, self.first.name(), context)?;
        let locator_b = self.sink.persist_result(&result_b, self.second.name(), context)?;
        tracing::debug!(
            context,
            first = %locator_a.display(),
            second = %locator_b.display(),
            "model results persisted"
        );

        let record = self.engine.compare(
            self.first.name(),
            &result_a,
            self.second.name(),
            &result_b,
        );
        let locator = self.sink.persist_comparison(&record, context)?;
        tracing::info!(context, locator = %locator.display(), "comparison persisted");

        Ok(record)
    }

    /// Process a batch of inputs, each reported independently.
    pub async fn process_many(
        &self,
        texts: &[String],
    ) -> Vec<Result<ComparisonRecord, PipelineError>> {
        let mut outcomes = Vec::with_capacity(texts.len());

        for (index, text) in texts.iter().enumerate() {
            let context = format!("input-{index}");
            let outcome = self.process_single(text, &context).await;
            if let Err(error) = &outcome {
                tracing::error!(index, %error, "input failed, skipping its comparison");
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Aggregate comparison records into a report and persist it.
    pub fn summarize(&self, records: &[ComparisonRecord]) -> Result<AggregateReport, PipelineError> {
        let report = self.engine.aggregate(records)?;
        let locator = self.sink.persist_report(&report)?;
        tracing::info!(locator = %locator.display(), "aggregate report persisted");
        Ok(report)
    }
}
