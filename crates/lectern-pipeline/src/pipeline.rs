//! Run orchestration
//!
//! Drives the stages in order with drain barriers between them: chunking,
//! chunk analysis, interval summarization, then the meta-summary. No stage
//! consumes the previous stage's results until that stage's pool has fully
//! drained.

use crate::artifacts::ArtifactStore;
use crate::analyzer::ChunkAnalyzer;
use crate::chunker;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::progress::{ProgressSnapshot, ProgressTracker};
use crate::shutdown::ShutdownFlag;
use crate::summarizer::Summarizer;
use lectern_domain::traits::LanguageModel;
use lectern_domain::{
    Chunk, IntervalSummary, KnowledgePoint, MetaSummary, RunId, TableOfContents,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Everything one run produced, in document order.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Identifier of this run
    pub run_id: RunId,
    /// Ordered chunk list
    pub chunks: Vec<Chunk>,
    /// One knowledge point per chunk, in chunk order
    pub knowledge_points: Vec<KnowledgePoint>,
    /// Ordered interval summaries
    pub interval_summaries: Vec<IntervalSummary>,
    /// The meta-summary
    pub meta_summary: MetaSummary,
    /// Final progress counts
    pub snapshot: ProgressSnapshot,
}

/// Audit trail persisted as `run_summary.json` at run end.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    run_id: String,
    config: &'a PipelineConfig,
    chunk_count: usize,
    interval_count: usize,
    snapshot: ProgressSnapshot,
}

/// The chunk → analyze → summarize pipeline.
pub struct Pipeline<L>
where
    L: LanguageModel,
{
    model: Arc<L>,
    config: PipelineConfig,
    artifacts: ArtifactStore,
    progress: Arc<ProgressTracker>,
    shutdown: ShutdownFlag,
    run_id: RunId,
    stem: String,
}

impl<L> Pipeline<L>
where
    L: LanguageModel + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a pipeline. Fails fast on invalid configuration, before any
    /// work starts.
    pub fn new(
        model: Arc<L>,
        config: PipelineConfig,
        artifacts: ArtifactStore,
        stem: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(PipelineError::InvalidConfiguration)?;

        Ok(Self {
            model,
            config,
            artifacts,
            progress: Arc::new(ProgressTracker::new()),
            shutdown: ShutdownFlag::new(),
            run_id: RunId::new(),
            stem: stem.into(),
        })
    }

    /// Shared tracker, for a reporter polling on its own cadence.
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    /// Shared shutdown flag, for a signal handler.
    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// This run's identifier.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Run the pipeline over `text`.
    ///
    /// Per-unit oracle failures degrade their units and the run continues;
    /// the returned output then contains explicit `Failed` entries. A
    /// meta-summary failure is fatal: the error propagates, but all
    /// intermediate artifacts (and the audit trail) are already on disk.
    pub async fn run(
        &self,
        text: &str,
        toc: Option<&TableOfContents>,
    ) -> Result<PipelineOutput, PipelineError> {
        info!("Starting run {} ({} chars)", self.run_id, text.chars().count());
        self.artifacts.ensure_layout()?;

        let chunks = chunker::split(text, self.config.chunk_size, self.config.overlap)?;
        info!("Split text into {} chunks", chunks.len());
        for chunk in &chunks {
            self.artifacts.write_chunk(chunk)?;
        }

        let analyzer = ChunkAnalyzer::new(
            Arc::clone(&self.model),
            self.config,
            self.artifacts.clone(),
            Arc::clone(&self.progress),
            self.shutdown.clone(),
        );
        let knowledge_points = analyzer.analyze_all(&chunks).await;

        let summarizer = Summarizer::new(
            Arc::clone(&self.model),
            self.config,
            self.artifacts.clone(),
            Arc::clone(&self.progress),
            self.shutdown.clone(),
            self.stem.clone(),
        );
        let interval_summaries = summarizer.summarize_intervals(&knowledge_points).await?;

        let meta_result = summarizer.summarize_meta(toc, &interval_summaries).await;

        // The audit trail is written whether or not the meta step
        // succeeded, so partial runs remain inspectable.
        let snapshot = self.progress.snapshot();
        self.artifacts.write_run_summary(&RunSummary {
            run_id: self.run_id.to_string(),
            config: &self.config,
            chunk_count: chunks.len(),
            interval_count: interval_summaries.len(),
            snapshot,
        })?;

        let meta_summary = meta_result?;

        info!(
            "Run {} complete: {} chunks, {} intervals, {} failed units",
            self.run_id,
            chunks.len(),
            interval_summaries.len(),
            snapshot.total_failed()
        );

        Ok(PipelineOutput {
            run_id: self.run_id,
            chunks,
            knowledge_points,
            interval_summaries,
            meta_summary,
            snapshot,
        })
    }
}
