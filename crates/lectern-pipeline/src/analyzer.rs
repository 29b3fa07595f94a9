//! Chunk analysis worker pool
//!
//! Fans the ordered chunk list out across a bounded pool of tokio tasks,
//! one oracle call per chunk, and fans the results back in to input order.
//! A unit's failure is recorded on that unit alone; siblings keep running.

use crate::artifacts::ArtifactStore;
use crate::config::PipelineConfig;
use crate::parser::parse_analysis_response;
use crate::progress::{ProgressTracker, StageKind};
use crate::prompt::AnalysisPromptBuilder;
use crate::shutdown::ShutdownFlag;
use lectern_domain::traits::LanguageModel;
use lectern_domain::{Chunk, Depth, KnowledgePoint};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

/// Runs chunk analysis with bounded concurrency.
pub struct ChunkAnalyzer<L>
where
    L: LanguageModel,
{
    model: Arc<L>,
    config: PipelineConfig,
    artifacts: ArtifactStore,
    progress: Arc<ProgressTracker>,
    shutdown: ShutdownFlag,
}

impl<L> ChunkAnalyzer<L>
where
    L: LanguageModel + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an analyzer sharing the run's model, tracker, and artifact
    /// store.
    pub fn new(
        model: Arc<L>,
        config: PipelineConfig,
        artifacts: ArtifactStore,
        progress: Arc<ProgressTracker>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            model,
            config,
            artifacts,
            progress,
            shutdown,
        }
    }

    /// Analyze every chunk, at most `max_parallel` oracle calls in flight.
    ///
    /// Returns exactly one knowledge point per input chunk, in input order,
    /// every one with a terminal status. This method only resolves once the
    /// whole pool has drained, so callers can treat its return as the
    /// stage barrier.
    pub async fn analyze_all(&self, chunks: &[Chunk]) -> Vec<KnowledgePoint> {
        self.progress.begin_stage(StageKind::Chunk, chunks.len());
        if chunks.is_empty() {
            return Vec::new();
        }

        info!(
            "Analyzing {} chunks (max_parallel: {}, depth: {})",
            chunks.len(),
            self.config.max_parallel,
            self.config.depth
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel));
        let mut handles = Vec::with_capacity(chunks.len());

        for (position, chunk) in chunks.iter().enumerate() {
            // Context is whatever is available at dispatch time: the raw
            // tail of the previous chunk, never its analysis result, so the
            // pool is not serialized by a data dependency.
            let prior_context = if position == 0 || self.config.context_window == 0 {
                None
            } else {
                Some(char_tail(&chunks[position - 1].text, self.config.context_window))
            };

            let semaphore = Arc::clone(&semaphore);
            let model = Arc::clone(&self.model);
            let progress = Arc::clone(&self.progress);
            let artifacts = self.artifacts.clone();
            let shutdown = self.shutdown.clone();
            let chunk = chunk.clone();
            let depth = self.config.depth;
            let oracle_timeout = self.config.oracle_timeout();

            handles.push(tokio::spawn(async move {
                let outcome = analyze_one(
                    model,
                    &chunk,
                    prior_context,
                    depth,
                    oracle_timeout,
                    semaphore,
                    shutdown,
                )
                .await;

                if let Err(e) = artifacts.write_knowledge(&outcome, depth) {
                    warn!(
                        "Failed to persist knowledge point {}: {}",
                        outcome.chunk_index, e
                    );
                }
                progress.record_completion(StageKind::Chunk, outcome.chunk_index, &outcome.status);
                outcome
            }));
        }

        // Fan-in: awaiting the handles in spawn order re-serializes results
        // into document order regardless of completion order.
        let mut results = Vec::with_capacity(handles.len());
        for (position, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(point) => results.push(point),
                Err(e) => {
                    let index = chunks[position].index;
                    let point = KnowledgePoint::failed(index, format!("analysis task failed: {}", e), 0);
                    self.progress
                        .record_completion(StageKind::Chunk, index, &point.status);
                    results.push(point);
                }
            }
        }

        let failed = results.iter().filter(|p| p.status.is_failed()).count();
        info!(
            "Chunk analysis complete: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );

        results
    }
}

async fn analyze_one<L>(
    model: Arc<L>,
    chunk: &Chunk,
    prior_context: Option<String>,
    depth: Depth,
    oracle_timeout: Duration,
    semaphore: Arc<Semaphore>,
    shutdown: ShutdownFlag,
) -> KnowledgePoint
where
    L: LanguageModel,
    L::Error: std::fmt::Display,
{
    let permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            return KnowledgePoint::failed(chunk.index, "worker pool closed", 0);
        }
    };

    if shutdown.is_triggered() {
        drop(permit);
        return KnowledgePoint::failed(chunk.index, "cancelled by shutdown", 0);
    }

    let started = Instant::now();
    let prompt = AnalysisPromptBuilder::new(chunk.text.as_str(), depth)
        .with_prior_context(prior_context)
        .build();

    let outcome = match timeout(oracle_timeout, model.generate(&prompt)).await {
        Err(_) => KnowledgePoint::failed(
            chunk.index,
            "oracle call timed out",
            elapsed_ms(started),
        ),
        Ok(Err(e)) => KnowledgePoint::failed(
            chunk.index,
            format!("oracle error: {}", e),
            elapsed_ms(started),
        ),
        Ok(Ok(response)) => match parse_analysis_response(&response) {
            Ok(findings) => KnowledgePoint::succeeded(
                chunk.index,
                findings.has_content,
                findings.knowledge,
                elapsed_ms(started),
            ),
            Err(e) => KnowledgePoint::failed(
                chunk.index,
                format!("malformed response: {}", e),
                elapsed_ms(started),
            ),
        },
    };

    drop(permit);
    outcome
}

/// Last `count` characters of `text`, on a char boundary.
fn char_tail(text: &str, count: usize) -> String {
    let total = text.chars().count();
    if total <= count {
        return text.to_string();
    }
    text.chars().skip(total - count).collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_tail_short_text() {
        assert_eq!(char_tail("abc", 10), "abc");
    }

    #[test]
    fn test_char_tail_truncates() {
        assert_eq!(char_tail("abcdefgh", 3), "fgh");
    }

    #[test]
    fn test_char_tail_multibyte() {
        assert_eq!(char_tail("日本語のテキスト", 4), "テキスト");
    }
}
