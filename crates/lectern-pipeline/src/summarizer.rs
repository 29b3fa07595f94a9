//! Interval and meta summarization
//!
//! Interval summarization groups the ordered knowledge points into
//! fixed-size windows and summarizes each group in a worker pool with the
//! same discipline and the same concurrency cap as chunk analysis. The
//! meta step is a single oracle call behind a barrier: it must never start
//! before every interval is terminal.

use crate::artifacts::ArtifactStore;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::progress::{ProgressTracker, StageKind};
use crate::prompt;
use crate::shutdown::ShutdownFlag;
use lectern_domain::traits::LanguageModel;
use lectern_domain::{
    Depth, IntervalSummary, KnowledgePoint, MetaSummary, TableOfContents, UnitStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

/// Partition `total` chunks into consecutive groups of `interval`,
/// returning inclusive `(start, end)` chunk-index ranges.
///
/// The number of groups is `ceil(total / interval)`; the last group may be
/// smaller but never empty. Empty input yields no groups.
pub fn partition_intervals(total: usize, interval: usize) -> Vec<(usize, usize)> {
    if total == 0 || interval == 0 {
        return Vec::new();
    }
    (0..total)
        .step_by(interval)
        .map(|start| (start, (start + interval - 1).min(total - 1)))
        .collect()
}

/// Runs interval and meta summarization.
pub struct Summarizer<L>
where
    L: LanguageModel,
{
    model: Arc<L>,
    config: PipelineConfig,
    artifacts: ArtifactStore,
    progress: Arc<ProgressTracker>,
    shutdown: ShutdownFlag,
    stem: String,
}

impl<L> Summarizer<L>
where
    L: LanguageModel + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a summarizer sharing the run's model, tracker, and artifact
    /// store. `stem` names the meta-summary file.
    pub fn new(
        model: Arc<L>,
        config: PipelineConfig,
        artifacts: ArtifactStore,
        progress: Arc<ProgressTracker>,
        shutdown: ShutdownFlag,
        stem: impl Into<String>,
    ) -> Self {
        Self {
            model,
            config,
            artifacts,
            progress,
            shutdown,
            stem: stem.into(),
        }
    }

    /// Summarize the knowledge points in groups of `interval` chunks, at
    /// most `max_parallel` oracle calls in flight.
    ///
    /// Requires every knowledge point to be terminal (the analysis stage
    /// must have drained first). Group failures are recorded per interval
    /// and never abort the pool.
    pub async fn summarize_intervals(
        &self,
        points: &[KnowledgePoint],
    ) -> Result<Vec<IntervalSummary>, PipelineError> {
        if let Some(point) = points.iter().find(|p| !p.status.is_terminal()) {
            return Err(PipelineError::BarrierViolation(format!(
                "chunk {} has no terminal status before interval summarization",
                point.chunk_index
            )));
        }

        let ranges = partition_intervals(points.len(), self.config.interval);
        self.progress.begin_stage(StageKind::Interval, ranges.len());
        if ranges.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Summarizing {} intervals of up to {} chunks (max_parallel: {})",
            ranges.len(),
            self.config.interval,
            self.config.max_parallel
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel));
        let mut handles = Vec::with_capacity(ranges.len());

        for (interval_index, (start, end)) in ranges.iter().copied().enumerate() {
            let members: Vec<KnowledgePoint> = points[start..=end].to_vec();
            let semaphore = Arc::clone(&semaphore);
            let model = Arc::clone(&self.model);
            let progress = Arc::clone(&self.progress);
            let artifacts = self.artifacts.clone();
            let shutdown = self.shutdown.clone();
            let depth = self.config.depth;
            let oracle_timeout = self.config.oracle_timeout();

            handles.push(tokio::spawn(async move {
                let outcome = summarize_one(
                    model,
                    interval_index,
                    start,
                    end,
                    &members,
                    depth,
                    oracle_timeout,
                    semaphore,
                    shutdown,
                )
                .await;

                if let Err(e) = artifacts.write_interval_summary(&outcome, depth) {
                    warn!(
                        "Failed to persist interval summary {}: {}",
                        outcome.interval_index, e
                    );
                }
                progress.record_completion(
                    StageKind::Interval,
                    outcome.interval_index,
                    &outcome.status,
                );
                outcome
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (interval_index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(summary) => results.push(summary),
                Err(e) => {
                    let (start, end) = ranges[interval_index];
                    let summary = IntervalSummary {
                        interval_index,
                        chunk_start: start,
                        chunk_end: end,
                        content: String::new(),
                        status: UnitStatus::Failed(format!("summary task failed: {}", e)),
                        degraded_chunks: Vec::new(),
                    };
                    self.progress.record_completion(
                        StageKind::Interval,
                        interval_index,
                        &summary.status,
                    );
                    results.push(summary);
                }
            }
        }

        let failed = results.iter().filter(|s| s.status.is_failed()).count();
        info!(
            "Interval summarization complete: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );

        Ok(results)
    }

    /// Fold the ordered interval summaries and the table of contents into
    /// one meta-summary via a single oracle call.
    ///
    /// Every interval must be terminal; a non-terminal interval is a
    /// programming error surfaced as `BarrierViolation`. Oracle failure
    /// here is fatal to report generation and propagates to the caller;
    /// the persisted intermediate artifacts remain on disk.
    pub async fn summarize_meta(
        &self,
        toc: Option<&TableOfContents>,
        intervals: &[IntervalSummary],
    ) -> Result<MetaSummary, PipelineError> {
        if let Some(summary) = intervals.iter().find(|s| !s.status.is_terminal()) {
            return Err(PipelineError::BarrierViolation(format!(
                "interval {} has no terminal status before meta-summarization",
                summary.interval_index
            )));
        }

        if self.shutdown.is_triggered() {
            return Err(PipelineError::Oracle("cancelled by shutdown".to_string()));
        }

        info!("Generating meta-summary from {} intervals", intervals.len());

        let body = meta_body(intervals);
        let prompt = prompt::meta_summary_prompt(toc.map(|t| t.raw.as_str()), &body);

        let response = match timeout(self.config.oracle_timeout(), self.model.generate(&prompt))
            .await
        {
            Err(_) => return Err(PipelineError::Timeout),
            Ok(Err(e)) => return Err(PipelineError::Oracle(e.to_string())),
            Ok(Ok(response)) => response,
        };

        let meta = MetaSummary {
            content: response.trim().to_string(),
        };
        self.artifacts
            .write_meta_summary(&meta, self.config.depth, &self.stem)?;

        Ok(meta)
    }
}

#[allow(clippy::too_many_arguments)]
async fn summarize_one<L>(
    model: Arc<L>,
    interval_index: usize,
    chunk_start: usize,
    chunk_end: usize,
    members: &[KnowledgePoint],
    depth: Depth,
    oracle_timeout: Duration,
    semaphore: Arc<Semaphore>,
    shutdown: ShutdownFlag,
) -> IntervalSummary
where
    L: LanguageModel,
    L::Error: std::fmt::Display,
{
    let degraded_chunks: Vec<usize> = members
        .iter()
        .filter(|p| p.status.is_failed())
        .map(|p| p.chunk_index)
        .collect();

    let mut summary = IntervalSummary {
        interval_index,
        chunk_start,
        chunk_end,
        content: String::new(),
        status: UnitStatus::Pending,
        degraded_chunks,
    };

    let body = interval_body(members);
    if body.is_empty() {
        // Nothing to summarize: every member was skipped or failed. Keep
        // the interval in the sequence so indices stay contiguous.
        warn!("Interval {} has no analyzable content", interval_index);
        summary.status = UnitStatus::Succeeded;
        return summary;
    }

    let permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            summary.status = UnitStatus::Failed("worker pool closed".to_string());
            return summary;
        }
    };

    if shutdown.is_triggered() {
        drop(permit);
        summary.status = UnitStatus::Failed("cancelled by shutdown".to_string());
        return summary;
    }

    let prompt = prompt::interval_summary_prompt(&body, depth);
    match timeout(oracle_timeout, model.generate(&prompt)).await {
        Err(_) => {
            summary.status = UnitStatus::Failed("oracle call timed out".to_string());
        }
        Ok(Err(e)) => {
            summary.status = UnitStatus::Failed(format!("oracle error: {}", e));
        }
        Ok(Ok(response)) => {
            summary.content = response.trim().to_string();
            summary.status = UnitStatus::Succeeded;
        }
    }

    drop(permit);
    summary
}

/// Assemble one interval's oracle-request body: succeeded members'
/// knowledge points, with failed members noted in place.
fn interval_body(members: &[KnowledgePoint]) -> String {
    let mut lines = Vec::new();
    for member in members {
        if let Some(reason) = member.status.failure_reason() {
            lines.push(format!(
                "[chunk {} analysis failed: {}]",
                member.chunk_index, reason
            ));
        } else if member.has_content {
            for point in &member.points {
                lines.push(format!("- {}", point));
            }
        }
    }
    // Empty only when every member was a content-free skip; a body of
    // failure notes alone still goes to the oracle so the gap is summarized.
    lines.join("\n")
}

/// Assemble the meta-summary request body, with failed intervals kept as
/// explicit gaps.
fn meta_body(intervals: &[IntervalSummary]) -> String {
    let mut sections = Vec::new();
    for summary in intervals {
        let heading = format!(
            "## Interval {} (chunks {}-{})",
            summary.interval_index, summary.chunk_start, summary.chunk_end
        );
        let body = if let Some(reason) = summary.status.failure_reason() {
            format!("[interval {} failed: {}]", summary.interval_index, reason)
        } else if summary.content.is_empty() {
            "(no extractable content in this interval)".to_string()
        } else {
            summary.content.clone()
        };
        sections.push(format!("{}\n\n{}", heading, body));
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_exact_fit() {
        assert_eq!(partition_intervals(6, 2), vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[test]
    fn test_partition_short_tail() {
        assert_eq!(partition_intervals(7, 3), vec![(0, 2), (3, 5), (6, 6)]);
    }

    #[test]
    fn test_partition_single_group() {
        assert_eq!(partition_intervals(2, 5), vec![(0, 1)]);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_intervals(0, 5).is_empty());
    }

    #[test]
    fn test_interval_body_notes_failures() {
        let members = vec![
            KnowledgePoint::succeeded(0, true, vec!["point a".to_string()], 1),
            KnowledgePoint::failed(1, "timeout", 1),
        ];
        let body = interval_body(&members);
        assert!(body.contains("- point a"));
        assert!(body.contains("[chunk 1 analysis failed: timeout]"));
    }

    #[test]
    fn test_interval_body_empty_when_all_skipped() {
        let members = vec![
            KnowledgePoint::succeeded(0, false, Vec::new(), 1),
            KnowledgePoint::succeeded(1, false, Vec::new(), 1),
        ];
        assert!(interval_body(&members).is_empty());
    }

    #[test]
    fn test_interval_body_kept_when_only_failures() {
        let members = vec![KnowledgePoint::failed(0, "boom", 1)];
        assert!(interval_body(&members).contains("[chunk 0 analysis failed: boom]"));
    }

    #[test]
    fn test_meta_body_marks_failed_interval_as_gap() {
        let intervals = vec![
            IntervalSummary {
                interval_index: 0,
                chunk_start: 0,
                chunk_end: 1,
                content: "ideas".to_string(),
                status: UnitStatus::Succeeded,
                degraded_chunks: Vec::new(),
            },
            IntervalSummary {
                interval_index: 1,
                chunk_start: 2,
                chunk_end: 3,
                content: String::new(),
                status: UnitStatus::Failed("oracle error".to_string()),
                degraded_chunks: Vec::new(),
            },
        ];
        let body = meta_body(&intervals);
        assert!(body.contains("ideas"));
        assert!(body.contains("[interval 1 failed: oracle error]"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the number of groups is `ceil(total / interval)` and
        /// the last group's size is `total mod interval` (or `interval`
        /// when the mod is 0 and total > 0).
        #[test]
        fn test_partition_counts(total in 0usize..500, interval in 1usize..32) {
            let ranges = partition_intervals(total, interval);
            let expected_groups = total.div_ceil(interval);
            prop_assert_eq!(ranges.len(), expected_groups);

            if total > 0 {
                let expected_last = if total % interval == 0 { interval } else { total % interval };
                let (start, end) = ranges[ranges.len() - 1];
                prop_assert_eq!(end - start + 1, expected_last);
                prop_assert_eq!(end, total - 1);
            }
        }

        /// Property: groups are contiguous, non-overlapping, and cover the
        /// chunk indices in order.
        #[test]
        fn test_partition_contiguous(total in 1usize..500, interval in 1usize..32) {
            let ranges = partition_intervals(total, interval);
            prop_assert_eq!(ranges[0].0, 0);
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[1].0, pair[0].1 + 1);
            }
            let covered: usize = ranges.iter().map(|(s, e)| e - s + 1).sum();
            prop_assert_eq!(covered, total);
        }
    }
}
