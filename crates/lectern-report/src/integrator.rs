//! Final report integration
//!
//! Reads the persisted artifacts (TOC, interval summaries, meta-summary)
//! back from the store in index order and merges them into one markdown
//! report via a single oracle call. Failed intervals appear in the request
//! as explicit gaps.

use crate::error::ReportError;
use lectern_domain::traits::LanguageModel;
use lectern_domain::{Depth, IntervalSummary};
use lectern_pipeline::ArtifactStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Merges the run's artifacts into the final integrated report.
pub struct ReportIntegrator<L>
where
    L: LanguageModel,
{
    model: Arc<L>,
    artifacts: ArtifactStore,
    depth: Depth,
    stem: String,
    oracle_timeout: Duration,
}

impl<L> ReportIntegrator<L>
where
    L: LanguageModel,
    L::Error: std::fmt::Display,
{
    /// Create an integrator reading from `artifacts` and writing the
    /// report next to the other stages.
    pub fn new(
        model: Arc<L>,
        artifacts: ArtifactStore,
        depth: Depth,
        stem: impl Into<String>,
    ) -> Self {
        Self {
            model,
            artifacts,
            depth,
            stem: stem.into(),
            oracle_timeout: Duration::from_secs(300),
        }
    }

    /// Replace the oracle timeout.
    pub fn with_timeout(mut self, oracle_timeout: Duration) -> Self {
        self.oracle_timeout = oracle_timeout;
        self
    }

    /// Produce and persist the integrated report, returning its path.
    ///
    /// Requires a persisted meta-summary; intermediate artifacts are left
    /// untouched whether or not integration succeeds.
    pub async fn integrate(&self) -> Result<PathBuf, ReportError> {
        let toc = self
            .artifacts
            .load_toc(&self.stem)?
            .unwrap_or_else(|| {
                warn!("No table of contents on disk; integrating without one");
                "(table of contents unavailable)".to_string()
            });

        let intervals = self.artifacts.load_interval_summaries(self.depth)?;
        let meta = self
            .artifacts
            .load_meta_summary(self.depth, &self.stem)?
            .ok_or(ReportError::MissingMetaSummary)?;

        info!(
            "Integrating report for '{}' from {} interval summaries",
            self.stem,
            intervals.len()
        );

        let prompt = integration_prompt(&toc, &intervals, &meta.content);
        let content = match timeout(self.oracle_timeout, self.model.generate(&prompt)).await {
            Err(_) => return Err(ReportError::Timeout),
            Ok(Err(e)) => return Err(ReportError::Oracle(e.to_string())),
            Ok(Ok(response)) => response,
        };

        let path = self
            .artifacts
            .write_report(content.trim(), &self.stem, self.depth)?;
        info!("Integrated report written to {}", path.display());
        Ok(path)
    }
}

fn integration_prompt(toc: &str, intervals: &[IntervalSummary], meta: &str) -> String {
    let interval_block = intervals
        .iter()
        .map(|summary| {
            if let Some(reason) = summary.status.failure_reason() {
                format!(
                    "[interval {} (chunks {}-{}) failed: {}]",
                    summary.interval_index, summary.chunk_start, summary.chunk_end, reason
                )
            } else if summary.content.is_empty() {
                format!(
                    "[interval {} (chunks {}-{}) had no extractable content]",
                    summary.interval_index, summary.chunk_start, summary.chunk_end
                )
            } else {
                summary.content.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "{}\n\n1. Table of contents:\n{}\n\n2. Interval summaries:\n{}\n\n3. Meta-summary:\n{}",
        INTEGRATION_INSTRUCTIONS, toc, interval_block, meta
    )
}

const INTEGRATION_INSTRUCTIONS: &str = r#"You are a document-integration expert. Merge the following parts into one complete, well-structured markdown document.

Integration rules:
1. Use the meta-summary as the document's main framework
2. Put the full table of contents at the start
3. Pull supporting detail from the interval summaries where it helps
4. Keep gaps that are marked as failed visible as explicit notes
5. Remove duplicated information, keeping the most important version

Return the integrated document in clean markdown, nothing else."#;

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::{MetaSummary, TableOfContents, UnitStatus};
    use lectern_llm::MockModel;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir, with_meta: bool) -> ArtifactStore {
        let store = ArtifactStore::new(dir.path());
        store.ensure_layout().unwrap();

        let toc = TableOfContents::parse_markdown("- Chapter 1\n- Chapter 2\n");
        store.write_toc(&toc, "mybook").unwrap();

        for (index, status) in [
            (0, UnitStatus::Succeeded),
            (1, UnitStatus::Failed("oracle error".to_string())),
        ] {
            let summary = IntervalSummary {
                interval_index: index,
                chunk_start: index * 2,
                chunk_end: index * 2 + 1,
                content: if status.is_failed() {
                    String::new()
                } else {
                    format!("summary body {}", index)
                },
                status,
                degraded_chunks: Vec::new(),
            };
            store.write_interval_summary(&summary, Depth::Standard).unwrap();
        }

        if with_meta {
            let meta = MetaSummary {
                content: "meta body".to_string(),
            };
            store.write_meta_summary(&meta, Depth::Standard, "mybook").unwrap();
        }

        store
    }

    #[tokio::test]
    async fn test_integrate_writes_report_from_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, true);
        let model = MockModel::new("# Integrated Report");

        let integrator = ReportIntegrator::new(
            Arc::new(model.clone()),
            store,
            Depth::Standard,
            "mybook",
        );
        let path = integrator.integrate().await.unwrap();

        assert!(path.ends_with("report/mybook_integrated_standard.md"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# Integrated Report");

        // The request carried all three parts, with the failed interval as
        // an explicit gap.
        let prompt = model.prompts().remove(0);
        assert!(prompt.contains("- Chapter 1"));
        assert!(prompt.contains("summary body 0"));
        assert!(prompt.contains("[interval 1 (chunks 2-3) failed: oracle error]"));
        assert!(prompt.contains("meta body"));
    }

    #[tokio::test]
    async fn test_integrate_requires_meta_summary() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, false);
        let model = MockModel::new("# Integrated Report");

        let integrator = ReportIntegrator::new(Arc::new(model), store, Depth::Standard, "mybook");
        let result = integrator.integrate().await;

        assert!(matches!(result, Err(ReportError::MissingMetaSummary)));
    }

    #[tokio::test]
    async fn test_integrate_oracle_failure_leaves_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, true);
        let mut model = MockModel::new("ok");
        model.fail_containing("document-integration expert");

        let integrator = ReportIntegrator::new(Arc::new(model), store, Depth::Standard, "mybook");
        let result = integrator.integrate().await;

        assert!(matches!(result, Err(ReportError::Oracle(_))));
        assert!(dir
            .path()
            .join("meta_summary/mybook_meta_summary_standard.md")
            .is_file());
        assert!(!dir
            .path()
            .join("report/mybook_integrated_standard.md")
            .is_file());
    }
}
