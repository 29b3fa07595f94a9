//! On-disk artifacts, one file per unit
//!
//! Every chunk, knowledge point, and summary is written as its own file as
//! soon as it completes, named by stage and index, so a crash loses at most
//! the in-flight units and the integration step can reassemble everything
//! deterministically by reading files in index order.
//!
//! Layout under the store root:
//!
//! ```text
//! toc/<stem>_toc.md
//! chunks/chunk_0000.json
//! knowledge/chunk_0000_<depth>.json
//! summaries/interval_summary_000_<depth>.md
//! meta_summary/<stem>_meta_summary_<depth>.md
//! report/<stem>_integrated_<depth>.md
//! run_summary.json
//! ```

use crate::error::PipelineError;
use lectern_domain::{Chunk, Depth, IntervalSummary, KnowledgePoint, MetaSummary, TableOfContents};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TOC_DIR: &str = "toc";
const CHUNKS_DIR: &str = "chunks";
const KNOWLEDGE_DIR: &str = "knowledge";
const SUMMARIES_DIR: &str = "summaries";
const META_DIR: &str = "meta_summary";
const REPORT_DIR: &str = "report";

/// Marker line embedding machine-readable metadata in markdown artifacts.
const META_MARKER: &str = "<!-- lectern:";

/// Persists pipeline artifacts under a per-document root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`. Call [`ensure_layout`] before the
    /// first write.
    ///
    /// [`ensure_layout`]: ArtifactStore::ensure_layout
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the stage subdirectories.
    pub fn ensure_layout(&self) -> Result<(), PipelineError> {
        for dir in [
            TOC_DIR,
            CHUNKS_DIR,
            KNOWLEDGE_DIR,
            SUMMARIES_DIR,
            META_DIR,
            REPORT_DIR,
        ] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    /// Persist one chunk as JSON.
    pub fn write_chunk(&self, chunk: &Chunk) -> Result<PathBuf, PipelineError> {
        let path = self
            .root
            .join(CHUNKS_DIR)
            .join(format!("chunk_{:04}.json", chunk.index));
        write_json(&path, chunk)?;
        Ok(path)
    }

    /// Persist one knowledge point as JSON, named by chunk index and depth.
    pub fn write_knowledge(
        &self,
        point: &KnowledgePoint,
        depth: Depth,
    ) -> Result<PathBuf, PipelineError> {
        let path = self
            .root
            .join(KNOWLEDGE_DIR)
            .join(format!("chunk_{:04}_{}.json", point.chunk_index, depth));
        write_json(&path, point)?;
        Ok(path)
    }

    /// Load all persisted knowledge points for `depth`, sorted by chunk
    /// index.
    pub fn load_knowledge_points(&self, depth: Depth) -> Result<Vec<KnowledgePoint>, PipelineError> {
        let suffix = format!("_{}.json", depth);
        let mut points = Vec::new();
        for entry in fs::read_dir(self.root.join(KNOWLEDGE_DIR))? {
            let path = entry?.path();
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("chunk_") && n.ends_with(&suffix))
            {
                let contents = fs::read_to_string(&path)?;
                points.push(serde_json::from_str::<KnowledgePoint>(&contents)?);
            }
        }
        points.sort_by_key(|p| p.chunk_index);
        Ok(points)
    }

    /// Persist one interval summary as markdown with a metadata header.
    pub fn write_interval_summary(
        &self,
        summary: &IntervalSummary,
        depth: Depth,
    ) -> Result<PathBuf, PipelineError> {
        let path = self.root.join(SUMMARIES_DIR).join(format!(
            "interval_summary_{:03}_{}.md",
            summary.interval_index, depth
        ));
        let title = format!(
            "Interval Summary {} (chunks {}-{})",
            summary.interval_index, summary.chunk_start, summary.chunk_end
        );
        let meta = IntervalSummary {
            content: String::new(),
            ..summary.clone()
        };
        fs::write(&path, render_markdown(&title, &meta, &summary.content)?)?;
        debug!("Persisted {}", path.display());
        Ok(path)
    }

    /// Load all persisted interval summaries for `depth`, sorted by
    /// interval index.
    pub fn load_interval_summaries(
        &self,
        depth: Depth,
    ) -> Result<Vec<IntervalSummary>, PipelineError> {
        let suffix = format!("_{}.md", depth);
        let mut summaries = Vec::new();
        for entry in fs::read_dir(self.root.join(SUMMARIES_DIR))? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| {
                    n.starts_with("interval_summary_") && n.ends_with(&suffix)
                });
            if !matches {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            let (meta_json, body) = split_markdown(&contents).ok_or_else(|| {
                PipelineError::InvalidFormat(format!(
                    "Missing metadata header in {}",
                    path.display()
                ))
            })?;
            let mut summary: IntervalSummary = serde_json::from_str(meta_json)?;
            summary.content = body.to_string();
            summaries.push(summary);
        }
        summaries.sort_by_key(|s| s.interval_index);
        Ok(summaries)
    }

    /// Persist the meta-summary.
    pub fn write_meta_summary(
        &self,
        meta: &MetaSummary,
        depth: Depth,
        stem: &str,
    ) -> Result<PathBuf, PipelineError> {
        let path = self
            .root
            .join(META_DIR)
            .join(format!("{}_meta_summary_{}.md", stem, depth));
        let title = format!("Meta Summary: {}", stem);
        fs::write(&path, render_markdown(&title, meta_only(), &meta.content)?)?;
        Ok(path)
    }

    /// Load the persisted meta-summary, if present.
    pub fn load_meta_summary(
        &self,
        depth: Depth,
        stem: &str,
    ) -> Result<Option<MetaSummary>, PipelineError> {
        let path = self
            .root
            .join(META_DIR)
            .join(format!("{}_meta_summary_{}.md", stem, depth));
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let body = split_markdown(&contents)
            .map(|(_, body)| body.to_string())
            .unwrap_or(contents);
        Ok(Some(MetaSummary { content: body }))
    }

    /// Persist the raw table of contents markdown.
    pub fn write_toc(
        &self,
        toc: &TableOfContents,
        stem: &str,
    ) -> Result<PathBuf, PipelineError> {
        let path = self.root.join(TOC_DIR).join(format!("{}_toc.md", stem));
        fs::write(&path, &toc.raw)?;
        Ok(path)
    }

    /// Load the raw table of contents markdown, if present.
    pub fn load_toc(&self, stem: &str) -> Result<Option<String>, PipelineError> {
        let path = self.root.join(TOC_DIR).join(format!("{}_toc.md", stem));
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    /// Persist the final integrated report.
    pub fn write_report(
        &self,
        content: &str,
        stem: &str,
        depth: Depth,
    ) -> Result<PathBuf, PipelineError> {
        let path = self
            .root
            .join(REPORT_DIR)
            .join(format!("{}_integrated_{}.md", stem, depth));
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Persist the run audit trail.
    pub fn write_run_summary<T: Serialize>(&self, summary: &T) -> Result<PathBuf, PipelineError> {
        let path = self.root.join("run_summary.json");
        write_json(&path, summary)?;
        Ok(path)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    debug!("Persisted {}", path.display());
    Ok(())
}

fn render_markdown<T: Serialize>(
    title: &str,
    meta: T,
    content: &str,
) -> Result<String, PipelineError> {
    let meta_json = serde_json::to_string(&meta)?;
    Ok(format!(
        "# {}\n\n{}{} -->\n\n{}\n",
        title, META_MARKER, meta_json, content
    ))
}

/// Split a markdown artifact into its metadata JSON and body.
fn split_markdown(contents: &str) -> Option<(&str, &str)> {
    let marker_start = contents.find(META_MARKER)?;
    let after_marker = &contents[marker_start + META_MARKER.len()..];
    let marker_end = after_marker.find(" -->")?;
    let meta_json = &after_marker[..marker_end];
    let body = after_marker[marker_end + " -->".len()..].trim_start_matches('\n');
    Some((meta_json, body.trim_end_matches('\n')))
}

fn meta_only() -> serde_json::Value {
    serde_json::json!({ "type": "meta_summary" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_domain::UnitStatus;
    use tempfile::TempDir;

    fn store() -> (TempDir, ArtifactStore) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.ensure_layout().unwrap();
        (dir, store)
    }

    #[test]
    fn test_layout_creates_stage_dirs() {
        let (dir, _store) = store();
        for sub in ["toc", "chunks", "knowledge", "summaries", "meta_summary", "report"] {
            assert!(dir.path().join(sub).is_dir());
        }
    }

    #[test]
    fn test_knowledge_round_trip_sorted() {
        let (_dir, store) = store();

        // Write out of order; load must sort by chunk index.
        for index in [2, 0, 1] {
            let point =
                KnowledgePoint::succeeded(index, true, vec![format!("point {}", index)], 10);
            store.write_knowledge(&point, Depth::Standard).unwrap();
        }

        let points = store.load_knowledge_points(Depth::Standard).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(
            points.iter().map(|p| p.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(points[2].points, vec!["point 2".to_string()]);
    }

    #[test]
    fn test_knowledge_files_are_depth_scoped() {
        let (_dir, store) = store();
        let point = KnowledgePoint::succeeded(0, true, vec!["a".to_string()], 1);
        store.write_knowledge(&point, Depth::Standard).unwrap();

        assert!(store
            .load_knowledge_points(Depth::Detailed)
            .unwrap()
            .is_empty());
        assert_eq!(store.load_knowledge_points(Depth::Standard).unwrap().len(), 1);
    }

    #[test]
    fn test_interval_summary_round_trip() {
        let (_dir, store) = store();
        let summary = IntervalSummary {
            interval_index: 1,
            chunk_start: 5,
            chunk_end: 9,
            content: "## Key ideas\n\n- one\n- two".to_string(),
            status: UnitStatus::Succeeded,
            degraded_chunks: vec![7],
        };
        store.write_interval_summary(&summary, Depth::Standard).unwrap();

        let loaded = store.load_interval_summaries(Depth::Standard).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], summary);
    }

    #[test]
    fn test_failed_interval_round_trip() {
        let (_dir, store) = store();
        let summary = IntervalSummary {
            interval_index: 0,
            chunk_start: 0,
            chunk_end: 4,
            content: String::new(),
            status: UnitStatus::Failed("oracle timed out".to_string()),
            degraded_chunks: Vec::new(),
        };
        store.write_interval_summary(&summary, Depth::Standard).unwrap();

        let loaded = store.load_interval_summaries(Depth::Standard).unwrap();
        assert_eq!(loaded[0].status.failure_reason(), Some("oracle timed out"));
        assert!(loaded[0].content.is_empty());
    }

    #[test]
    fn test_meta_summary_round_trip() {
        let (_dir, store) = store();
        let meta = MetaSummary {
            content: "# Overview\n\nEverything connects.".to_string(),
        };
        store.write_meta_summary(&meta, Depth::Standard, "mybook").unwrap();

        let loaded = store
            .load_meta_summary(Depth::Standard, "mybook")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.content, meta.content);
    }

    #[test]
    fn test_missing_meta_summary_is_none() {
        let (_dir, store) = store();
        assert!(store
            .load_meta_summary(Depth::Standard, "nothing")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_toc_round_trip() {
        let (_dir, store) = store();
        let toc = TableOfContents::parse_markdown("- Chapter 1\n- Chapter 2\n");
        store.write_toc(&toc, "mybook").unwrap();

        assert_eq!(store.load_toc("mybook").unwrap().unwrap(), toc.raw);
        assert!(store.load_toc("otherbook").unwrap().is_none());
    }

    #[test]
    fn test_chunk_and_report_files_land_in_layout() {
        let (dir, store) = store();
        let chunk = Chunk {
            index: 0,
            text: "text".to_string(),
            char_start: 0,
            char_end: 4,
            overlap_with_previous: 0,
        };
        store.write_chunk(&chunk).unwrap();
        store.write_report("# Report", "mybook", Depth::Standard).unwrap();

        assert!(dir.path().join("chunks/chunk_0000.json").is_file());
        assert!(dir
            .path()
            .join("report/mybook_integrated_standard.md")
            .is_file());
    }
}
