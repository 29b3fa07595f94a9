//! Lectern Pipeline
//!
//! The chunking, parallel-analysis, and progressive-summarization core.
//!
//! # Overview
//!
//! The pipeline turns a long document into a multi-granularity digest:
//! overlapping chunks are analyzed concurrently by a language-model oracle,
//! the per-chunk knowledge points are folded into interval summaries at a
//! configurable cadence, and the interval summaries are folded into one
//! meta-summary. Every unit persists to disk as soon as it completes.
//!
//! # Architecture
//!
//! ```text
//! text → Chunker → Analysis Pool → Interval Summarizer → Meta-Summarizer
//!                       │                  │                    │
//!                       └────────── ArtifactStore ──────────────┘
//! ```
//!
//! Stages are separated by drain barriers: all chunk analysis reaches a
//! terminal status before any interval is summarized, and all intervals
//! are terminal before the meta step runs. Both pools share one
//! `max_parallel` cap. A single failing unit degrades only itself; the
//! meta-summary call is the one fatal oracle dependency.
//!
//! # Example
//!
//! ```no_run
//! use lectern_pipeline::{ArtifactStore, Pipeline, PipelineConfig};
//! use lectern_llm::MockModel;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = Arc::new(MockModel::new(
//!     r#"{"has_content": true, "knowledge": ["a point"]}"#,
//! ));
//! let artifacts = ArtifactStore::new("book_analysis/mybook");
//! let pipeline = Pipeline::new(model, PipelineConfig::default(), artifacts, "mybook")?;
//!
//! let output = pipeline.run("the document text...", None).await?;
//! println!(
//!     "{} chunks, {} intervals",
//!     output.chunks.len(),
//!     output.interval_summaries.len()
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod artifacts;
mod chunker;
mod config;
mod error;
mod parser;
mod pipeline;
mod progress;
mod prompt;
mod shutdown;
mod summarizer;


pub use analyzer::ChunkAnalyzer;
pub use artifacts::ArtifactStore;
pub use chunker::split;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use parser::{parse_analysis_response, ChunkFindings};
pub use pipeline::{Pipeline, PipelineOutput};
pub use progress::{ProgressSnapshot, ProgressTracker, StageKind};
pub use prompt::{interval_summary_prompt, meta_summary_prompt, AnalysisPromptBuilder};
pub use shutdown::ShutdownFlag;
pub use summarizer::{partition_intervals, Summarizer};
