//! CLI argument definitions and parsing.

use crate::config::Config;
use clap::Parser;
use lectern_domain::Depth;
use lectern_pipeline::PipelineConfig;
use std::path::PathBuf;

/// Lectern - turn a long document into a structured, multi-granularity
/// digest.
#[derive(Debug, Parser)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File to analyze (.md, .txt, or .pdf)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Window size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Overlap between consecutive windows in characters
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Chunks per interval summary
    #[arg(long)]
    pub interval: Option<usize>,

    /// Concurrent oracle calls per pool stage
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Analysis depth
    #[arg(short, long, value_enum)]
    pub depth: Option<DepthArg>,

    /// Output root directory (a per-document subdirectory is created
    /// inside it)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// API endpoint base URL
    #[arg(long, env = "LECTERN_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Model identifier
    #[arg(long, env = "LECTERN_MODEL")]
    pub model: Option<String>,

    /// API key for the endpoint
    #[arg(long, env = "LECTERN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Merge CLI flags over the config file's run settings.
    pub fn pipeline_config(&self, config: &Config) -> PipelineConfig {
        PipelineConfig {
            chunk_size: self.chunk_size.unwrap_or(config.run.chunk_size),
            overlap: self.overlap.unwrap_or(config.run.overlap),
            interval: self.interval.unwrap_or(config.run.interval),
            max_parallel: self.workers.unwrap_or(config.run.workers),
            context_window: config.run.context_window,
            oracle_timeout_secs: config.run.oracle_timeout_secs,
            depth: self.depth.map(Into::into).unwrap_or(config.run.depth),
        }
    }
}

/// Analysis depth argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DepthArg {
    /// High-level concepts only
    Conceptual,
    /// Balanced coverage
    Standard,
    /// Fine-grained extraction
    Detailed,
}

impl From<DepthArg> for Depth {
    fn from(depth: DepthArg) -> Self {
        match depth {
            DepthArg::Conceptual => Depth::Conceptual,
            DepthArg::Standard => Depth::Standard,
            DepthArg::Detailed => Depth::Detailed,
        }
    }
}
