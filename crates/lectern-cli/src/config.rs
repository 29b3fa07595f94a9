//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use lectern_domain::Depth;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, loadable from a TOML file.
///
/// Every field has a default, so an empty or missing file is valid; CLI
/// flags override whatever the file provides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language-model provider settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Default run parameters
    #[serde(default)]
    pub run: RunSettings,

    /// Output and display settings
    #[serde(default)]
    pub settings: Settings,
}

/// Provider connection settings. The API key never lives in the file; it
/// comes from the environment or a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
}

/// Default run parameters, mirroring [`lectern_pipeline::PipelineConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Window size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between windows in characters
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Chunks per interval summary
    #[serde(default = "default_interval")]
    pub interval: usize,

    /// Concurrent oracle calls per pool stage
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Prior-context window in characters
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Per-call oracle timeout in seconds
    #[serde(default = "default_oracle_timeout")]
    pub oracle_timeout_secs: u64,

    /// Analysis depth
    #[serde(default)]
    pub depth: Depth,
}

/// Output and display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored status output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Root directory for analysis output
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Seconds between progress lines
    #[serde(default = "default_progress_secs")]
    pub progress_secs: u64,
}

impl Config {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str(&contents).map_err(|e| {
                    CliError::Config(format!("Cannot parse {}: {}", path.display(), e))
                })
            }
            None => Ok(Self::default()),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            interval: default_interval(),
            workers: default_workers(),
            context_window: default_context_window(),
            oracle_timeout_secs: default_oracle_timeout(),
            depth: Depth::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            output_dir: default_output_dir(),
            progress_secs: default_progress_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_chunk_size() -> usize {
    5000
}

fn default_overlap() -> usize {
    500
}

fn default_interval() -> usize {
    5
}

fn default_workers() -> usize {
    3
}

fn default_context_window() -> usize {
    500
}

fn default_oracle_timeout() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("book_analysis")
}

fn default_progress_secs() -> u64 {
    2
}
