//! Configuration for the pipeline

use lectern_domain::Depth;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one pipeline run.
///
/// `max_parallel` bounds both worker-pool stages (chunk analysis and
/// interval summarization) with the same value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Window size in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive windows (must be smaller than
    /// `chunk_size`)
    pub overlap: usize,

    /// Chunks per interval-summary group
    pub interval: usize,

    /// Concurrency cap for both worker-pool stages
    pub max_parallel: usize,

    /// Characters of the previous chunk's tail passed as prior context to
    /// each analysis call; 0 disables context passing
    pub context_window: usize,

    /// Maximum time for a single oracle call (seconds)
    pub oracle_timeout_secs: u64,

    /// Analysis depth, forwarded opaquely into prompt selection
    pub depth: Depth,
}

impl PipelineConfig {
    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.overlap >= self.chunk_size {
            return Err(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            ));
        }
        if self.interval == 0 {
            return Err("interval must be greater than 0".to_string());
        }
        if self.max_parallel == 0 {
            return Err("max_parallel must be greater than 0".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Default configuration matching the CLI's documented defaults
    fn default() -> Self {
        Self {
            chunk_size: 5000,
            overlap: 500,
            interval: 5,
            max_parallel: 3,
            context_window: 500,
            oracle_timeout_secs: 120,
            depth: Depth::Standard,
        }
    }
}

impl PipelineConfig {
    /// Skim preset: larger windows, conceptual depth, fast passes
    pub fn skim() -> Self {
        Self {
            chunk_size: 10_000,
            overlap: 500,
            interval: 8,
            max_parallel: 4,
            context_window: 0,
            oracle_timeout_secs: 60,
            depth: Depth::Conceptual,
        }
    }

    /// Thorough preset: smaller windows, detailed depth, generous timeouts
    pub fn thorough() -> Self {
        Self {
            chunk_size: 3000,
            overlap: 600,
            interval: 4,
            max_parallel: 3,
            context_window: 800,
            oracle_timeout_secs: 300,
            depth: Depth::Detailed,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
