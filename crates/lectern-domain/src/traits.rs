//! Trait definitions for external interactions
//!
//! These traits define the boundary between the pipeline and its
//! infrastructure. Implementations live in other crates (lectern-llm).

use async_trait::async_trait;

/// The language-model oracle.
///
/// Every oracle capability the pipeline consumes (chunk analysis, interval
/// and meta summarization, table-of-contents extraction, report
/// integration) is a prompt template over this single seam. Calls may run
/// concurrently; implementations must be safely shareable across tasks.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Error type for oracle operations
    type Error;

    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}
