//! Lectern LLM Provider Layer
//!
//! Pluggable implementations of the `LanguageModel` trait from
//! `lectern-domain`.
//!
//! # Providers
//!
//! - `MockModel`: deterministic mock for testing, with failure injection
//!   and concurrency observation
//! - `OpenAiModel`: OpenAI-compatible chat-completions API over HTTP
//!
//! # Examples
//!
//! ```
//! use lectern_llm::MockModel;
//! use lectern_domain::traits::LanguageModel;
//!
//! # async fn example() {
//! let model = MockModel::new("Hello from the model!");
//! let result = model.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from the model!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod retry;

use async_trait::async_trait;
use lectern_domain::traits::LanguageModel;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiModel;
pub use retry::RetryPolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Default)]
struct CallGauges {
    calls: usize,
    in_flight: usize,
    max_in_flight: usize,
}

/// Mock language model for deterministic testing.
///
/// Returns pre-configured responses without any network calls. Responses
/// and injected failures are keyed by prompt substring, since pipeline
/// prompts embed chunk text. The mock also records every prompt it
/// receives and tracks how many calls were in flight at once, so tests
/// can assert call ordering and concurrency bounds.
///
/// # Examples
///
/// ```
/// use lectern_llm::MockModel;
/// use lectern_domain::traits::LanguageModel;
///
/// # async fn example() {
/// let mut model = MockModel::new("default");
/// model.add_response("chapter one", "summary of chapter one");
/// model.fail_containing("chapter two");
///
/// assert_eq!(
///     model.generate("analyze chapter one please").await.unwrap(),
///     "summary of chapter one"
/// );
/// assert!(model.generate("analyze chapter two please").await.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockModel {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, String)>>>,
    failures: Arc<Mutex<Vec<String>>>,
    latency: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
    gauges: Arc<Mutex<CallGauges>>,
}

impl MockModel {
    /// Create a mock that returns `response` for every prompt.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
            latency: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
            gauges: Arc::new(Mutex::new(CallGauges::default())),
        }
    }

    /// Make every call sleep for `latency` before responding, to exercise
    /// real task interleaving in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Return `response` for any prompt containing `needle`. Earlier
    /// registrations win.
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((needle.into(), response.into()));
    }

    /// Fail any prompt containing `needle`.
    pub fn fail_containing(&mut self, needle: impl Into<String>) {
        self.failures.lock().unwrap().push(needle.into());
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.gauges.lock().unwrap().calls
    }

    /// Highest number of calls observed in flight simultaneously.
    pub fn max_in_flight(&self) -> usize {
        self.gauges.lock().unwrap().max_in_flight
    }

    /// All prompts received so far, in arrival order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Reset call counters and the recorded prompt log.
    pub fn reset_counters(&self) {
        *self.gauges.lock().unwrap() = CallGauges::default();
        self.prompts.lock().unwrap().clear();
    }

    fn enter(&self, prompt: &str) {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut gauges = self.gauges.lock().unwrap();
        gauges.calls += 1;
        gauges.in_flight += 1;
        gauges.max_in_flight = gauges.max_in_flight.max(gauges.in_flight);
    }

    fn exit(&self) {
        self.gauges.lock().unwrap().in_flight -= 1;
    }

    fn lookup(&self, prompt: &str) -> Result<String, LlmError> {
        let failures = self.failures.lock().unwrap();
        if failures.iter().any(|n| prompt.contains(n.as_str())) {
            // The message deliberately does not echo the needle, so a
            // failure reason carried into a later prompt cannot re-trigger
            // the same injection.
            return Err(LlmError::Other("Injected mock failure".to_string()));
        }
        drop(failures);

        let responses = self.responses.lock().unwrap();
        if let Some((_, response)) = responses.iter().find(|(n, _)| prompt.contains(n.as_str())) {
            return Ok(response.clone());
        }
        Ok(self.default_response.clone())
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.enter(prompt);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let result = self.lookup(prompt);
        self.exit();
        result
    }
}
