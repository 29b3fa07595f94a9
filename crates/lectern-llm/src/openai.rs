//! OpenAI-compatible provider
//!
//! Drives any chat-completions endpoint that speaks the OpenAI wire format
//! (OpenAI, Azure OpenAI, SiliconFlow, local gateways).
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Configurable endpoint, model, and request timeout
//! - Injected retry policy with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use lectern_llm::{OpenAiModel, RetryPolicy};
//!
//! let model = OpenAiModel::new("https://api.openai.com/v1", "sk-...", "gpt-4.1")
//!     .with_retry_policy(RetryPolicy::new(5, 500));
//! ```

use crate::{LlmError, RetryPolicy};
use async_trait::async_trait;
use lectern_domain::traits::LanguageModel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for one completion request (seconds). Summarization
/// prompts over large intervals can take a while.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenAI-compatible chat-completions provider.
pub struct OpenAiModel {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Response from the chat-completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiModel {
    /// Create a provider.
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g. `https://api.openai.com/v1`)
    /// - `api_key`: bearer token for the endpoint
    /// - `model`: model identifier (e.g. `gpt-4.1`)
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let Ok(client) = reqwest::Client::builder().timeout(timeout).build() {
            self.client = client;
        }
        self
    }

    /// The configured model identifier.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            stream: false,
        };

        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return parse_completion(response).await;
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

async fn parse_completion(response: reqwest::Response) -> Result<String, LlmError> {
    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let model = OpenAiModel::new("https://api.example.com/v1/", "key", "gpt-4.1");
        assert_eq!(model.endpoint, "https://api.example.com/v1");
        assert_eq!(model.model_name(), "gpt-4.1");
        assert_eq!(model.retry, RetryPolicy::default());
    }

    #[test]
    fn test_with_retry_policy() {
        let model = OpenAiModel::new("https://api.example.com/v1", "key", "gpt-4.1")
            .with_retry_policy(RetryPolicy::new(5, 250));
        assert_eq!(model.retry.max_attempts, 5);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        // Invalid port: the request fails without touching the network.
        let model = OpenAiModel::new("http://localhost:99999", "key", "gpt-4.1")
            .with_retry_policy(RetryPolicy::no_retry());

        let result = model.complete("test").await;
        match result {
            Err(LlmError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other.map(|_| ())),
        }
    }
}
