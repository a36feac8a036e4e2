use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, error, info};

mod error;
mod response;
mod tests;

pub use error::AIError;
pub use response::normalize_generated;
use response::{ChatMessage, ChatRequest, ChatResponse};

use crate::config::AIConfig;
use crate::prompt::Prompt;

pub const SYSTEM_PROMPT: &str =
    "You are a senior software engineer specialized in writing comprehensive test suites.";

/// A text-generation backend. One request per call, no retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AIError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAIClient {
    client: reqwest::Client,
    config: AIConfig,
}

impl OpenAIClient {
    pub fn new(config: AIConfig) -> Result<Self, AIError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    fn headers(&self) -> Result<HeaderMap, AIError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| AIError::AuthenticationError(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> Result<String, AIError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => (),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(AIError::RateLimitError("Rate limit exceeded".to_string()));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(AIError::AuthenticationError("Invalid API key".to_string()));
            }
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(AIError::APIError(format!(
                    "Unexpected status code: {} - Response: {}",
                    status, error_body
                )));
            }
        }

        let response_text = response.text().await?;
        debug!("Raw completion response: {} bytes", response_text.len());

        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            AIError::ParseError(format!("Failed to parse API response: {}", e))
        })?;
        parsed.into_text()
    }
}

/// Sends `prompt` and returns normalized test code, or `None` when the
/// request failed. Failures are logged here and never propagated.
pub async fn generate(client: &dyn CompletionClient, prompt: &Prompt) -> Option<String> {
    match client.complete(prompt.text()).await {
        Ok(text) => {
            let normalized = normalize_generated(&text);
            if normalized.is_empty() {
                error!(
                    "Failed to generate test cases for {}: empty response",
                    prompt.target().display()
                );
                return None;
            }
            info!(
                "Generated {} characters of test code for {}",
                normalized.len(),
                prompt.target().display()
            );
            Some(normalized)
        }
        Err(e) => {
            error!("API request failed: {}", e);
            None
        }
    }
}
