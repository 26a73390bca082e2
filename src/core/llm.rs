use crate::config::LLMConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Hosted text-generation capability consumed by handlers
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<MessageContent>,
}

/// Providers return either a bare string or a list of typed content parts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// OpenAI-compatible chat-completions client with retry and key fallback
pub struct LLMClient {
    client: Client,
    api_keys: Vec<String>,
    active_key: AtomicUsize,
    config: LLMConfig,
}

impl LLMClient {
    /// Build a client; without a key every call fails instead of construction
    pub fn new(api_key: impl Into<Option<String>>, config: LLMConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for LLM")?;

        let api_keys: Vec<String> = api_key
            .into()
            .into_iter()
            .filter(|key| !key.trim().is_empty())
            .collect();
        if api_keys.is_empty() {
            tracing::warn!("[LLMClient] No API key configured; text generation is disabled");
        }

        Ok(Self {
            client,
            api_keys,
            active_key: AtomicUsize::new(0),
            config,
        })
    }

    pub fn with_secondary_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key {
            self.api_keys.push(key);
        }
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn current_key(&self) -> Result<&str> {
        let index = self.active_key.load(Ordering::Relaxed);
        self.api_keys
            .get(index.min(self.api_keys.len().saturating_sub(1)))
            .map(String::as_str)
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))
    }

    /// Advance to the next credential; false when none remain
    fn rotate_key(&self) -> bool {
        let current = self.active_key.load(Ordering::Relaxed);
        if current + 1 >= self.api_keys.len() {
            return false;
        }
        self.active_key
            .compare_exchange(current, current + 1, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let max_retries = self.config.max_retries.max(1);
        let mut retries = 0;
        let mut key_switched = false;
        let mut last_error = None;

        // A key switch sends the new key right away without spending a retry
        loop {
            if key_switched {
                key_switched = false;
            } else if retries > 0 {
                if retries >= max_retries {
                    break;
                }
                let delay = self.config.retry_base_delay_ms * 2_u64.pow(retries - 1);
                tracing::warn!(
                    "[LLMClient] Retrying API call (attempt {}/{}) after {}ms delay",
                    retries + 1,
                    max_retries,
                    delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let response_result = self
                .client
                .post(self.endpoint())
                .bearer_auth(self.current_key()?)
                .json(&request)
                .send()
                .await;

            let response = match response_result {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!("[LLMClient] HTTP request failed: {}", e);
                    last_error = Some(anyhow::anyhow!("HTTP request failed: {}", e));
                    retries += 1;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(
                    "[LLMClient] API returned error status {}: {}",
                    status,
                    error_text
                );
                let error = anyhow::anyhow!("API error {}: {}", status, error_text);

                if is_credential_error(status) {
                    if self.rotate_key() {
                        tracing::info!("[LLMClient] Primary key rejected, switching to secondary key");
                        last_error = Some(error);
                        key_switched = true;
                        continue;
                    }
                    return Err(error);
                }
                if status.is_client_error() {
                    return Err(error);
                }
                last_error = Some(error);
                retries += 1;
                continue;
            }

            let chat_response = match response.json::<ChatResponse>().await {
                Ok(cr) => cr,
                Err(e) => {
                    tracing::warn!("[LLMClient] Failed to decode response body: {}", e);
                    last_error = Some(anyhow::anyhow!("Response decode error: {}", e));
                    retries += 1;
                    continue;
                }
            };

            return Ok(chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .map(MessageContent::into_text)
                .unwrap_or_default()
                .trim()
                .to_string());
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("All retry attempts failed")))
    }
}

fn is_credential_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    )
}

#[async_trait]
impl TextGenerator for LLMClient {
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.chat(messages).await
    }
}
