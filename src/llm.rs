//! Language-model completion providers.
//!
//! - **[`DisabledProvider`]** — no backend; callers use their deterministic fallback text.
//! - **[`OpenAiProvider`]** — calls an OpenAI-compatible `POST /chat/completions` endpoint.
//!
//! # Provider Selection
//!
//! ```rust,no_run
//! # use civiclang::config::LlmConfig;
//! # use civiclang::llm::create_provider;
//! let provider = create_provider(&LlmConfig::default()).unwrap(); // provider = "disabled"
//! assert!(!provider.is_enabled());
//! ```
//!
//! A configured `openai` provider without `OPENAI_API_KEY` in the
//! environment degrades to [`DisabledProvider`] so the assistant keeps
//! answering with its offline fallbacks.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A text-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Whether [`complete`](CompletionProvider::complete) can succeed at all.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Complete a conversation, returning the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

// ============ Disabled Provider ============

/// A provider with no backend. Every completion fails.
pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        bail!("Completion provider is disabled")
    }
}

// ============ OpenAI Provider ============

/// Chat-completions provider for the OpenAI API (or a compatible server
/// at `llm.base_url`).
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    endpoint: String,
}

impl OpenAiProvider {
    /// Create a provider from configuration and an API key.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_completion(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();

                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::warn!(%status, attempt, "completion request failed, retrying");
                        last_err = Some(anyhow::anyhow!(
                            "OpenAI API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "completion request failed, retrying");
                    last_err = Some(e.into());
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Completion failed after retries")))
    }
}

/// Extract `choices[0].message.content`, trimmed.
fn parse_completion(json: &serde_json::Value) -> Result<String> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid completion response: missing message content"))?;
    Ok(content.trim().to_string())
}

/// Create the provider named by the configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "openai" => match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                Ok(Arc::new(OpenAiProvider::new(config, key.trim().to_string())?))
            }
            _ => {
                tracing::warn!("OPENAI_API_KEY not set; using offline fallback replies");
                Ok(Arc::new(DisabledProvider))
            }
        },
        other => bail!("Unknown llm provider: {}", other),
    }
}

/// Complete with `provider`, or return `fallback()` when it is disabled.
///
/// Errors from an enabled provider propagate; the fallback only stands in
/// for a missing backend.
pub async fn complete_or_fallback<F>(
    provider: &dyn CompletionProvider,
    messages: &[ChatMessage],
    fallback: F,
) -> Result<String>
where
    F: FnOnce() -> String,
{
    if !provider.is_enabled() {
        return Ok(fallback());
    }
    provider.complete(messages).await
}
