//! HTTP completion backend for OpenAI-compatible chat APIs

use crate::backends::CompletionBackend;
use crate::config::AiConfig;
use crate::error::{AiError, Result};
use crate::providers::ActiveProvider;
use crate::types::{ChatMessage, CompletionRequest};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of `POST {base}/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Calls the active provider over HTTP. One request per call, no retries.
pub struct HttpCompletionBackend {
    client: reqwest::Client,
}

impl HttpCompletionBackend {
    pub fn new(config: &AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeouts: {}", e);
                reqwest::Client::new()
            });
        Self { client }
    }

    fn endpoint(provider: &ActiveProvider) -> String {
        format!("{}/chat/completions", provider.base_url.trim_end_matches('/'))
    }
}

/// Classify a non-success status from the provider
fn status_error(provider: &ActiveProvider, status: StatusCode, body: &str) -> AiError {
    let name = provider.descriptor.display_name;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AiError::Auth {
            provider: name,
            env_var: provider.descriptor.credential_env_var,
        };
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return AiError::RateLimit { provider: name };
    }
    AiError::provider(name, format!("status {}: {}", status, body))
}

fn transport_error(provider: &ActiveProvider, err: reqwest::Error) -> AiError {
    let name = provider.descriptor.display_name;
    if err.is_timeout() {
        AiError::provider(name, "request timed out")
    } else {
        AiError::provider(name, err.to_string())
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn complete(
        &self,
        provider: &ActiveProvider,
        request: &CompletionRequest,
    ) -> Result<String> {
        let name = provider.descriptor.display_name;
        let body = ChatCompletionRequest {
            model: &provider.model,
            messages: &request.messages,
            temperature: request.settings.temperature,
            max_tokens: request.settings.max_tokens,
        };

        let url = Self::endpoint(provider);
        debug!("POST {} (model {})", url, provider.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(provider.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(provider, status, &error_text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::provider(name, format!("malformed response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::provider(name, "response contained no completion"))
    }
}
