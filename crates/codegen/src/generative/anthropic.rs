//! Anthropic Messages API backend

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use screentest_common::config::RequestConfig;

use super::backend::{BackendError, Completion, CompletionBackend, CompletionRequest};

/// Longest error body kept in a status failure
const MAX_ERROR_BODY: usize = 320;

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Billed token counts; a response without them cannot be priced
#[derive(Debug, Deserialize)]
struct MessageUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<MessageContent>,
    usage: MessageUsage,
}

/// Completion backend speaking the Anthropic Messages API over HTTP
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    client: Client,
    endpoint: String,
    api_version: String,
}

impl AnthropicBackend {
    pub fn new(config: &RequestConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("screentest/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, BackendError> {
        let payload = json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": request.prompt,
                }
            ],
        });

        debug!(endpoint = %self.endpoint, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                code: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let text = body
            .content
            .iter()
            .filter(|part| part.content_type == "text")
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Completion {
            text,
            input_tokens: body.usage.input_tokens,
            output_tokens: body.usage.output_tokens,
        })
    }
}

fn transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout
    } else if error.is_builder() {
        BackendError::Request(error.to_string())
    } else {
        BackendError::Transport(error.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
