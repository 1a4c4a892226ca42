use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{ApiError, Result};
use crate::services::open_library::truncate_chars;

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// A generative model that answers a prompt with JSON shaped by `output_schema`.
///
/// `Ok(None)` means the model produced no output at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionCapability: Send + Sync {
    async fn complete(&self, prompt: &str, output_schema: &Value) -> Result<Option<Value>>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Completion capability backed by an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ApiError::ConfigError("Completion API key is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    fn build_request<'a>(
        &'a self,
        prompt: &str,
        output_schema: &Value,
    ) -> ChatCompletionRequest<'a> {
        let system_message = ChatMessage {
            role: "system".to_string(),
            content: format!(
                "Respond with a single JSON object that conforms to this JSON Schema:\n{}",
                output_schema
            ),
        };
        let user_message = ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        };

        ChatCompletionRequest {
            model: &self.model,
            messages: vec![system_message, user_message],
            temperature: 0.7,
            response_format: serde_json::json!({ "type": "json_object" }),
        }
    }
}

#[async_trait]
impl CompletionCapability for ChatCompletionClient {
    async fn complete(&self, prompt: &str, output_schema: &Value) -> Result<Option<Value>> {
        debug!(model = %self.model, "Sending completion request");
        let request = self.build_request(prompt, output_schema);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion API error: {} {}", status.as_u16(), body);
            return Err(ApiError::ExternalServiceError(format!(
                "Completion request failed ({}): {}",
                status.as_u16(),
                truncate_chars(&body, MAX_ERROR_BODY_CHARS)
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::TransportError(e.to_string()))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::UpstreamContractError(format!("Failed to parse completion response: {}", e))
        })?;

        structured_output(parsed)
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn structured_output(response: ChatCompletionResponse) -> Result<Option<Value>> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty());

    let Some(content) = content else {
        return Ok(None);
    };

    serde_json::from_str(strip_code_fence(&content))
        .map(Some)
        .map_err(|e| {
            ApiError::UpstreamContractError(format!(
                "Model output is not valid JSON: {}. Raw: {}",
                e,
                truncate_chars(&content, MAX_ERROR_BODY_CHARS)
            ))
        })
}
