//! OpenAI-compatible chat completions provider.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role, TokenUsage};
use crate::{Error, Result};

/// Default API root for the chat completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// LLM provider speaking the OpenAI chat completions protocol.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token for the API
    /// * `model` - Model ID (e.g., "gpt-4o-mini")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at a compatible endpoint (proxy, local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bounds each request. A timed-out call fails like any transport error.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::llm_with_source("failed to build HTTP client", e))?;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        for message in &request.messages {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(serde_json::json!({ "role": role, "content": message.content }));
        }

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if request.json_response {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_body(&request);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::llm_with_source("Failed to call chat completions API", e))?;

        let status = response.status();
        tracing::debug!(model = %self.model, %status, "chat completion returned");
        if status == StatusCode::TOO_MANY_REQUESTS {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::rate_limited(format!("HTTP 429: {detail}")));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::llm(format!(
                "Chat completions API error {status}: {error_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::llm_with_source("Failed to parse chat completions response", e))?;

        let completion = parse_response_body(&response_body)?;
        tracing::debug!(tokens = completion.tokens_used.total(), "chat completion usage");
        Ok(completion)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Extract content and usage from a chat completions response body.
fn parse_response_body(body: &serde_json::Value) -> Result<CompletionResponse> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| Error::llm("Missing content in chat completions response"))?
        .to_string();

    // Usage is informative; compatible servers often omit it.
    let tokens_used = TokenUsage {
        input: body["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        output: body["usage"]["completion_tokens"].as_u64().unwrap_or(0),
    };

    Ok(CompletionResponse {
        content,
        tokens_used,
    })
}
