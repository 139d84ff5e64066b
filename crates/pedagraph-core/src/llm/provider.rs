//! The reasoning client contract: one request in, one text response out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Abstraction over text-completion services.
///
/// Implementations are stateless request/response clients. They signal an
/// explicit rate limit with [`Error::RateLimited`](crate::Error::RateLimited)
/// and any other failure with [`Error::Llm`](crate::Error::Llm).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one request and wait for the whole response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used for audit records.
    fn model(&self) -> &str;
}

/// A request to complete a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Instructions sent ahead of the messages.
    pub system_prompt: Option<String>,

    /// Messages, oldest first.
    pub messages: Vec<Message>,

    /// Completion budget.
    pub max_tokens: u32,

    /// Sampling temperature; `None` leaves the service default.
    pub temperature: Option<f32>,

    /// Ask the service to emit a single JSON object.
    pub json_response: bool,
}

impl CompletionRequest {
    /// Request over `messages` with a 1024-token budget.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            system_prompt: None,
            messages,
            max_tokens: 1024,
            temperature: None,
            json_response: false,
        }
    }

    /// Shorthand for the `complete(system_prompt, user_message)` shape used by
    /// the classifier.
    pub fn system_and_user(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(vec![Message::user(user)]).with_system_prompt(system)
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Requests a JSON object response.
    pub fn with_json_response(mut self) -> Self {
        self.json_response = true;
        self
    }

    /// Content of the last user message, if any.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote it.
    pub role: Role,

    /// Text body.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
}

/// Text returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Completion text.
    pub content: String,

    /// Reported usage.
    pub tokens_used: TokenUsage,
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input: u64,

    /// Completion tokens.
    pub output: u64,
}

impl TokenUsage {
    /// Prompt plus completion tokens.
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.content, "Hello");

        let asst_msg = Message::assistant("Hi there");
        assert_eq!(asst_msg.role, Role::Assistant);
    }

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::system_and_user("Classify", "Source: A")
            .with_max_tokens(15)
            .with_temperature(0.0)
            .with_json_response();

        assert_eq!(request.system_prompt.as_deref(), Some("Classify"));
        assert_eq!(request.max_tokens, 15);
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.json_response);
        assert_eq!(request.user_content(), Some("Source: A"));
    }

    #[test]
    fn test_user_content_picks_last_user_message() {
        let request = CompletionRequest::new(vec![
            Message::user("first"),
            Message::assistant("reply"),
            Message::user("second"),
        ]);
        assert_eq!(request.user_content(), Some("second"));
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input: 100,
            output: 5,
        };
        assert_eq!(usage.total(), 105);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("test content");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
