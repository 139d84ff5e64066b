//! Reasoning client: text-completion provider abstractions and implementations.

mod mock;
mod openai;
mod provider;

pub use mock::{MockLlmProvider, MockOutcome};
pub use openai::{DEFAULT_BASE_URL, OpenAiProvider};
pub use provider::{
    CompletionRequest, CompletionResponse, LlmProvider, Message, Role, TokenUsage,
};
