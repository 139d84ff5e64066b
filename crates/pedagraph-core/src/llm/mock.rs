//! Mock LLM provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::provider::{CompletionRequest, CompletionResponse, LlmProvider, TokenUsage};
use crate::{Error, Result};

/// A scripted outcome returned by [`MockLlmProvider`].
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Respond with this text.
    Respond(String),
    /// Fail with [`Error::RateLimited`].
    RateLimited,
    /// Fail with a generic [`Error::Llm`].
    Fail(String),
}

type Responder = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;

enum Script {
    Cycle { outcomes: Vec<MockOutcome>, index: usize },
    Responder(Arc<Responder>),
}

/// Mock LLM provider that returns canned outcomes.
///
/// Useful for testing without making actual API calls. Clones share the
/// script and the call counter.
#[derive(Clone)]
pub struct MockLlmProvider {
    script: Arc<Mutex<Script>>,
    calls: Arc<AtomicUsize>,
}

impl MockLlmProvider {
    /// Creates a mock provider with canned text responses.
    ///
    /// Responses are returned in order. After all responses are used,
    /// the provider cycles back to the first response.
    ///
    /// # Examples
    ///
    /// ```
    /// use pedagraph_core::llm::MockLlmProvider;
    ///
    /// let provider = MockLlmProvider::new(vec![
    ///     r#"{"classification": "PREREQUISITE"}"#.to_string(),
    ///     r#"{"classification": "ANALOGY"}"#.to_string(),
    /// ]);
    /// assert_eq!(provider.call_count(), 0);
    /// ```
    pub fn new(responses: Vec<String>) -> Self {
        Self::from_outcomes(responses.into_iter().map(MockOutcome::Respond).collect())
    }

    /// Creates a mock provider with a single response.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Creates a mock provider cycling through scripted outcomes.
    pub fn from_outcomes(outcomes: Vec<MockOutcome>) -> Self {
        Self::with_script(Script::Cycle { outcomes, index: 0 })
    }

    /// Creates a mock provider that always reports a rate limit.
    pub fn always_rate_limited() -> Self {
        Self::from_outcomes(vec![MockOutcome::RateLimited])
    }

    /// Creates a mock provider whose response depends on the request.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self::with_script(Script::Responder(Arc::new(responder)))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let outcome = {
            let mut script = self.script.lock().await;
            match &mut *script {
                Script::Cycle { outcomes, index } => {
                    let Some(outcome) = outcomes.get(*index).cloned() else {
                        return Err(Error::llm("mock provider has no scripted outcomes"));
                    };
                    *index = (*index + 1) % outcomes.len();
                    outcome
                }
                Script::Responder(responder) => match (responder.as_ref())(&request) {
                    Ok(text) => MockOutcome::Respond(text),
                    Err(e) => return Err(e),
                },
            }
        };

        match outcome {
            MockOutcome::Respond(content) => Ok(CompletionResponse {
                content,
                tokens_used: TokenUsage {
                    input: 10,
                    output: 5,
                },
            }),
            MockOutcome::RateLimited => Err(Error::rate_limited("mock rate limit")),
            MockOutcome::Fail(message) => Err(Error::llm(message)),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
