//! Question answering entry point: match, select, format.

use crate::formatter::format_context;
use crate::matcher::find_node;
use crate::selector::{SelectorConfig, select};
use crate::GraphData;
use pedagraph_core::Result;
use serde::{Deserialize, Serialize};

/// Context assembled for a matched question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    /// Matched target concept.
    pub target: String,
    /// Scaffolding chain, most foundational first.
    pub prerequisites: Vec<String>,
    /// Near-transfer concepts.
    pub analogues: Vec<String>,
    /// Supporting resources and chunks.
    pub evidence: Vec<String>,
    /// Whether some visited nodes had no neighbors.
    pub degraded: bool,
    /// Rendered context block.
    pub context: String,
}

/// Result of answering a question against the graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// A concept matched and its context was assembled.
    Found(ContextResponse),
    /// No concept matched the question.
    NotFound {
        /// The question as asked.
        question: String,
    },
}

impl QueryOutcome {
    /// The response, if a concept matched.
    pub fn found(&self) -> Option<&ContextResponse> {
        match self {
            Self::Found(response) => Some(response),
            Self::NotFound { .. } => None,
        }
    }
}

/// Assemble the pedagogical context for `question`.
///
/// Not matching any concept is a [`QueryOutcome::NotFound`], not an error.
pub fn answer_context(
    graph: &GraphData,
    question: &str,
    config: &SelectorConfig,
) -> Result<QueryOutcome> {
    let Some(target) = find_node(graph, question) else {
        log::info!("No concept matched question '{question}'");
        return Ok(QueryOutcome::NotFound {
            question: question.to_string(),
        });
    };

    let selection = select(graph, &target, config)?;
    let context = format_context(graph, &selection);
    let degraded = selection.is_degraded();

    Ok(QueryOutcome::Found(ContextResponse {
        target: selection.target,
        prerequisites: selection.prerequisites,
        analogues: selection.analogues,
        evidence: selection.evidence,
        degraded,
        context,
    }))
}
