//! Classification prompt and response parsing.

use crate::jobs::ClassificationJob;
use pedagraph_core::llm::CompletionRequest;
use pedagraph_core::{Error, Result};
use pedagraph_graph::RelationshipType;

/// JSON field the reasoning service must answer with.
pub const CLASSIFICATION_FIELD: &str = "classification";

/// Instruction sent with every classification request.
pub const SYSTEM_PROMPT: &str = "You are an expert curriculum designer. \
Classify the relationship between two concepts into EXACTLY ONE category:\n\
1. PREREQUISITE (Source is fundamental to or required for Target)\n\
2. COMPONENT (Target is a part, step, or specific type of Source)\n\
3. ANALOGY (The concepts are peers, similar, or contrasting)\n\
4. EVIDENCE (Target is a specific example, resource, or text chunk)\n\n\
Respond with valid JSON only: {\"classification\": \"CATEGORY\"}";

/// User message describing one edge.
pub fn user_message(job: &ClassificationJob) -> String {
    format!(
        "Source: \"{}\"\nTarget: \"{}\"\nDescription: \"{}\"",
        job.source_text, job.target_text, job.description
    )
}

/// Deterministic request for one job.
pub fn build_request(job: &ClassificationJob, max_tokens: u32) -> CompletionRequest {
    CompletionRequest::system_and_user(SYSTEM_PROMPT, user_message(job))
        .with_temperature(0.0)
        .with_max_tokens(max_tokens)
        .with_json_response()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as "json".
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a reasoning response into one of the four categories.
///
/// Accepts `{"classification": "..."}` (optionally inside a code fence)
/// or a bare category name. Case is ignored.
///
/// # Errors
///
/// Returns `Error::Parse` for anything else, including `UNCLASSIFIED` and
/// unknown category names.
pub fn parse_classification(text: &str) -> Result<RelationshipType> {
    let body = strip_code_fence(text);

    let label = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get(CLASSIFICATION_FIELD)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::parse(format!("response has no '{CLASSIFICATION_FIELD}' field: {body}"))
            })?,
        Err(_) => body.to_string(),
    };

    RelationshipType::parse_terminal(&label)
        .ok_or_else(|| Error::parse(format!("unknown classification '{label}'")))
}
