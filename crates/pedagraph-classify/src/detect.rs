//! Description-key detection.
//!
//! Graphs exported by different extraction tools store the relationship
//! rationale under different attribute names (`description`, `d5`, ...).
//! The first unclassified edge is used as the sample, or the first edge
//! when every edge is classified.

use pedagraph_core::{Error, Result};
use pedagraph_graph::{Edge, GraphData};

/// Find the attribute carrying the human-readable relationship description.
///
/// With `preferred` set, the sample edge must carry it as a string. Otherwise
/// `description` wins if present; failing that, the longest string attribute
/// whose value is not a chunk reference (`<marker>-...`).
///
/// # Errors
///
/// Returns a configuration error when the graph has no edges or no usable
/// attribute exists. The run must not proceed in that case.
pub fn detect_description_key(
    graph: &GraphData,
    preferred: Option<&str>,
    chunk_marker: &str,
) -> Result<String> {
    let sample = graph
        .iter_edges()
        .find(|e| !e.relationship_type.is_terminal())
        .or_else(|| graph.iter_edges().next())
        .ok_or_else(|| Error::config("graph has no edges; cannot detect a description key"))?;

    if let Some(key) = preferred {
        return match sample.text_attribute(key) {
            Some(_) => Ok(key.to_string()),
            None => Err(Error::config(format!(
                "configured description key '{key}' not found on edge {} -> {}",
                sample.source, sample.target
            ))),
        };
    }

    if sample.text_attribute(Edge::DESCRIPTION_KEY).is_some() {
        return Ok(Edge::DESCRIPTION_KEY.to_string());
    }

    let chunk_prefix = format!("{}-", chunk_marker.to_lowercase());
    let mut best: Option<(&str, usize)> = None;
    for (key, value) in sample.string_attributes() {
        if value.to_lowercase().contains(&chunk_prefix) {
            continue;
        }
        let len = value.chars().count();
        if len > 0 && best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((key, len));
        }
    }

    match best {
        Some((key, _)) => {
            tracing::info!(key, "Detected description key");
            Ok(key.to_string())
        }
        None => Err(Error::config(
            "no string attribute on the sample edge can serve as a description",
        )),
    }
}
