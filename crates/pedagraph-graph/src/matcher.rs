//! Concept matching: map a free-text question to a graph node.
//!
//! Concept identifiers in a curriculum graph are distinct technical terms,
//! so plain substring containment is precise enough. The longest matching
//! identifier wins because longer names are more specific
//! ("LOGISTIC REGRESSION" over "REGRESSION").

use crate::GraphData;
use pedagraph_core::normalize_id;

/// Find the node best matching `query`.
///
/// A node is a candidate when its normalized id is contained in the
/// normalized query or vice versa. Returns the candidate with the longest
/// id; ties go to the node inserted first. Returns `None` for an empty
/// query or when nothing matches.
pub fn find_node(graph: &GraphData, query: &str) -> Option<String> {
    let query = normalize_id(query);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<&str> = None;
    for id in graph.node_ids() {
        if id.is_empty() {
            continue;
        }
        if !(query.contains(id) || id.contains(query.as_str())) {
            continue;
        }
        if best.is_none_or(|b| id.chars().count() > b.chars().count()) {
            best = Some(id);
        }
    }

    log::debug!("Matched query '{query}' to {best:?}");
    best.map(String::from)
}
