//! Pedagogical subgraph selection.
//!
//! Given a target concept, [`select`] gathers the context a tutor needs to
//! explain it:
//!
//! 1. **Scaffolding**: the transitive chain of PREREQUISITE / COMPONENT
//!    ancestors, found by a depth-first backward walk and listed root first.
//! 2. **Near transfer**: direct neighbors of the target joined by an
//!    ANALOGY edge (one hop, never transitive).
//! 3. **Evidence**: neighbors of any node selected so far that are joined
//!    by an EVIDENCE edge or are themselves text-chunk references. The scan
//!    covers the context as it stood before this step, so evidence is never
//!    collected through other evidence.
//!
//! Nodes without neighbors do not fail the query; they are reported in
//! [`SelectionStatus::Degraded`].

use crate::{Edge, GraphData, RelationshipType};
use pedagraph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default marker identifying text-chunk nodes.
pub const DEFAULT_CHUNK_MARKER: &str = "chunk";

/// Selector settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Substring (case-insensitive) marking text-chunk node ids.
    pub chunk_marker: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            chunk_marker: DEFAULT_CHUNK_MARKER.to_string(),
        }
    }
}

/// Whether `text` refers to a text chunk.
pub fn is_chunk_reference(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.to_lowercase().contains(&marker.to_lowercase())
}

/// Effective category of an edge.
///
/// A classified `relationship_type` wins. Otherwise any string attribute
/// whose whole value names one of the four categories is used, which covers
/// graphs labeled under a different attribute name. Anything else is
/// [`RelationshipType::Unclassified`].
pub fn resolve_relationship(edge: &Edge) -> RelationshipType {
    if edge.relationship_type.is_terminal() {
        return edge.relationship_type;
    }
    edge.string_attributes()
        .find_map(|(_, value)| RelationshipType::parse_terminal(value))
        .unwrap_or(RelationshipType::Unclassified)
}

/// Whether a selection saw the whole neighborhood it asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SelectionStatus {
    /// Every visited node had neighbors.
    Complete,
    /// Some visited nodes had no neighbors; fewer relations were discovered.
    Degraded {
        /// Nodes found without any neighbors.
        isolated: Vec<String>,
    },
}

/// The pedagogical context set for one query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Selection {
    /// Canonical id of the target node.
    pub target: String,
    /// Every selected node, target first, in discovery order.
    pub context: Vec<String>,
    /// Scaffolding chain, most foundational first.
    pub prerequisites: Vec<String>,
    /// One-hop ANALOGY neighbors of the target.
    pub analogues: Vec<String>,
    /// Supporting resources, examples, and chunks.
    pub evidence: Vec<String>,
    /// Completeness of the traversal.
    pub status: SelectionStatus,
}

impl Selection {
    /// Whether `id` is part of the context set.
    pub fn contains(&self, id: &str) -> bool {
        self.context.iter().any(|c| c == id)
    }

    /// Whether the traversal hit nodes without neighbors.
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, SelectionStatus::Degraded { .. })
    }
}

/// Insertion-ordered set of node ids.
#[derive(Default)]
struct ContextSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ContextSet {
    fn insert(&mut self, id: &str) -> bool {
        if self.members.insert(id.to_string()) {
            self.order.push(id.to_string());
            true
        } else {
            false
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }
}

/// Neighbor lookups that record isolated nodes instead of failing.
struct Traversal<'g> {
    graph: &'g GraphData,
    isolated: Vec<String>,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g GraphData) -> Self {
        Self {
            graph,
            isolated: Vec::new(),
        }
    }

    /// Neighbors of `id`; with `backward`, only those that may depend-point
    /// at it (see [`GraphData::incoming_neighbors`]).
    fn neighbors(&mut self, id: &str, backward: bool) -> Vec<String> {
        let all = self.graph.neighbors(id).unwrap_or_default();
        if all.is_empty() {
            if !self.isolated.iter().any(|i| i == id) {
                log::debug!("Node '{id}' has no neighbors");
                self.isolated.push(id.to_string());
            }
            return all;
        }
        if backward && self.graph.is_directed() {
            self.graph.incoming_neighbors(id).unwrap_or_default()
        } else {
            all
        }
    }

    fn into_status(self) -> SelectionStatus {
        if self.isolated.is_empty() {
            SelectionStatus::Complete
        } else {
            SelectionStatus::Degraded {
                isolated: self.isolated,
            }
        }
    }
}

/// Edges joining `a` and `b` in either orientation.
fn linking_edges<'g>(graph: &'g GraphData, a: &str, b: &str) -> Vec<&'g Edge> {
    let mut edges = graph.edges_between(a, b);
    if graph.is_directed() {
        edges.extend(graph.edges_between(b, a));
    }
    edges
}

/// Select the pedagogical subgraph around `target`.
///
/// # Errors
///
/// Returns `NotFound` if `target` is not a node of the graph. Sparse
/// neighborhoods never error.
pub fn select(graph: &GraphData, target: &str, config: &SelectorConfig) -> Result<Selection> {
    let target = graph
        .get_node(target)
        .ok_or_else(|| Error::not_found(format!("node '{target}'")))?
        .id
        .clone();

    let mut traversal = Traversal::new(graph);
    let mut context = ContextSet::default();
    context.insert(&target);

    // Scaffolding: depth-first backward walk over PREREQUISITE / COMPONENT.
    let mut visited: HashSet<String> = HashSet::from([target.clone()]);
    let mut stack = vec![target.clone()];
    let mut prerequisites = Vec::new();
    while let Some(current) = stack.pop() {
        for neighbor in traversal.neighbors(&current, true) {
            if visited.contains(&neighbor) {
                continue;
            }
            let scaffolds = graph
                .edges_into(&current, &neighbor)
                .into_iter()
                .any(|e| resolve_relationship(e).is_scaffolding());
            if scaffolds {
                visited.insert(neighbor.clone());
                context.insert(&neighbor);
                prerequisites.push(neighbor.clone());
                stack.push(neighbor);
            }
        }
    }
    prerequisites.reverse();

    // Near transfer: one hop over ANALOGY.
    let mut analogues = Vec::new();
    for neighbor in traversal.neighbors(&target, false) {
        if context.contains(&neighbor) {
            continue;
        }
        let analogous = linking_edges(graph, &target, &neighbor)
            .into_iter()
            .any(|e| resolve_relationship(e) == RelationshipType::Analogy);
        if analogous {
            context.insert(&neighbor);
            analogues.push(neighbor);
        }
    }

    // Evidence: one hop from the pre-evidence context.
    let mut evidence = Vec::new();
    let snapshot = context.order.clone();
    for node in &snapshot {
        for neighbor in traversal.neighbors(node, false) {
            if context.contains(&neighbor) {
                continue;
            }
            let supports = linking_edges(graph, node, &neighbor)
                .into_iter()
                .any(|e| resolve_relationship(e) == RelationshipType::Evidence)
                || is_chunk_reference(&neighbor, &config.chunk_marker);
            if supports {
                context.insert(&neighbor);
                evidence.push(neighbor);
            }
        }
    }

    log::debug!(
        "Selected {} node(s) for '{target}': {} prerequisite(s), {} analogue(s), {} evidence",
        context.order.len(),
        prerequisites.len(),
        analogues.len(),
        evidence.len()
    );

    Ok(Selection {
        target,
        context: context.order,
        prerequisites,
        analogues,
        evidence,
        status: traversal.into_status(),
    })
}
