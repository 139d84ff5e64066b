//! Graph statistics.
//!
//! Summaries used to report on classification progress: how many edges
//! carry each category, how many are still unclassified, and the shape of
//! the graph around them.

use crate::{GraphData, RelationshipType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Statistics about a graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of nodes.
    pub node_count: usize,
    /// Total number of edge instances.
    pub edge_count: usize,
    /// Nodes per entity type.
    pub entity_type_distribution: BTreeMap<String, usize>,
    /// Edges per relationship type.
    pub relationship_distribution: BTreeMap<String, usize>,
    /// Edges still awaiting classification.
    pub unclassified_count: usize,
    /// Nodes without any edges.
    pub orphan_count: usize,
    /// Edge instances beyond the first between the same ordered pair.
    pub parallel_edge_count: usize,
    /// Average edges per node (in + out).
    pub avg_degree: f32,
}

impl GraphStats {
    /// Share of edges carrying a terminal category, in `[0, 1]`.
    pub fn classified_ratio(&self) -> f32 {
        if self.edge_count == 0 {
            return 1.0;
        }
        (self.edge_count - self.unclassified_count) as f32 / self.edge_count as f32
    }
}

/// Compute statistics for a graph.
pub fn compute_stats(graph: &GraphData) -> GraphStats {
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();

    let mut entity_type_distribution = BTreeMap::new();
    for node in graph.iter_nodes() {
        *entity_type_distribution
            .entry(node.entity_type.name().to_string())
            .or_insert(0) += 1;
    }

    let mut relationship_distribution = BTreeMap::new();
    let mut degrees: HashMap<&str, usize> = HashMap::new();
    let mut pairs: HashMap<(&str, &str), usize> = HashMap::new();
    for edge in graph.iter_edges() {
        *relationship_distribution
            .entry(edge.relationship_type.name().to_string())
            .or_insert(0) += 1;
        *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
        *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
        *pairs
            .entry((edge.source.as_str(), edge.target.as_str()))
            .or_insert(0) += 1;
    }

    let unclassified_count = relationship_distribution
        .get(RelationshipType::Unclassified.name())
        .copied()
        .unwrap_or(0);

    let orphan_count = graph
        .node_ids()
        .filter(|id| !degrees.contains_key(id))
        .count();

    let parallel_edge_count = pairs.values().map(|n| n - 1).sum();

    let avg_degree = if node_count > 0 {
        (2 * edge_count) as f32 / node_count as f32
    } else {
        0.0
    };

    GraphStats {
        node_count,
        edge_count,
        entity_type_distribution,
        relationship_distribution,
        unclassified_count,
        orphan_count,
        parallel_edge_count,
        avg_degree,
    }
}
