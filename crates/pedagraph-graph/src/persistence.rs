//! Graph persistence.
//!
//! Graphs are stored as JSON: a flat list of nodes and a flat list of edge
//! instances, plus optional run metadata. Writes are atomic (staging file
//! then rename) so a source graph is never partially overwritten.

use crate::{Edge, GraphData, Node};
use pedagraph_core::util::files::write_atomic;
use pedagraph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Serializable types
// ============================================================================

/// Serializable representation of graph data.
///
/// The petgraph graph is rebuilt on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializableGraph {
    /// Whether edge orientation is meaningful.
    #[serde(default)]
    pub directed: bool,
    /// All nodes in the graph.
    pub nodes: Vec<Node>,
    /// All edge instances in the graph.
    pub edges: Vec<Edge>,
    /// Optional metadata about the graph.
    #[serde(default)]
    pub metadata: Option<GraphMetadata>,
}

/// Metadata about a persisted graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the file was written (RFC 3339).
    pub built_at: String,
    /// Version of the writer.
    pub builder_version: String,
    /// Edges modified by the classification run that produced this file.
    #[serde(default)]
    pub classified_edges: Option<usize>,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            built_at: chrono::Utc::now().to_rfc3339(),
            builder_version: env!("CARGO_PKG_VERSION").to_string(),
            classified_edges: None,
        }
    }
}

impl From<&GraphData> for SerializableGraph {
    fn from(graph: &GraphData) -> Self {
        Self {
            directed: graph.is_directed(),
            nodes: graph.iter_nodes().cloned().collect(),
            edges: graph.iter_edges().cloned().collect(),
            metadata: None,
        }
    }
}

// ============================================================================
// Save / Load
// ============================================================================

/// Save a graph to a JSON file, atomically.
pub fn save_graph(
    graph: &GraphData,
    path: impl AsRef<Path>,
    metadata: Option<GraphMetadata>,
) -> Result<()> {
    let serializable = SerializableGraph {
        metadata,
        ..SerializableGraph::from(graph)
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| Error::serialization(format!("Failed to serialize graph: {e}")))?;

    write_atomic(path.as_ref(), json.as_bytes())?;
    log::info!(
        "Saved graph ({} nodes, {} edges) to {}",
        graph.node_count(),
        graph.edge_count(),
        path.as_ref().display()
    );
    Ok(())
}

/// Load a graph from a JSON file.
pub fn load_graph(path: impl AsRef<Path>) -> Result<GraphData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;

    load_graph_from_str(&json)
}

/// Load a graph from a JSON string.
///
/// Useful for testing or loading from non-file sources.
pub fn load_graph_from_str(json: &str) -> Result<GraphData> {
    let serializable: SerializableGraph = serde_json::from_str(json)
        .map_err(|e| Error::parse(format!("Failed to parse graph JSON: {e}")))?;

    Ok(to_graph_data(serializable))
}

/// Convert serializable format to GraphData.
///
/// Node ids are normalized; edges referencing missing nodes are dropped.
fn to_graph_data(serializable: SerializableGraph) -> GraphData {
    let mut graph = GraphData::new(serializable.directed);

    for node in serializable.nodes {
        graph.add_node(node);
    }

    let mut dropped = 0usize;
    for edge in serializable.edges {
        if graph.add_edge(edge).is_err() {
            dropped += 1;
        }
    }
    if dropped > 0 {
        log::warn!("Dropped {dropped} edge(s) referencing missing nodes");
    }

    graph
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use tempfile::tempdir;

    fn create_test_graph() -> GraphData {
        let mut graph = GraphData::new(false);

        graph.add_node(
            Node::new("composite functions")
                .with_entity_type(EntityType::Concept)
                .with_description("Functions built from functions"),
        );
        graph.add_node(Node::new("chain rule").with_entity_type(EntityType::Concept));

        graph
            .add_edge(
                Edge::new("composite functions", "chain rule")
                    .with_description("strict prerequisite")
                    .with_relationship(RelationshipType::Prerequisite)
                    .with_weight(10.0),
            )
            .unwrap();
        graph
            .add_edge(Edge::new("composite functions", "chain rule"))
            .unwrap();

        graph
    }

    #[test]
    fn test_save_and_load_graph() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let original = create_test_graph();
        save_graph(&original, &path, None).unwrap();

        let loaded = load_graph(&path).unwrap();

        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.edge_count(), 2);
        assert!(!loaded.is_directed());
        let edge = loaded
            .find_edge("COMPOSITE FUNCTIONS", "CHAIN RULE", 0)
            .unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::Prerequisite);
        assert_eq!(edge.weight, Some(10.0));
        assert_eq!(
            loaded
                .find_edge("COMPOSITE FUNCTIONS", "CHAIN RULE", 1)
                .unwrap()
                .relationship_type,
            RelationshipType::Unclassified
        );
    }

    #[test]
    fn test_save_with_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let metadata = GraphMetadata {
            classified_edges: Some(42),
            ..Default::default()
        };
        save_graph(&create_test_graph(), &path, Some(metadata)).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"classified_edges\": 42"));
    }

    #[test]
    fn test_load_graph_from_str_normalizes_and_defaults() {
        let json = r#"{
            "nodes": [
                {"id": "\"Logistic Regression\"", "entity_type": "concept", "description": "A classifier"},
                {"id": "chunk-0a1b", "entity_type": "chunk"}
            ],
            "edges": [
                {"source": "\"Logistic Regression\"", "target": "chunk-0a1b", "d5": "mentioned in chunk-0a1b"}
            ]
        }"#;

        let graph = load_graph_from_str(json).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains_node("LOGISTIC REGRESSION"));
        assert_eq!(
            graph.get_node("chunk-0a1b").unwrap().entity_type,
            EntityType::Unknown
        );

        let edge = graph.find_edge("LOGISTIC REGRESSION", "CHUNK-0A1B", 0).unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::Unclassified);
        assert_eq!(edge.text_attribute("d5"), Some("mentioned in chunk-0a1b"));
    }

    #[test]
    fn test_duplicate_keys_are_reassigned_on_load() {
        let json = r#"{
            "nodes": [{"id": "a"}, {"id": "b"}],
            "edges": [
                {"source": "a", "target": "b"},
                {"source": "a", "target": "b"}
            ]
        }"#;
        let graph = load_graph_from_str(json).unwrap();
        assert!(graph.find_edge("a", "b", 0).is_some());
        assert!(graph.find_edge("a", "b", 1).is_some());
    }

    #[test]
    fn test_round_trip_preserves_extra_attributes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("round_trip.json");

        let mut original = GraphData::new(true);
        original.add_node(Node::new("a").with_source("chunk-1"));
        original.add_node(Node::new("b"));
        original
            .add_edge(Edge::new("a", "b").with_attribute("order", 2))
            .unwrap();

        save_graph(&original, &path, None).unwrap();
        let loaded = load_graph(&path).unwrap();

        assert!(loaded.is_directed());
        assert_eq!(loaded.get_node("a").unwrap().source_id.as_deref(), Some("chunk-1"));
        let edge = loaded.find_edge("a", "b", 0).unwrap();
        assert_eq!(edge.attributes.get("order"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_load_graph_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_graph(&path);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_load_graph_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_graph(dir.path().join("missing.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_edges_with_missing_nodes_are_dropped() {
        let json = r#"{
            "nodes": [{"id": "a"}],
            "edges": [{"source": "a", "target": "missing"}]
        }"#;

        let graph = load_graph_from_str(json).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_lowercase_label_is_loaded() {
        let json = r#"{
            "directed": false,
            "nodes": [{"id": "a"}, {"id": "b"}],
            "edges": [{"source": "a", "target": "b", "relationship_type": "prerequisite"}]
        }"#;
        let graph = load_graph_from_str(json).unwrap();
        let edge = graph.find_edge("A", "B", 0).unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::Prerequisite);

        let sel = crate::select(&graph, "b", &crate::SelectorConfig::default()).unwrap();
        assert_eq!(sel.prerequisites, vec!["A"]);
    }

    #[test]
    fn test_unknown_label_survives_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.json");
        let json = r#"{
            "nodes": [{"id": "a"}, {"id": "b"}],
            "edges": [{"source": "a", "target": "b", "relationship_type": "Related To"}]
        }"#;

        save_graph(&load_graph_from_str(json).unwrap(), &path, None).unwrap();
        let reloaded = load_graph(&path).unwrap();
        let edge = reloaded.find_edge("A", "B", 0).unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::Unclassified);
        assert_eq!(edge.text_attribute(Edge::RAW_LABEL_KEY), Some("Related To"));
    }

    #[test]
    fn test_metadata_default() {
        let meta = GraphMetadata::default();
        assert!(!meta.built_at.is_empty());
        assert!(!meta.builder_version.is_empty());
        assert!(meta.classified_edges.is_none());
    }
}
