//! Core graph types: nodes, edges, relationship categories, and the
//! multigraph store.

use pedagraph_core::{Error, Result, normalize_id};
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Entity / relationship categories
// ============================================================================

/// Kind of vertex in the knowledge graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A learnable idea.
    Concept,
    /// Supporting material (document, page, chunk).
    Resource,
    /// A worked instance of a concept.
    Example,
    /// Anything the extractor could not type.
    #[default]
    #[serde(other)]
    Unknown,
}

impl EntityType {
    /// Lowercase name as persisted.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Resource => "resource",
            Self::Example => "example",
            Self::Unknown => "unknown",
        }
    }
}

/// Pedagogical category of an edge.
///
/// Serialized as the upper-case name; deserialized through [`FromStr`], so
/// persisted labels are matched case-insensitively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RelationshipType {
    /// Source is fundamental to / required for target.
    Prerequisite,
    /// Target is a part, step, or specific type of source.
    Component,
    /// Peers, similar, or contrasting concepts.
    Analogy,
    /// Target is an example, resource, or text chunk backing source.
    Evidence,
    /// Not yet classified.
    #[default]
    Unclassified,
}

impl RelationshipType {
    /// Upper-case name as persisted.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prerequisite => "PREREQUISITE",
            Self::Component => "COMPONENT",
            Self::Analogy => "ANALOGY",
            Self::Evidence => "EVIDENCE",
            Self::Unclassified => "UNCLASSIFIED",
        }
    }

    /// Whether the edge has been classified.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unclassified)
    }

    /// Whether the edge contributes to the prerequisite scaffolding chain.
    pub fn is_scaffolding(&self) -> bool {
        matches!(self, Self::Prerequisite | Self::Component)
    }

    /// Parse one of the four terminal category names, ignoring case and
    /// surrounding whitespace/quotes.
    pub fn parse_terminal(raw: &str) -> Option<Self> {
        match raw.parse::<Self>() {
            Ok(rel) if rel.is_terminal() => Some(rel),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelationshipType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_id(s).as_str() {
            "PREREQUISITE" => Ok(Self::Prerequisite),
            "COMPONENT" => Ok(Self::Component),
            "ANALOGY" => Ok(Self::Analogy),
            "EVIDENCE" => Ok(Self::Evidence),
            "UNCLASSIFIED" => Ok(Self::Unclassified),
            other => Err(Error::parse(format!("unknown relationship type '{other}'"))),
        }
    }
}

impl TryFrom<String> for RelationshipType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// ============================================================================
// Node
// ============================================================================

/// A vertex of the knowledge graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Canonical identifier (see [`normalize_id`]).
    pub id: String,
    /// Entity kind.
    #[serde(default)]
    pub entity_type: EntityType,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Text chunk(s) the node was extracted from.
    #[serde(default)]
    pub source_id: Option<String>,
    /// Any further attributes carried by the source format.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Node {
    /// Create a node; the id is normalized.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: normalize_id(id.as_ref()),
            entity_type: EntityType::Unknown,
            description: None,
            source_id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the entity type.
    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the source chunk id.
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

// ============================================================================
// Edge
// ============================================================================

/// A typed relationship between two nodes.
///
/// `(source, target, key)` identifies one edge instance; parallel edges
/// between the same pair differ by `key`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeRecord")]
pub struct Edge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Multigraph instance key.
    #[serde(default)]
    pub key: u32,
    /// Extraction rationale.
    #[serde(default)]
    pub description: Option<String>,
    /// Pedagogical category.
    #[serde(default)]
    pub relationship_type: RelationshipType,
    /// Relationship strength reported by extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    /// Any further attributes carried by the source format.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// On-disk shape of an edge before its label is interpreted.
#[derive(Deserialize)]
struct EdgeRecord {
    source: String,
    target: String,
    #[serde(default)]
    key: u32,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    relationship_type: Option<serde_json::Value>,
    #[serde(default)]
    weight: Option<f32>,
    #[serde(flatten)]
    attributes: BTreeMap<String, serde_json::Value>,
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        let mut attributes = record.attributes;
        let relationship_type = match record.relationship_type {
            None | Some(serde_json::Value::Null) => RelationshipType::Unclassified,
            Some(raw) => match raw.as_str().map(str::parse::<RelationshipType>) {
                Some(Ok(rel)) => rel,
                _ => {
                    log::warn!("Keeping unrecognized relationship label {raw} as an attribute");
                    attributes.insert(Edge::RAW_LABEL_KEY.to_string(), raw);
                    RelationshipType::Unclassified
                }
            },
        };
        Self {
            source: record.source,
            target: record.target,
            key: record.key,
            description: record.description,
            relationship_type,
            weight: record.weight,
            attributes,
        }
    }
}

impl Edge {
    /// Name of the dedicated description field.
    pub const DESCRIPTION_KEY: &'static str = "description";

    /// Attribute holding a persisted label that names no known category.
    pub const RAW_LABEL_KEY: &'static str = "relationship_label";

    /// Create an unclassified edge; endpoint ids are normalized.
    pub fn new(source: impl AsRef<str>, target: impl AsRef<str>) -> Self {
        Self {
            source: normalize_id(source.as_ref()),
            target: normalize_id(target.as_ref()),
            key: 0,
            description: None,
            relationship_type: RelationshipType::Unclassified,
            weight: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the relationship type.
    pub fn with_relationship(mut self, relationship: RelationshipType) -> Self {
        self.relationship_type = relationship;
        self
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Attach a free-form attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// String value of the attribute named `key`, including the dedicated
    /// description field.
    pub fn text_attribute(&self, key: &str) -> Option<&str> {
        if key == Self::DESCRIPTION_KEY {
            return self.description.as_deref();
        }
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// All string-valued attributes, description first.
    pub fn string_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.description
            .as_deref()
            .map(|d| (Self::DESCRIPTION_KEY, d))
            .into_iter()
            .chain(
                self.attributes
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s))),
            )
    }
}

// ============================================================================
// GraphData
// ============================================================================

/// In-memory labeled multigraph.
///
/// Node weights are [`Node`]s, edge weights are [`Edge`]s. Parallel edges
/// are kept. When `directed` is false, every edge is adjacent to both of its
/// endpoints regardless of stored orientation.
#[derive(Clone, Debug)]
pub struct GraphData {
    /// The underlying petgraph graph.
    pub graph: DiGraph<Node, Edge>,
    /// Canonical id → node index.
    pub node_indices: HashMap<String, NodeIndex>,
    directed: bool,
}

impl Default for GraphData {
    fn default() -> Self {
        Self::new(false)
    }
}

impl GraphData {
    /// Create an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            directed,
        }
    }

    /// Whether edge orientation is meaningful.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Insert a node, replacing the attributes of an existing node with the
    /// same canonical id.
    pub fn add_node(&mut self, mut node: Node) -> NodeIndex {
        node.id = normalize_id(&node.id);
        if let Some(&idx) = self.node_indices.get(&node.id) {
            self.graph[idx] = node;
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Insert an edge between existing nodes and return its key.
    ///
    /// The edge keeps its `key` unless another edge between the same
    /// (source, target) pair already uses it, in which case the next free
    /// key is assigned.
    pub fn add_edge(&mut self, mut edge: Edge) -> Result<u32> {
        edge.source = normalize_id(&edge.source);
        edge.target = normalize_id(&edge.target);
        let from = self.index_of(&edge.source)?;
        let to = self.index_of(&edge.target)?;

        let existing: Vec<u32> = self
            .graph
            .edges_connecting(from, to)
            .map(|e| e.weight().key)
            .collect();
        if existing.contains(&edge.key) {
            edge.key = existing.iter().max().map_or(0, |k| k + 1);
        }

        let key = edge.key;
        self.graph.add_edge(from, to, edge);
        Ok(key)
    }

    /// Look up a node by (un-normalized) id.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.node_indices
            .get(&normalize_id(id))
            .map(|&idx| &self.graph[idx])
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_indices.contains_key(&normalize_id(id))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|n| n.id.as_str())
    }

    /// Nodes in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Edges in insertion order.
    pub fn iter_edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edge instances.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Find the edge instance `(source, target, key)` as stored.
    pub fn find_edge(&self, source: &str, target: &str, key: u32) -> Option<&Edge> {
        self.find_edge_index(source, target, key)
            .map(|idx| &self.graph[idx])
    }

    /// Mutable access to the edge instance `(source, target, key)`.
    pub fn find_edge_mut(&mut self, source: &str, target: &str, key: u32) -> Option<&mut Edge> {
        let idx = self.find_edge_index(source, target, key)?;
        Some(&mut self.graph[idx])
    }

    fn find_edge_index(&self, source: &str, target: &str, key: u32) -> Option<EdgeIndex> {
        let from = *self.node_indices.get(&normalize_id(source))?;
        let to = *self.node_indices.get(&normalize_id(target))?;
        self.graph
            .edges_connecting(from, to)
            .find(|e| e.weight().key == key)
            .map(|e| e.id())
    }

    /// All edge instances between `a` and `b`.
    ///
    /// For undirected graphs this includes edges stored in either
    /// orientation; for directed graphs only `a → b`.
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<&Edge> {
        let (Some(&ia), Some(&ib)) = (
            self.node_indices.get(&normalize_id(a)),
            self.node_indices.get(&normalize_id(b)),
        ) else {
            return Vec::new();
        };

        let mut edges: Vec<&Edge> = self
            .graph
            .edges_connecting(ia, ib)
            .map(|e| e.weight())
            .collect();
        if !self.directed && ia != ib {
            edges.extend(self.graph.edges_connecting(ib, ia).map(|e| e.weight()));
        }
        edges
    }

    /// Edge instances linking `neighbor` to `node` in the backward
    /// (dependency) direction: `neighbor → node` for directed graphs, any
    /// orientation otherwise.
    pub fn edges_into(&self, node: &str, neighbor: &str) -> Vec<&Edge> {
        self.edges_between(neighbor, node)
    }

    /// Distinct adjacent node ids (either orientation), in insertion order,
    /// excluding the node itself.
    pub fn neighbors(&self, id: &str) -> Result<Vec<String>> {
        let idx = self.index_of(id)?;
        Ok(self.collect_neighbors(idx, &[Direction::Outgoing, Direction::Incoming]))
    }

    /// Distinct nodes from which an edge points at `id` (directed graphs);
    /// all adjacent nodes for undirected graphs.
    pub fn incoming_neighbors(&self, id: &str) -> Result<Vec<String>> {
        let idx = self.index_of(id)?;
        if self.directed {
            Ok(self.collect_neighbors(idx, &[Direction::Incoming]))
        } else {
            Ok(self.collect_neighbors(idx, &[Direction::Outgoing, Direction::Incoming]))
        }
    }

    fn collect_neighbors(&self, idx: NodeIndex, directions: &[Direction]) -> Vec<String> {
        let mut indices: Vec<NodeIndex> = directions
            .iter()
            .flat_map(|&dir| self.graph.neighbors_directed(idx, dir))
            .filter(|&n| n != idx)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .map(|n| self.graph[n].id.clone())
            .collect()
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex> {
        self.node_indices
            .get(&normalize_id(id))
            .copied()
            .ok_or_else(|| Error::not_found(format!("node '{id}'")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphData {
        let mut g = GraphData::new(false);
        g.add_node(Node::new("a").with_entity_type(EntityType::Concept));
        g.add_node(Node::new("b"));
        g.add_node(Node::new("c"));
        g.add_edge(Edge::new("a", "b").with_description("a before b"))
            .unwrap();
        g.add_edge(Edge::new("c", "a")).unwrap();
        g
    }

    #[test]
    fn test_node_ids_are_normalized() {
        let mut g = GraphData::new(false);
        g.add_node(Node::new("\"Chain Rule\""));
        assert!(g.contains_node("chain rule"));
        assert_eq!(g.get_node("CHAIN RULE").unwrap().id, "CHAIN RULE");
    }

    #[test]
    fn test_add_node_replaces_existing() {
        let mut g = GraphData::new(false);
        let first = g.add_node(Node::new("x"));
        let second = g.add_node(Node::new("X").with_description("enriched"));
        assert_eq!(first, second);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.get_node("x").unwrap().description.as_deref(), Some("enriched"));
    }

    #[test]
    fn test_add_edge_missing_node() {
        let mut g = GraphData::new(false);
        g.add_node(Node::new("a"));
        let err = g.add_edge(Edge::new("a", "ghost")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parallel_edges_get_distinct_keys() {
        let mut g = sample();
        let k1 = g.add_edge(Edge::new("a", "b")).unwrap();
        let k2 = g.add_edge(Edge::new("a", "b")).unwrap();
        assert_eq!((k1, k2), (1, 2));
        assert_eq!(g.edges_between("a", "b").len(), 3);
        assert!(g.find_edge("a", "b", 2).is_some());
        assert!(g.find_edge("a", "b", 3).is_none());
    }

    #[test]
    fn test_explicit_key_is_kept() {
        let mut g = sample();
        let mut edge = Edge::new("b", "c");
        edge.key = 7;
        assert_eq!(g.add_edge(edge).unwrap(), 7);
        assert!(g.find_edge("b", "c", 7).is_some());
    }

    #[test]
    fn test_edges_between_undirected_sees_both_orientations() {
        let g = sample();
        assert_eq!(g.edges_between("b", "a").len(), 1);
        assert_eq!(g.edges_between("a", "c").len(), 1);
    }

    #[test]
    fn test_edges_between_directed_respects_orientation() {
        let mut g = GraphData::new(true);
        g.add_node(Node::new("a"));
        g.add_node(Node::new("b"));
        g.add_edge(Edge::new("a", "b")).unwrap();
        assert_eq!(g.edges_between("a", "b").len(), 1);
        assert!(g.edges_between("b", "a").is_empty());
        assert_eq!(g.edges_into("b", "a").len(), 1);
    }

    #[test]
    fn test_neighbors_in_insertion_order() {
        let g = sample();
        assert_eq!(g.neighbors("a").unwrap(), vec!["B", "C"]);
        assert_eq!(g.neighbors("b").unwrap(), vec!["A"]);
        assert!(g.neighbors("ghost").is_err());
    }

    #[test]
    fn test_incoming_neighbors_directed() {
        let mut g = GraphData::new(true);
        for id in ["a", "b", "c"] {
            g.add_node(Node::new(id));
        }
        g.add_edge(Edge::new("a", "b")).unwrap();
        g.add_edge(Edge::new("b", "c")).unwrap();
        assert_eq!(g.incoming_neighbors("b").unwrap(), vec!["A"]);
        assert_eq!(g.neighbors("b").unwrap(), vec!["A", "C"]);
    }

    #[test]
    fn test_find_edge_mut_updates_relationship() {
        let mut g = sample();
        g.find_edge_mut("a", "b", 0).unwrap().relationship_type = RelationshipType::Evidence;
        assert_eq!(
            g.find_edge("a", "b", 0).unwrap().relationship_type,
            RelationshipType::Evidence
        );
    }

    #[test]
    fn test_relationship_parse() {
        assert_eq!(
            "prerequisite".parse::<RelationshipType>().unwrap(),
            RelationshipType::Prerequisite
        );
        assert_eq!(
            RelationshipType::parse_terminal(" \"Evidence\" "),
            Some(RelationshipType::Evidence)
        );
        assert_eq!(RelationshipType::parse_terminal("UNCLASSIFIED"), None);
        assert!("related_to".parse::<RelationshipType>().is_err());
    }

    #[test]
    fn test_relationship_serde_names() {
        let json = serde_json::to_string(&RelationshipType::Component).unwrap();
        assert_eq!(json, "\"COMPONENT\"");
        let parsed: RelationshipType = serde_json::from_str("\"ANALOGY\"").unwrap();
        assert_eq!(parsed, RelationshipType::Analogy);
    }

    #[test]
    fn test_relationship_deserializes_any_case() {
        let parsed: RelationshipType = serde_json::from_str("\"prerequisite\"").unwrap();
        assert_eq!(parsed, RelationshipType::Prerequisite);
        assert!(serde_json::from_str::<RelationshipType>("\"related_to\"").is_err());
    }

    #[test]
    fn test_edge_keeps_unknown_label() {
        let edge: Edge = serde_json::from_str(
            r#"{"source": "A", "target": "B", "relationship_type": "related_to"}"#,
        )
        .unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::Unclassified);
        assert_eq!(edge.text_attribute(Edge::RAW_LABEL_KEY), Some("related_to"));

        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["relationship_type"], "UNCLASSIFIED");
        assert_eq!(json[Edge::RAW_LABEL_KEY], "related_to");
    }

    #[test]
    fn test_edge_null_label_is_unclassified() {
        let edge: Edge =
            serde_json::from_str(r#"{"source": "A", "target": "B", "relationship_type": null}"#)
                .unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::Unclassified);
        assert!(edge.attributes.is_empty());
    }

    #[test]
    fn test_entity_type_unknown_fallback() {
        let parsed: EntityType = serde_json::from_str("\"misconception\"").unwrap();
        assert_eq!(parsed, EntityType::Unknown);
        let parsed: EntityType = serde_json::from_str("\"resource\"").unwrap();
        assert_eq!(parsed, EntityType::Resource);
    }

    #[test]
    fn test_edge_text_attributes() {
        let edge = Edge::new("a", "b")
            .with_description("why")
            .with_attribute("d5", "longer rationale")
            .with_attribute("weight_raw", 3);
        assert_eq!(edge.text_attribute("description"), Some("why"));
        assert_eq!(edge.text_attribute("d5"), Some("longer rationale"));
        assert_eq!(edge.text_attribute("weight_raw"), None);
        let keys: Vec<&str> = edge.string_attributes().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["description", "d5"]);
    }
}
