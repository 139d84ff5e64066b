//! Labeled knowledge graph for Pedagraph.
//!
//! This crate provides the multigraph store, JSON persistence, and the
//! online query path: concept matching, pedagogical subgraph selection,
//! and context rendering.
//!
//! # Key Abstractions
//!
//! - [`GraphData`]: petgraph-backed multigraph keyed by canonical node id,
//!   with one accessor for all edge instances between a pair
//! - [`RelationshipType`]: the four pedagogical categories plus the
//!   unclassified state
//! - [`select`]: prerequisite scaffolding, near transfer, and evidence
//! - [`answer_context`]: question in, rendered context or not-found out

pub mod formatter;
pub mod matcher;
pub mod persistence;
pub mod query;
pub mod selector;
pub mod stats;
pub mod types;

pub use formatter::{NO_DEFINITION, build_tutor_prompt, format_context};
pub use matcher::find_node;
pub use persistence::{GraphMetadata, SerializableGraph, load_graph, load_graph_from_str, save_graph};
pub use query::{ContextResponse, QueryOutcome, answer_context};
pub use selector::{
    DEFAULT_CHUNK_MARKER, Selection, SelectionStatus, SelectorConfig, is_chunk_reference,
    resolve_relationship, select,
};
pub use stats::{GraphStats, compute_stats};
pub use types::{Edge, EntityType, GraphData, Node, RelationshipType};
