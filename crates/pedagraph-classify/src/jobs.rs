//! Job extraction: one pass over the edges decides what needs a reasoning
//! call.

use crate::ledger::{Decision, LedgerEntry};
use pedagraph_core::clean_label;
use pedagraph_graph::{GraphData, RelationshipType, is_chunk_reference};

/// One edge instance awaiting a reasoning call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationJob {
    /// Launch position; drives the staggered start.
    pub index: usize,
    /// Source node id as stored.
    pub source: String,
    /// Target node id as stored.
    pub target: String,
    /// Multigraph instance key.
    pub key: u32,
    /// Source label as shown to the reasoning service.
    pub source_text: String,
    /// Target label as shown to the reasoning service.
    pub target_text: String,
    /// Relationship description (empty when the edge has none).
    pub description: String,
}

impl ClassificationJob {
    /// Ledger entry recording `classification` for this job's edge.
    pub fn entry(&self, classification: RelationshipType, decision: Decision) -> LedgerEntry {
        LedgerEntry::new(&self.source, &self.target, self.key, classification, decision)
    }
}

/// Outcome of scanning the graph.
#[derive(Clone, Debug, Default)]
pub struct JobPlan {
    /// Edges needing a reasoning call, in launch order.
    pub jobs: Vec<ClassificationJob>,
    /// EVIDENCE assignments from the chunk shortcut.
    pub structural: Vec<LedgerEntry>,
    /// Edges already carrying a terminal category.
    pub skipped: usize,
}

/// Whether an edge is a chunk reference and therefore EVIDENCE outright.
///
/// True when either endpoint id contains the marker, or the description
/// mentions a chunk identifier (`<marker>-...`).
pub fn is_structural_evidence(source: &str, target: &str, description: &str, marker: &str) -> bool {
    if is_chunk_reference(source, marker) || is_chunk_reference(target, marker) {
        return true;
    }
    let chunk_prefix = format!("{}-", marker.to_lowercase());
    !marker.is_empty() && description.to_lowercase().contains(&chunk_prefix)
}

/// Scan every edge instance once and split the work.
///
/// Edges with a terminal `relationship_type` are skipped. Chunk references
/// become structural EVIDENCE entries (not yet applied). Everything else is
/// a job.
pub fn plan_jobs(graph: &GraphData, description_key: &str, chunk_marker: &str) -> JobPlan {
    let mut plan = JobPlan::default();

    for edge in graph.iter_edges() {
        if edge.relationship_type.is_terminal() {
            plan.skipped += 1;
            continue;
        }

        let description = edge.text_attribute(description_key).unwrap_or_default();
        let source_text = clean_label(&edge.source);
        let target_text = clean_label(&edge.target);

        if is_structural_evidence(&source_text, &target_text, description, chunk_marker) {
            plan.structural.push(LedgerEntry::new(
                &edge.source,
                &edge.target,
                edge.key,
                RelationshipType::Evidence,
                Decision::Structural,
            ));
            continue;
        }

        plan.jobs.push(ClassificationJob {
            index: plan.jobs.len(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            key: edge.key,
            source_text,
            target_text,
            description: description.to_string(),
        });
    }

    tracing::info!(
        total = graph.edge_count(),
        skipped = plan.skipped,
        structural = plan.structural.len(),
        jobs = plan.jobs.len(),
        "Planned classification"
    );
    plan
}
