//! Result ledger: the crash-safety checkpoint of a classification run.
//!
//! Every decision of a run (structural and reasoned) is flushed here before
//! the graph is mutated. Applying a ledger only sets `relationship_type` on
//! the addressed edges, so replaying it against the pre-run graph yields the
//! same graph an uninterrupted run would have produced.

use chrono::{DateTime, Utc};
use pedagraph_core::util::files::write_atomic;
use pedagraph_core::{Error, Result};
use pedagraph_graph::{GraphData, RelationshipType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How an entry's category was decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Chunk shortcut; no reasoning call was made.
    Structural,
    /// Parsed from a reasoning response.
    #[default]
    Reasoned,
    /// Retries exhausted; fell back to ANALOGY.
    Defaulted,
}

/// One classified edge instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Source node id as stored.
    pub source: String,
    /// Target node id as stored.
    pub target: String,
    /// Multigraph instance key.
    pub key: u32,
    /// Assigned category.
    pub classification: RelationshipType,
    /// How the category was decided.
    #[serde(default)]
    pub decision: Decision,
}

impl LedgerEntry {
    /// Create an entry.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        key: u32,
        classification: RelationshipType,
        decision: Decision,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            key,
            classification,
            decision,
        }
    }
}

/// The full result list of one classification run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultLedger {
    /// When the ledger was assembled.
    pub created_at: DateTime<Utc>,
    /// Model that produced the reasoned entries.
    pub model: String,
    /// Entries in decision order: structural first, then reasoned by job index.
    pub entries: Vec<LedgerEntry>,
}

impl ResultLedger {
    /// Create a ledger stamped now.
    pub fn new(model: impl Into<String>, entries: Vec<LedgerEntry>) -> Self {
        Self {
            created_at: Utc::now(),
            model: model.into(),
            entries,
        }
    }

    /// Durably write the ledger (staging file, fsync, rename).
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::serialization(format!("Failed to serialize ledger: {e}")))?;
        write_atomic(path.as_ref(), &json)?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = self.entries.len(),
            "Flushed result ledger"
        );
        Ok(())
    }

    /// Read a ledger written by [`ResultLedger::write`].
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        serde_json::from_str(&json)
            .map_err(|e| Error::parse(format!("Failed to parse ledger {}: {e}", path.display())))
    }

    /// Entries decided by the given route.
    pub fn count(&self, decision: Decision) -> usize {
        self.entries.iter().filter(|e| e.decision == decision).count()
    }
}

/// Write each entry's category onto its edge; returns the number applied.
///
/// Entries addressing a missing edge are logged and skipped.
pub fn apply_entries(graph: &mut GraphData, entries: &[LedgerEntry]) -> usize {
    let mut applied = 0;
    for entry in entries {
        match graph.find_edge_mut(&entry.source, &entry.target, entry.key) {
            Some(edge) => {
                edge.relationship_type = entry.classification;
                applied += 1;
            }
            None => tracing::warn!(
                source = %entry.source,
                target = %entry.target,
                key = entry.key,
                "Ledger entry has no matching edge"
            ),
        }
    }
    applied
}

/// Reapply a flushed ledger, e.g. after a crash between flush and save.
pub fn replay(graph: &mut GraphData, ledger: &ResultLedger) -> usize {
    let applied = apply_entries(graph, &ledger.entries);
    tracing::info!(applied, total = ledger.entries.len(), "Replayed ledger");
    applied
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pedagraph_graph::{Edge, Node};
    use tempfile::tempdir;

    fn graph() -> GraphData {
        let mut g = GraphData::new(false);
        g.add_node(Node::new("a"));
        g.add_node(Node::new("b"));
        g.add_edge(Edge::new("a", "b")).unwrap();
        g.add_edge(Edge::new("a", "b")).unwrap();
        g
    }

    fn ledger() -> ResultLedger {
        ResultLedger::new(
            "mock",
            vec![
                LedgerEntry::new("A", "B", 0, RelationshipType::Prerequisite, Decision::Reasoned),
                LedgerEntry::new("A", "B", 1, RelationshipType::Analogy, Decision::Defaulted),
            ],
        )
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let original = ledger();
        original.write(&path).unwrap();
        let loaded = ResultLedger::read(&path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.count(Decision::Defaulted), 1);
    }

    #[test]
    fn test_read_missing_ledger() {
        let dir = tempdir().unwrap();
        let err = ResultLedger::read(dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_entry_without_decision_defaults_to_reasoned() {
        let entry: LedgerEntry = serde_json::from_str(
            r#"{"source": "A", "target": "B", "key": 0, "classification": "EVIDENCE"}"#,
        )
        .unwrap();
        assert_eq!(entry.decision, Decision::Reasoned);
        assert_eq!(entry.classification, RelationshipType::Evidence);
    }

    #[test]
    fn test_apply_entries_respects_keys() {
        let mut g = graph();
        let applied = apply_entries(&mut g, &ledger().entries);

        assert_eq!(applied, 2);
        assert_eq!(
            g.find_edge("A", "B", 0).unwrap().relationship_type,
            RelationshipType::Prerequisite
        );
        assert_eq!(
            g.find_edge("A", "B", 1).unwrap().relationship_type,
            RelationshipType::Analogy
        );
    }

    #[test]
    fn test_apply_skips_missing_edges() {
        let mut g = graph();
        let entries = vec![LedgerEntry::new(
            "A",
            "B",
            7,
            RelationshipType::Evidence,
            Decision::Structural,
        )];
        assert_eq!(apply_entries(&mut g, &entries), 0);
    }

    #[test]
    fn test_replay_is_idempotent() {
        let mut once = graph();
        replay(&mut once, &ledger());
        let mut twice = once.clone();
        replay(&mut twice, &ledger());

        let a: Vec<_> = once.iter_edges().map(|e| e.relationship_type).collect();
        let b: Vec<_> = twice.iter_edges().map(|e| e.relationship_type).collect();
        assert_eq!(a, b);
    }
}
