//! Handler functions for graph CLI commands.
//!
//! These functions implement `classify`, `recover`, `query`, and `stats`.
//! Paths given on the command line override the configured artifacts.

use pedagraph_classify::{ClassificationReport, ClassifierConfig, EdgeClassifier, ResultLedger, replay};
use pedagraph_core::llm::{LlmProvider, OpenAiProvider};
use pedagraph_core::{Artifact, ConfigProvider, Error, Result};
use pedagraph_graph::{
    GraphData, GraphMetadata, QueryOutcome, SelectorConfig, answer_context, build_tutor_prompt,
    compute_stats, load_graph, save_graph,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::PedagraphConfig;

// ============================================================================
// Option types
// ============================================================================

/// Options for `classify`.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Input graph path.
    pub input: Option<String>,
    /// Output graph path.
    pub output: Option<String>,
    /// Ledger path.
    pub ledger: Option<String>,
}

/// Options for `recover`.
#[derive(Debug, Clone, Default)]
pub struct RecoverOptions {
    /// Ledger path.
    pub ledger: Option<String>,
    /// Pre-run graph path.
    pub input: Option<String>,
    /// Output graph path.
    pub output: Option<String>,
}

/// How `query` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryFormat {
    /// The rendered context block.
    #[default]
    Text,
    /// The full outcome as JSON.
    Json,
    /// The tutoring prompt wrapping the context.
    Prompt,
}

// ============================================================================
// Helpers
// ============================================================================

fn resolve_path<C: ConfigProvider>(
    explicit: Option<&str>,
    config: &C,
    artifact: Artifact,
) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(PathBuf::from(p)),
        None => config.artifact_path(artifact),
    }
}

/// Absolute form of `path` for identity checks. The parent directory is
/// canonicalized so the file itself need not exist yet.
fn comparable_path(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if comparable_path(input) == comparable_path(output) {
        return Err(Error::config(format!(
            "output path {} must differ from the input graph",
            output.display()
        )));
    }
    Ok(())
}

fn print_report(report: &ClassificationReport) {
    println!("Classification finished:");
    println!("  Modified:    {}", report.modified);
    println!("  Structural:  {}", report.structural);
    println!("  Reasoned:    {}", report.reasoned);
    println!("  Defaulted:   {}", report.defaulted);
    println!("  Skipped:     {}", report.skipped);
    if let Some(key) = &report.description_key {
        println!("  Description: {key}");
    }
    if report.ledger.is_some() {
        println!("  Ledger:      {}", report.ledger_path.display());
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Classify a graph file with the configured reasoning service.
pub async fn handle_classify(config: &PedagraphConfig, options: ClassifyOptions) -> Result<()> {
    let mut classifier_config = config.classifier_config()?;
    if let Some(ledger) = options.ledger {
        classifier_config.ledger_path = PathBuf::from(ledger);
    }

    let provider = OpenAiProvider::new(config.api_key()?, &config.llm.model)
        .with_base_url(&config.llm.base_url)
        .with_timeout(Duration::from_secs(config.llm.timeout_secs))?;

    let input = resolve_path(options.input.as_deref(), config, Artifact::SourceGraph)?;
    let output = resolve_path(options.output.as_deref(), config, Artifact::ClassifiedGraph)?;

    let report = classify_file(&input, &output, Arc::new(provider), classifier_config).await?;
    print_report(&report);
    println!("\nGraph saved to: {}", output.display());
    Ok(())
}

/// Load `input`, classify it, and save the result to `output`.
///
/// The source graph is never overwritten.
pub async fn classify_file(
    input: &Path,
    output: &Path,
    provider: Arc<dyn LlmProvider>,
    classifier_config: ClassifierConfig,
) -> Result<ClassificationReport> {
    ensure_distinct(input, output)?;
    let mut graph = load_graph(input)?;

    let report = EdgeClassifier::new(provider, classifier_config)
        .classify_all(&mut graph)
        .await?;

    let metadata = GraphMetadata {
        classified_edges: Some(report.modified),
        ..Default::default()
    };
    save_graph(&graph, output, Some(metadata))?;
    Ok(report)
}

/// Replay a ledger onto the pre-run graph and save the result.
pub async fn handle_recover<C: ConfigProvider>(config: &C, options: RecoverOptions) -> Result<()> {
    let ledger_path = resolve_path(options.ledger.as_deref(), config, Artifact::Ledger)?;
    let input = resolve_path(options.input.as_deref(), config, Artifact::SourceGraph)?;
    let output = resolve_path(options.output.as_deref(), config, Artifact::ClassifiedGraph)?;

    let applied = recover_file(&ledger_path, &input, &output)?;
    println!("Replayed {applied} ledger entries from {}", ledger_path.display());
    println!("Graph saved to: {}", output.display());
    Ok(())
}

/// File-level recovery; returns the number of entries applied.
pub fn recover_file(ledger_path: &Path, input: &Path, output: &Path) -> Result<usize> {
    ensure_distinct(input, output)?;
    let ledger = ResultLedger::read(ledger_path)?;
    let mut graph = load_graph(input)?;

    let applied = replay(&mut graph, &ledger);
    if applied < ledger.entries.len() {
        tracing::warn!(
            applied,
            total = ledger.entries.len(),
            "Some ledger entries did not match an edge; was the right input graph given?"
        );
    }

    let metadata = GraphMetadata {
        classified_edges: Some(applied),
        ..Default::default()
    };
    save_graph(&graph, output, Some(metadata))?;
    Ok(applied)
}

/// Answer a question against a graph file.
pub async fn handle_query<C: ConfigProvider>(
    config: &C,
    selector: &SelectorConfig,
    question: &str,
    graph: Option<&str>,
    format: QueryFormat,
) -> Result<()> {
    let path = resolve_path(graph, config, Artifact::ClassifiedGraph)?;
    let graph = load_graph(&path)?;

    let outcome = answer_context(&graph, question, selector)?;
    if let QueryOutcome::Found(response) = &outcome {
        if response.degraded {
            eprintln!("(some concepts had no neighbors; context may be incomplete)");
        }
    }
    println!("{}", render_outcome(&outcome, question, format)?);
    Ok(())
}

/// Render a query outcome for the terminal.
pub fn render_outcome(outcome: &QueryOutcome, question: &str, format: QueryFormat) -> Result<String> {
    if format == QueryFormat::Json {
        return serde_json::to_string_pretty(outcome)
            .map_err(|e| Error::serialization(format!("Failed to serialize outcome: {e}")));
    }

    match outcome {
        QueryOutcome::Found(response) => Ok(match format {
            QueryFormat::Prompt => build_tutor_prompt(question, &response.context),
            _ => response.context.clone(),
        }),
        QueryOutcome::NotFound { question } => {
            Ok(format!("No concept in the graph matches \"{question}\"."))
        }
    }
}

/// Print statistics for a graph file.
pub async fn handle_stats<C: ConfigProvider>(config: &C, graph: Option<&str>) -> Result<()> {
    let path = resolve_path(graph, config, Artifact::ClassifiedGraph)?;
    let graph = load_graph(&path)?;
    print_stats(&graph);
    Ok(())
}

fn print_stats(graph: &GraphData) {
    let stats = compute_stats(graph);

    println!("Graph Statistics");
    println!("================");
    println!("Directed:       {}", graph.is_directed());
    println!("Nodes:          {}", stats.node_count);
    println!("  Orphans:      {}", stats.orphan_count);
    println!("Edges:          {}", stats.edge_count);
    println!("  Parallel:     {}", stats.parallel_edge_count);
    println!("  Unclassified: {}", stats.unclassified_count);
    println!("Classified:     {:.1}%", stats.classified_ratio() * 100.0);
    println!("Avg degree:     {:.2}", stats.avg_degree);

    if !stats.entity_type_distribution.is_empty() {
        println!("\nEntity types:");
        let mut types: Vec<_> = stats.entity_type_distribution.iter().collect();
        types.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in types {
            println!("  {kind}: {count}");
        }
    }

    if !stats.relationship_distribution.is_empty() {
        println!("\nRelationships:");
        let mut rels: Vec<_> = stats.relationship_distribution.iter().collect();
        rels.sort_by(|a, b| b.1.cmp(a.1));
        for (rel, count) in rels {
            println!("  {rel}: {count}");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
