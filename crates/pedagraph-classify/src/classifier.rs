//! The edge classifier.
//!
//! A run goes through five phases:
//!
//! 1. detect the description attribute (fatal on failure)
//! 2. plan: skip classified edges, shortcut chunk references to EVIDENCE
//! 3. dispatch jobs behind a semaphore, each launch staggered by index
//! 4. classify each job with bounded retry, defaulting to ANALOGY
//! 5. flush the ledger, then apply it to the graph
//!
//! Jobs only read their own copy of the edge data; the graph is mutated
//! once, sequentially, after the ledger is on disk.

use crate::config::ClassifierConfig;
use crate::detect::detect_description_key;
use crate::jobs::{ClassificationJob, plan_jobs};
use crate::ledger::{Decision, LedgerEntry, ResultLedger, apply_entries};
use crate::prompt::{build_request, parse_classification};
use backon::Retryable;
use futures::future::join_all;
use pedagraph_core::llm::LlmProvider;
use pedagraph_core::{Error, Result};
use pedagraph_graph::{GraphData, RelationshipType};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Category assigned when a job exhausts its retries.
pub const FALLBACK_CLASSIFICATION: RelationshipType = RelationshipType::Analogy;

/// Summary of a classification run.
#[derive(Clone, Debug)]
pub struct ClassificationReport {
    /// Edges whose category was set by this run.
    pub modified: usize,
    /// EVIDENCE assignments from the chunk shortcut.
    pub structural: usize,
    /// Categories parsed from reasoning responses.
    pub reasoned: usize,
    /// Jobs that fell back to ANALOGY.
    pub defaulted: usize,
    /// Edges that were already classified.
    pub skipped: usize,
    /// Attribute used as the relationship description; `None` when no edge
    /// was pending and detection did not run.
    pub description_key: Option<String>,
    /// Configured ledger location.
    pub ledger_path: PathBuf,
    /// The flushed ledger; `None` when nothing was pending.
    pub ledger: Option<ResultLedger>,
}

/// Classifies every unclassified edge of a graph.
pub struct EdgeClassifier {
    provider: Arc<dyn LlmProvider>,
    config: ClassifierConfig,
}

impl EdgeClassifier {
    /// Create a classifier backed by `provider`.
    pub fn new(provider: Arc<dyn LlmProvider>, config: ClassifierConfig) -> Self {
        Self { provider, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify all pending edges of `graph` in place.
    ///
    /// # Errors
    ///
    /// Fails before any reasoning call when the configuration is invalid or
    /// no description key can be detected. Fails after dispatch, leaving the
    /// graph untouched, when the ledger cannot be written. Individual job
    /// failures never fail the run.
    ///
    /// A graph whose edges are all classified returns at once: no detection,
    /// no ledger write.
    pub async fn classify_all(&self, graph: &mut GraphData) -> Result<ClassificationReport> {
        self.config.validate()?;

        if graph.edge_count() > 0 && graph.iter_edges().all(|e| e.relationship_type.is_terminal())
        {
            tracing::info!(
                skipped = graph.edge_count(),
                "Every edge already classified; nothing to do"
            );
            return Ok(ClassificationReport {
                modified: 0,
                structural: 0,
                reasoned: 0,
                defaulted: 0,
                skipped: graph.edge_count(),
                description_key: None,
                ledger_path: self.config.ledger_path.clone(),
                ledger: None,
            });
        }

        let description_key = detect_description_key(
            graph,
            self.config.description_key.as_deref(),
            &self.config.chunk_marker,
        )?;

        let plan = plan_jobs(graph, &description_key, &self.config.chunk_marker);
        let skipped = plan.skipped;
        let structural = plan.structural.len();

        let reasoned_entries = self.dispatch(&plan.jobs).await;

        let mut entries = plan.structural;
        entries.extend(reasoned_entries);
        let ledger = ResultLedger::new(self.provider.model(), entries);

        ledger.write(&self.config.ledger_path).inspect_err(|e| {
            tracing::error!(
                path = %self.config.ledger_path.display(),
                error = %e,
                "Ledger flush failed; graph left unchanged"
            );
        })?;

        let modified = apply_entries(graph, &ledger.entries);
        let report = ClassificationReport {
            modified,
            structural,
            reasoned: ledger.count(Decision::Reasoned),
            defaulted: ledger.count(Decision::Defaulted),
            skipped,
            description_key: Some(description_key),
            ledger_path: self.config.ledger_path.clone(),
            ledger: Some(ledger),
        };

        tracing::info!(
            modified = report.modified,
            structural = report.structural,
            reasoned = report.reasoned,
            defaulted = report.defaulted,
            skipped = report.skipped,
            "Classification finished"
        );
        Ok(report)
    }

    /// Run all jobs concurrently on the current task; results keep job order.
    async fn dispatch(&self, jobs: &[ClassificationJob]) -> Vec<LedgerEntry> {
        if jobs.is_empty() {
            return Vec::new();
        }
        tracing::info!(
            jobs = jobs.len(),
            max_concurrent = self.config.dispatch.max_concurrent,
            launch_delay_ms = self.config.dispatch.launch_delay_ms,
            "Dispatching classification jobs"
        );

        let gate = Semaphore::new(self.config.dispatch.max_concurrent);
        join_all(jobs.iter().map(|job| self.run_job(job, &gate))).await
    }

    async fn run_job(&self, job: &ClassificationJob, gate: &Semaphore) -> LedgerEntry {
        let offset = self.config.dispatch.launch_offset(job.index);
        if !offset.is_zero() {
            tokio::time::sleep(offset).await;
        }

        let Ok(_permit) = gate.acquire().await else {
            tracing::warn!(index = job.index, "Dispatch gate closed; using fallback");
            return job.entry(FALLBACK_CLASSIFICATION, Decision::Defaulted);
        };

        match self.classify_job(job).await {
            Ok(classification) => {
                tracing::debug!(
                    index = job.index,
                    source = %job.source,
                    target = %job.target,
                    %classification,
                    "Classified edge"
                );
                job.entry(classification, Decision::Reasoned)
            }
            Err(e) => {
                tracing::warn!(
                    index = job.index,
                    source = %job.source,
                    target = %job.target,
                    error = %e,
                    retryable = e.is_retryable(),
                    fallback = %FALLBACK_CLASSIFICATION,
                    "Classification failed; using fallback"
                );
                job.entry(FALLBACK_CLASSIFICATION, Decision::Defaulted)
            }
        }
    }

    /// One job with bounded retry. Transient errors (service faults, rate
    /// limits, malformed responses) consume an attempt; any other error
    /// ends the job at once.
    async fn classify_job(&self, job: &ClassificationJob) -> Result<RelationshipType> {
        let request = build_request(job, self.config.max_tokens);
        let provider = Arc::clone(&self.provider);

        (move || {
            let provider = Arc::clone(&provider);
            let request = request.clone();
            async move {
                let response = provider.complete(request).await?;
                parse_classification(&response.content)
            }
        })
        .retry(self.config.retry.backoff())
        .when(Error::is_retryable)
        .notify(|err: &Error, delay: Duration| {
            tracing::debug!(
                index = job.index,
                error = %err,
                rate_limited = err.is_rate_limited(),
                delay_ms = delay.as_millis() as u64,
                "Retrying classification"
            );
        })
        .await
    }
}
