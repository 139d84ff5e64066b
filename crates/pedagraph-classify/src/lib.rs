//! Edge classification for Pedagraph graphs.
//!
//! Labels every unclassified edge with one of PREREQUISITE, COMPONENT,
//! ANALOGY, or EVIDENCE. Reasoning calls run concurrently behind a fixed
//! concurrency ceiling and a staggered launch schedule; each call retries
//! with exponential backoff and falls back to ANALOGY. All decisions are
//! flushed to a [`ResultLedger`] before the graph is touched, so an
//! interrupted run can be finished with [`replay`].
//!
//! # Example
//!
//! ```no_run
//! use pedagraph_classify::{ClassifierConfig, EdgeClassifier};
//! use pedagraph_core::llm::MockLlmProvider;
//! use std::sync::Arc;
//!
//! # async fn run() -> pedagraph_core::Result<()> {
//! let mut graph = pedagraph_graph::load_graph("graph.json")?;
//! let provider = Arc::new(MockLlmProvider::with_response(r#"{"classification": "ANALOGY"}"#));
//! let classifier = EdgeClassifier::new(provider, ClassifierConfig::default());
//! let report = classifier.classify_all(&mut graph).await?;
//! println!("{} edges modified", report.modified);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod detect;
pub mod jobs;
pub mod ledger;
pub mod prompt;

pub use classifier::{ClassificationReport, EdgeClassifier, FALLBACK_CLASSIFICATION};
pub use config::{ClassifierConfig, DispatchPolicy, RetryPolicy};
pub use detect::detect_description_key;
pub use jobs::{ClassificationJob, JobPlan, is_structural_evidence, plan_jobs};
pub use ledger::{Decision, LedgerEntry, ResultLedger, apply_entries, replay};
pub use prompt::{SYSTEM_PROMPT, build_request, parse_classification};
