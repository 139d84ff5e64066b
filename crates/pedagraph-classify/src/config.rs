//! Classifier configuration.
//!
//! Both throttles and the retry budget are named parameters so they can be
//! tuned from the config file without touching code.

use backon::ExponentialBuilder;
use pedagraph_core::{Error, Result};
use pedagraph_graph::DEFAULT_CHUNK_MARKER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Admission gate plus launch schedule for reasoning calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchPolicy {
    /// Maximum reasoning calls in flight at once.
    pub max_concurrent: usize,
    /// Delay between consecutive job launches, in milliseconds.
    pub launch_delay_ms: u64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            max_concurrent: 50,
            launch_delay_ms: 150,
        }
    }
}

impl DispatchPolicy {
    /// Delay between consecutive launches.
    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }

    /// When job `index` may start, relative to the start of the run.
    pub fn launch_offset(&self, index: usize) -> Duration {
        self.launch_delay()
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// Bounded retry with exponential backoff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total calls per job, first attempt included.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds. Doubles per retry.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Backoff schedule yielding exactly `max_attempts - 1` retries.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_factor(2.0)
            .with_min_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Edge classifier settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Edge attribute holding the relationship description. Detected from
    /// the first edge when unset.
    pub description_key: Option<String>,
    /// Substring marking text-chunk identifiers.
    pub chunk_marker: String,
    /// Where the result ledger is written before the graph is touched.
    pub ledger_path: PathBuf,
    /// Completion budget per reasoning call.
    pub max_tokens: u32,
    /// Concurrency ceiling and launch schedule.
    pub dispatch: DispatchPolicy,
    /// Retry budget per job.
    pub retry: RetryPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            description_key: None,
            chunk_marker: DEFAULT_CHUNK_MARKER.to_string(),
            ledger_path: PathBuf::from("classifications_ledger.json"),
            max_tokens: 15,
            dispatch: DispatchPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClassifierConfig {
    /// Reject settings that would stall or skip every job.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.max_concurrent == 0 {
            return Err(Error::config("dispatch.max_concurrent must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(Error::config(
                "retry.base_delay_ms must not exceed retry.max_delay_ms",
            ));
        }
        if self.chunk_marker.trim().is_empty() {
            return Err(Error::config("chunk_marker must not be empty"));
        }
        Ok(())
    }

    /// Set the ledger location.
    pub fn with_ledger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = path.into();
        self
    }

    /// Set the dispatch policy.
    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
