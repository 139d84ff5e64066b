//! Core traits for Pedagraph configuration.
//!
//! [`ConfigProvider`] abstracts where a deployment keeps its graph files so
//! that command handlers stay independent of the concrete config struct.

use std::path::PathBuf;

use crate::Result;

/// Persistent artifacts a Pedagraph deployment reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// The raw, possibly partially labeled graph produced by extraction.
    SourceGraph,
    /// The graph rewritten after a classification run.
    ClassifiedGraph,
    /// The Result Ledger written before the graph is mutated.
    Ledger,
}

impl Artifact {
    /// Default file name used when no explicit path is configured.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::SourceGraph => "graph.json",
            Self::ClassifiedGraph => "graph_classified.json",
            Self::Ledger => "classifications_ledger.json",
        }
    }
}

/// Trait for deployment-specific configuration.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use pedagraph_core::{Artifact, ConfigProvider, Result};
///
/// #[derive(Clone)]
/// struct TutorConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for TutorConfig {
///     fn project_name(&self) -> &str {
///         "tutor"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
/// }
///
/// let config = TutorConfig { data_dir: PathBuf::from("/data") };
/// assert_eq!(
///     config.artifact_path(Artifact::Ledger).unwrap(),
///     PathBuf::from("/data/classifications_ledger.json")
/// );
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Path of a persistent artifact.
    ///
    /// The default places every artifact under [`base_path`](Self::base_path)
    /// with its [`Artifact::default_file_name`].
    fn artifact_path(&self, artifact: Artifact) -> Result<PathBuf> {
        Ok(self.base_path()?.join(artifact.default_file_name()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestConfig {
        base: PathBuf,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test"
        }

        fn base_path(&self) -> Result<PathBuf> {
            Ok(self.base.clone())
        }
    }

    #[test]
    fn test_default_artifact_paths() {
        let config = TestConfig {
            base: PathBuf::from("/srv/tutor"),
        };
        assert_eq!(
            config.artifact_path(Artifact::SourceGraph).unwrap(),
            PathBuf::from("/srv/tutor/graph.json")
        );
        assert_eq!(
            config.artifact_path(Artifact::ClassifiedGraph).unwrap(),
            PathBuf::from("/srv/tutor/graph_classified.json")
        );
        assert_eq!(
            config.artifact_path(Artifact::Ledger).unwrap(),
            PathBuf::from("/srv/tutor/classifications_ledger.json")
        );
    }

    #[test]
    fn test_config_provider_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TestConfig>();
    }
}
