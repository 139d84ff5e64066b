//! Configuration for the Pedagraph CLI.
//!
//! [`PedagraphConfig`] loads from a TOML file, `PEDAGRAPH_*` environment
//! variables, and built-in defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `PEDAGRAPH_CONFIG` environment variable
//! 3. XDG default: `~/.config/pedagraph/config.toml`
//! 4. Built-in defaults

use confyg::{Confygery, env};
use pedagraph_classify::{ClassifierConfig, DispatchPolicy, RetryPolicy};
use pedagraph_core::llm::DEFAULT_BASE_URL;
use pedagraph_core::{Artifact, ConfigProvider, Error, Result};
use pedagraph_graph::{DEFAULT_CHUNK_MARKER, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PEDAGRAPH_CONFIG";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Pedagraph CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PedagraphConfig {
    /// Project name, used in messages and default paths.
    pub project_name: String,

    /// Directory holding the graph, classified graph, and ledger by default.
    pub base_path: Option<String>,

    /// Graph file locations.
    pub graph: GraphConfig,

    /// Edge classifier tuning.
    pub classifier: ClassifierSection,

    /// Reasoning service settings.
    pub llm: LlmConfig,
}

/// Graph file locations. Unset paths fall back to `base_path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Pre-run graph read by `classify` and `recover`.
    pub input_path: Option<String>,

    /// Where `classify` and `recover` write the labeled graph; read by `query` and `stats`.
    pub output_path: Option<String>,

    /// Result ledger location.
    pub ledger_path: Option<String>,
}

/// Classifier tuning, flat so every field has an env override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Edge attribute carrying the description; detected when unset.
    pub description_key: Option<String>,

    /// Substring marking text-chunk identifiers.
    pub chunk_marker: String,

    /// Maximum reasoning calls in flight.
    pub max_concurrent: usize,

    /// Delay between job launches, in milliseconds.
    pub launch_delay_ms: u64,

    /// Calls per job before falling back to ANALOGY.
    pub max_attempts: u32,

    /// First retry delay, in milliseconds.
    pub base_delay_ms: u64,

    /// Retry delay cap, in milliseconds.
    pub max_delay_ms: u64,
}

/// Reasoning service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model id.
    pub model: String,

    /// Chat completions API root.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Completion budget per classification call.
    pub max_tokens: u32,

    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for PedagraphConfig {
    fn default() -> Self {
        Self {
            project_name: "pedagraph".to_string(),
            base_path: None,
            graph: GraphConfig::default(),
            classifier: ClassifierSection::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for ClassifierSection {
    fn default() -> Self {
        let dispatch = DispatchPolicy::default();
        let retry = RetryPolicy::default();
        Self {
            description_key: None,
            chunk_marker: DEFAULT_CHUNK_MARKER.to_string(),
            max_concurrent: dispatch.max_concurrent,
            launch_delay_ms: dispatch.launch_delay_ms,
            max_attempts: retry.max_attempts,
            base_delay_ms: retry.base_delay_ms,
            max_delay_ms: retry.max_delay_ms,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 15,
            timeout_secs: 60,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl PedagraphConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            } else if config_path.is_some() {
                return Err(Error::file_not_found(&path));
            }
        }

        let mut env_opts = env::Options::with_top_level("PEDAGRAPH");
        env_opts.add_section("graph");
        env_opts.add_section("classifier");
        env_opts.add_section("llm");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::config(format!("invalid config: {e}")))
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pedagraph").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Classifier settings, with the ledger placed per [`Artifact::Ledger`].
    pub fn classifier_config(&self) -> Result<ClassifierConfig> {
        let section = &self.classifier;
        let config = ClassifierConfig {
            description_key: section.description_key.clone(),
            chunk_marker: section.chunk_marker.clone(),
            ledger_path: self.artifact_path(Artifact::Ledger)?,
            max_tokens: self.llm.max_tokens,
            dispatch: DispatchPolicy {
                max_concurrent: section.max_concurrent,
                launch_delay_ms: section.launch_delay_ms,
            },
            retry: RetryPolicy {
                max_attempts: section.max_attempts,
                base_delay_ms: section.base_delay_ms,
                max_delay_ms: section.max_delay_ms,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Selector settings.
    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig {
            chunk_marker: self.classifier.chunk_marker.clone(),
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "API key not set; export {} to run classification",
                    self.llm.api_key_env
                ))
            })
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for PedagraphConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    fn artifact_path(&self, artifact: Artifact) -> Result<PathBuf> {
        let configured = match artifact {
            Artifact::SourceGraph => &self.graph.input_path,
            Artifact::ClassifiedGraph => &self.graph.output_path,
            Artifact::Ledger => &self.graph.ledger_path,
        };
        match configured {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(self.base_path()?.join(artifact.default_file_name())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pedagraph_config_default() {
        let config = PedagraphConfig::default();
        assert_eq!(config.project_name, "pedagraph");
        assert!(config.base_path.is_none());
        assert!(config.graph.input_path.is_none());
        assert_eq!(config.classifier.max_concurrent, 50);
        assert_eq!(config.classifier.launch_delay_ms, 150);
        assert_eq!(config.classifier.max_attempts, 3);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_config_from_toml() {
        let config = PedagraphConfig::from_toml_str(
            r#"
            base_path = "/data/tutor"

            [graph]
            input_path = "/data/raw.json"

            [classifier]
            max_concurrent = 8
            chunk_marker = "passage"

            [llm]
            model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_path.as_deref(), Some("/data/tutor"));
        assert_eq!(config.classifier.max_concurrent, 8);
        assert_eq!(config.classifier.launch_delay_ms, 150);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.selector_config().chunk_marker, "passage");
    }

    #[test]
    fn test_artifact_paths() {
        let config = PedagraphConfig::from_toml_str(
            r#"
            base_path = "/data"
            [graph]
            input_path = "/in/graph.json"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.artifact_path(Artifact::SourceGraph).unwrap(),
            PathBuf::from("/in/graph.json")
        );
        assert_eq!(
            config.artifact_path(Artifact::ClassifiedGraph).unwrap(),
            PathBuf::from("/data/graph_classified.json")
        );
        assert_eq!(
            config.artifact_path(Artifact::Ledger).unwrap(),
            PathBuf::from("/data/classifications_ledger.json")
        );
    }

    #[test]
    fn test_classifier_config_mapping() {
        let mut config = PedagraphConfig::default();
        config.base_path = Some("/data".to_string());
        config.classifier.max_attempts = 5;
        config.classifier.description_key = Some("d5".to_string());

        let classifier = config.classifier_config().unwrap();
        assert_eq!(classifier.retry.max_attempts, 5);
        assert_eq!(classifier.description_key.as_deref(), Some("d5"));
        assert_eq!(classifier.max_tokens, 15);
        assert_eq!(
            classifier.ledger_path,
            PathBuf::from("/data/classifications_ledger.json")
        );
    }

    #[test]
    fn test_classifier_config_rejects_invalid() {
        let mut config = PedagraphConfig::default();
        config.base_path = Some("/data".to_string());
        config.classifier.max_concurrent = 0;
        assert!(config.classifier_config().unwrap_err().is_config());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PedagraphConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = PedagraphConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.classifier.max_concurrent, config.classifier.max_concurrent);
        assert_eq!(parsed.llm.base_url, config.llm.base_url);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "from-file"
                [classifier]
                max_attempts = 2
            "#,
        )
        .unwrap();

        let config = PedagraphConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name(), "from-file");
        assert_eq!(config.classifier.max_attempts, 2);
    }

    #[test]
    fn test_load_missing_explicit_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = PedagraphConfig::load(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_explicit_path_wins() {
        assert_eq!(
            PedagraphConfig::resolve_config_path(Some("/x/config.toml")),
            Some(PathBuf::from("/x/config.toml"))
        );
    }
}
