//! The Pedagraph CLI application: logging setup and command dispatch.

use crate::cli::{CliArgs, Command};
use crate::config::PedagraphConfig;
use crate::config_handlers;
use crate::graph_handlers::{self, ClassifyOptions, QueryFormat, RecoverOptions};
use pedagraph_core::Result;
use tracing_subscriber::EnvFilter;

/// CLI application bound to a loaded configuration.
pub struct PedagraphCli {
    name: String,
    config: PedagraphConfig,
    config_path: Option<String>,
    version: String,
}

impl PedagraphCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = PedagraphConfig::load(args.config.as_deref())?;
        Ok(Self {
            config_path: args.config.clone(),
            ..Self::new(config)
        })
    }

    /// Create an application around an existing configuration.
    pub fn new(config: PedagraphConfig) -> Self {
        Self {
            name: "pedagraph".to_string(),
            config,
            config_path: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &PedagraphConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    /// `log` records from the graph crate are picked up by the subscriber.
    pub fn init_logging(verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run a parsed command.
    pub async fn run(&self, command: Option<Command>) -> Result<()> {
        match command {
            Some(Command::Classify {
                input,
                output,
                ledger,
            }) => {
                let options = ClassifyOptions {
                    input,
                    output,
                    ledger,
                };
                graph_handlers::handle_classify(&self.config, options).await
            }
            Some(Command::Recover {
                ledger,
                input,
                output,
            }) => {
                let options = RecoverOptions {
                    ledger,
                    input,
                    output,
                };
                graph_handlers::handle_recover(&self.config, options).await
            }
            Some(Command::Query {
                question,
                graph,
                json,
                prompt,
            }) => {
                let format = if json {
                    QueryFormat::Json
                } else if prompt {
                    QueryFormat::Prompt
                } else {
                    QueryFormat::Text
                };
                graph_handlers::handle_query(
                    &self.config,
                    &self.config.selector_config(),
                    &question,
                    graph.as_deref(),
                    format,
                )
                .await
            }
            Some(Command::Stats { graph }) => {
                graph_handlers::handle_stats(&self.config, graph.as_deref()).await
            }
            Some(Command::Config(config_cmd)) => config_handlers::handle_config_command(
                self.config_path.as_deref(),
                config_cmd.command,
            ),
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            None => {
                println!("{} {} (use --help for usage)", self.name, self.version);
                Ok(())
            }
        }
    }
}

/// Entry point shared by the binary: set up logging, then dispatch.
///
/// `config` subcommands run before the configuration is loaded so they keep
/// working when the config file is broken or missing.
pub async fn run(args: CliArgs) -> Result<()> {
    PedagraphCli::init_logging(args.verbose, args.quiet);

    if let Some(Command::Config(config_cmd)) = args.command {
        return config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command);
    }

    let cli = PedagraphCli::from_args(&args)?;
    cli.run(args.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pedagraph_graph::{Edge, GraphData, Node, save_graph};
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> PedagraphConfig {
        PedagraphConfig {
            base_path: Some(dir.to_string_lossy().into_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_version_command() {
        let cli = PedagraphCli::new(PedagraphConfig::default());
        let args = CliArgs::parse_from(["pedagraph", "version"]);
        assert!(cli.run(args.command).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_no_command() {
        let cli = PedagraphCli::new(PedagraphConfig::default());
        assert!(cli.run(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_stats_and_query() {
        let dir = tempdir().unwrap();
        let mut graph = GraphData::new(true);
        graph.add_node(Node::new("limit"));
        graph.add_node(Node::new("derivative"));
        graph
            .add_edge(Edge::new("limit", "derivative").with_description("defines"))
            .unwrap();
        save_graph(&graph, dir.path().join("graph_classified.json"), None).unwrap();

        let cli = PedagraphCli::new(config_in(dir.path()));

        let stats = CliArgs::parse_from(["pedagraph", "stats"]);
        assert!(cli.run(stats.command).await.is_ok());

        let query = CliArgs::parse_from(["pedagraph", "query", "what is a derivative", "--json"]);
        assert!(cli.run(query.command).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_recover_without_ledger_fails() {
        let dir = tempdir().unwrap();
        let cli = PedagraphCli::new(config_in(dir.path()));
        let args = CliArgs::parse_from(["pedagraph", "recover"]);
        let err = cli.run(args.command).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_run_config_init_with_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let args = CliArgs::parse_from([
            "pedagraph",
            "config",
            "init",
            "--file",
            path.to_str().unwrap(),
        ]);
        assert!(run(args).await.is_ok());
        assert!(path.exists());
    }
}
