//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Pedagraph: classify knowledge-graph edges and assemble tutoring context.
#[derive(Parser, Debug)]
#[command(name = "pedagraph", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, global = true, env = "PEDAGRAPH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Label every unclassified edge and write a new graph file.
    Classify {
        /// Input graph (defaults to the configured source graph).
        #[arg(short, long)]
        input: Option<String>,

        /// Output graph (defaults to the configured classified graph).
        #[arg(short, long)]
        output: Option<String>,

        /// Result ledger location.
        #[arg(short, long)]
        ledger: Option<String>,
    },

    /// Finish an interrupted run by replaying its ledger onto the input graph.
    Recover {
        /// Ledger written by the interrupted run.
        #[arg(short, long)]
        ledger: Option<String>,

        /// Pre-run graph (defaults to the configured source graph).
        #[arg(short, long)]
        input: Option<String>,

        /// Output graph (defaults to the configured classified graph).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Assemble the pedagogical context for a question.
    Query {
        /// Free-text question.
        question: String,

        /// Graph to query (defaults to the configured classified graph).
        #[arg(short, long)]
        graph: Option<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,

        /// Print the full tutoring prompt instead of the bare context.
        #[arg(long, conflicts_with = "json")]
        prompt: bool,
    },

    /// Show graph statistics.
    Stats {
        /// Graph to inspect (defaults to the configured classified graph).
        #[arg(short, long)]
        graph: Option<String>,
    },

    /// Configuration operations.
    Config(ConfigCommand),

    /// Print version information.
    Version,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["pedagraph"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["pedagraph", "stats", "--verbose", "--config", "c.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("c.toml"));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(CliArgs::try_parse_from(["pedagraph", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_classify_command() {
        let args = CliArgs::parse_from([
            "pedagraph", "classify", "--input", "in.json", "--output", "out.json",
        ]);
        match args.command {
            Some(Command::Classify {
                input,
                output,
                ledger,
            }) => {
                assert_eq!(input.as_deref(), Some("in.json"));
                assert_eq!(output.as_deref(), Some("out.json"));
                assert!(ledger.is_none());
            }
            other => panic!("Expected Classify command, got {other:?}"),
        }
    }

    #[test]
    fn test_recover_command() {
        let args = CliArgs::parse_from(["pedagraph", "recover", "--ledger", "l.json"]);
        match args.command {
            Some(Command::Recover { ledger, input, .. }) => {
                assert_eq!(ledger.as_deref(), Some("l.json"));
                assert!(input.is_none());
            }
            other => panic!("Expected Recover command, got {other:?}"),
        }
    }

    #[test]
    fn test_query_command() {
        let args = CliArgs::parse_from(["pedagraph", "query", "what is the chain rule", "--json"]);
        match args.command {
            Some(Command::Query {
                question,
                json,
                prompt,
                graph,
            }) => {
                assert_eq!(question, "what is the chain rule");
                assert!(json);
                assert!(!prompt);
                assert!(graph.is_none());
            }
            other => panic!("Expected Query command, got {other:?}"),
        }
    }

    #[test]
    fn test_query_json_and_prompt_conflict() {
        assert!(CliArgs::try_parse_from(["pedagraph", "query", "q", "--json", "--prompt"]).is_err());
    }

    #[test]
    fn test_config_init_command() {
        let args = CliArgs::parse_from(["pedagraph", "config", "init", "--force"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Init { file, force },
            })) => {
                assert!(file.is_none());
                assert!(force);
            }
            other => panic!("Expected Config Init command, got {other:?}"),
        }
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["pedagraph", "version"]);
        assert!(matches!(args.command, Some(Command::Version)));
    }
}
