//! Command-line interface for Pedagraph.
//!
//! - `classify`: label every unclassified edge and write a new graph
//! - `recover`: replay a Result Ledger onto the pre-run graph
//! - `query`: assemble the pedagogical context for a question
//! - `stats`: summarize a graph
//! - `config`: inspect or create the configuration file

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod graph_handlers;

pub use app::{PedagraphCli, run};
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
pub use config::{CONFIG_ENV_VAR, PedagraphConfig};
