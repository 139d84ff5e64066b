//! `pedagraph` binary entry point.

use clap::Parser;
use pedagraph_cli::CliArgs;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    if let Err(e) = pedagraph_cli::run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
