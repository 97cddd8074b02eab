//! hads CLI - Markdown documentation server.
//!
//! Provides commands for:
//! - `serve`: Serve a documentation root over HTTP
//! - `export`: Render every document to static HTML files

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, ServeArgs};
use error::CliError;
use output::Output;

/// hads - Markdown documentation server.
#[derive(Parser, Debug)]
#[command(name = "hads", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the documentation server.
    Serve(ServeArgs),
    /// Export the documentation to static HTML.
    Export(ExportArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Serve(args) => args.verbose,
            Self::Export(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.failure(&err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()?.block_on(args.execute()),
        Commands::Export(args) => args.execute(),
    }
}
