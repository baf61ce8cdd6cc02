//! relmark CLI - GitHub release changelogs for markdown.
//!
//! Provides commands for:
//! - `render`: Expand `::github-release-changelog` directives in a document
//! - `releases`: Render the releases of a single repository

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ReleasesArgs, RenderArgs};
use output::Output;

/// relmark - GitHub release changelogs for markdown.
#[derive(Parser)]
#[command(name = "relmark", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand changelog directives in a markdown document.
    Render(RenderArgs),
    /// Render the releases of one repository.
    Releases(ReleasesArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Render(args) => args.common.verbose,
            Self::Releases(args) => args.common.verbose,
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

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Releases(args) => args.execute(),
    };

    if let Err(err) = result {
        output.report(&err);
        std::process::exit(1);
    }
}
