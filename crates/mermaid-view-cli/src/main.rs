//! Mermaid view CLI.
//!
//! Provides commands for:
//! - `render`: Run discovery and rendering over an XHTML page and print the result
//! - `toolbar`: Print the resolved toolbar configuration for an options file

mod commands;
mod compiler;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ToolbarArgs};
use output::Output;

/// Mermaid view - headless diagram preview.
#[derive(Parser)]
#[command(name = "mermaid-view", version, about)]
struct Cli {
    /// Enable verbose output (scan and render progress).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the diagrams of a page and print the resulting HTML.
    Render(RenderArgs),
    /// Print the resolved toolbar configuration as JSON.
    Toolbar(ToolbarArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Toolbar(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
