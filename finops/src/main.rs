// finops/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    // Warnings always reach stderr; stdout stays clean for `graph --format json`.
    // RUST_LOG=debug finops synth ... to see every resource as it is declared
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth {
            project_dir,
            stack,
            format,
            out,
        } => commands::synth::execute(project_dir, stack, format, out),
        Commands::Validate { project_dir } => commands::validate::execute(project_dir),
        Commands::Graph {
            project_dir,
            stack,
            format,
        } => commands::graph::execute(project_dir, stack, format),
        Commands::Teardown { project_dir, stack } => commands::teardown::execute(project_dir, stack),
        Commands::Outputs { project_dir } => commands::outputs::execute(project_dir),
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
