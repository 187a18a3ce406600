//! Binary crate for the `csv-weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing and validating CLI arguments
//! - Interactive provider configuration
//! - Driving the read -> fetch -> merge -> write pipeline

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
