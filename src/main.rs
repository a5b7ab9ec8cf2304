// Prospector - lead generation and outreach email pipeline
// Main entry point

use anyhow::Result;
use clap::Parser;

use prospector::cli::{self, Cli};
use prospector::config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    cli::init_tracing(cli.verbose);

    // Load configuration (file + environment); invalid config is fatal here,
    // before any network component is constructed.
    let config = load_config()?;

    cli::run(cli, config).await
}
