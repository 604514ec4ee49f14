//! # League Report Binary
//!
//! Command-line driver: dataset in, JSON report out.

use anyhow::{Context, Result};
use clap::Parser;
use league_analytics::cli::{Cli, CliHandler};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let handler = CliHandler::new(config);
    handler.run(&cli).await?;

    Ok(())
}
