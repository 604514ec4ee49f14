//! # Command Line Interface
//!
//! CLI for turning a league dataset into a JSON report.

use crate::config::AnalyticsConfig;
use crate::dataset::LeagueDataset;
use crate::report::LeagueReport;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Fantasy league report generator
#[derive(Parser, Debug)]
#[command(name = "league-report")]
#[command(about = "Compute multi-season statistics for a fantasy football league")]
pub struct Cli {
    /// League dataset (JSON)
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Report configuration (TOML); environment overrides apply on top
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Resolve the effective configuration
    pub fn load_config(&self) -> Result<AnalyticsConfig> {
        match &self.config {
            Some(path) => {
                let mut config = AnalyticsConfig::load_from_file(path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?;
                config.apply_env();
                config.validate().context("invalid configuration after environment overrides")?;
                Ok(config)
            }
            None => AnalyticsConfig::from_env().context("invalid configuration from environment"),
        }
    }
}

/// CLI handler
pub struct CliHandler {
    config: AnalyticsConfig,
}

impl CliHandler {
    /// Create new CLI handler
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Load the dataset, build the report and write it out
    pub async fn run(&self, cli: &Cli) -> Result<()> {
        let dataset = LeagueDataset::load_from_file(&cli.dataset)
            .await
            .with_context(|| format!("failed to load dataset from {}", cli.dataset.display()))?;

        let report = self.build_report(dataset).await?;
        let json = render_json(&report, cli.pretty)?;

        match &cli.output {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .with_context(|| format!("failed to write report to {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }

    /// Report assembly is CPU-bound, so it runs off the async runtime
    pub async fn build_report(&self, dataset: LeagueDataset) -> Result<LeagueReport> {
        let config = self.config.clone();
        let report = tokio::task::spawn_blocking(move || LeagueReport::build(&dataset, &config))
            .await
            .context("report task failed")?;
        Ok(report)
    }
}

pub fn render_json(report: &LeagueReport, pretty: bool) -> Result<String> {
    let json = if pretty { serde_json::to_string_pretty(report)? } else { serde_json::to_string(report)? };
    Ok(json)
}
