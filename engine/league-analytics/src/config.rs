//! # Configuration Management
//!
//! Configuration structures for report generation.

use crate::consistency::BoomBustThresholds;
use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for report generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalyticsConfig {
    /// Table sizes and game filters
    #[serde(default)]
    pub report: ReportConfig,
    /// Analyzer thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows kept in every top-N table
    pub top_n: usize,
    /// Rows kept in the streak tables
    pub streak_top_n: usize,
    /// Rows kept in the rivalry table
    pub rivalry_top_n: usize,
    /// Count playoff games in the weekly and single-game extremes
    pub include_playoffs_in_extremes: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_n: 15, streak_top_n: 10, rivalry_top_n: 10, include_playoffs_in_extremes: true }
    }
}

/// Analyzer thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// A game at or above `boom_ratio * average` is a boom
    pub boom_ratio: f64,
    /// A game at or below `bust_ratio * average` is a bust
    pub bust_ratio: f64,
    /// Playoff seeds at or above this rank play in the championship bracket
    pub championship_bracket_cutoff: u32,
    /// Lowest seed that still counts as an underdog champion
    pub underdog_min_seed: u32,
    /// Rounds considered early when looking for draft busts
    pub early_round_cutoff: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            boom_ratio: 1.20,
            bust_ratio: 0.80,
            championship_bracket_cutoff: 6,
            underdog_min_seed: 4,
            early_round_cutoff: 5,
        }
    }
}

impl ThresholdConfig {
    pub fn boom_bust(&self) -> BoomBustThresholds {
        BoomBustThresholds { boom_ratio: self.boom_ratio, bust_ratio: self.bust_ratio }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

impl AnalyticsConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalyticsConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables; unparsable values fall
    /// back to the defaults
    pub fn apply_env(&mut self) {
        if let Ok(top_n) = std::env::var("LEAGUE_TOP_N") {
            self.report.top_n = top_n.parse().unwrap_or(15);
        }

        if let Ok(cutoff) = std::env::var("LEAGUE_BRACKET_CUTOFF") {
            self.thresholds.championship_bracket_cutoff = cutoff.parse().unwrap_or(6);
        }

        if let Ok(seed) = std::env::var("LEAGUE_UNDERDOG_SEED") {
            self.thresholds.underdog_min_seed = seed.parse().unwrap_or(4);
        }

        if let Ok(level) = std::env::var("LEAGUE_LOG_LEVEL") {
            self.logging.log_level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            return Err(AnalyticsError::Config("top_n must be greater than 0".to_string()));
        }

        if !(self.thresholds.bust_ratio < self.thresholds.boom_ratio) {
            return Err(AnalyticsError::Config(format!(
                "bust_ratio ({}) must be below boom_ratio ({})",
                self.thresholds.bust_ratio, self.thresholds.boom_ratio
            )));
        }

        if self.thresholds.championship_bracket_cutoff == 0 {
            return Err(AnalyticsError::Config(
                "championship_bracket_cutoff must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
