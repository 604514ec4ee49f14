//! # League Analytics
//!
//! Statistical aggregation engine for multi-season fantasy football leagues.
//!
//! Game records are normalized once into per-team perspective rows; every
//! analyzer is then a pure function from input tables to a sorted derived
//! table. Empty input produces an empty table and undefined ratios are
//! `None`, so report assembly can skip sections instead of failing.

pub mod error;
pub mod types;
pub mod normalize;
pub mod aggregation;

pub mod scoring;
pub mod consistency;
pub mod wins;
pub mod head_to_head;
pub mod games;
pub mod luck;
pub mod playoffs;
pub mod drafts;
pub mod trades;
pub mod waivers;

pub mod dataset;
pub mod config;
pub mod report;
pub mod cli;

// Re-export main types for easy usage
pub use config::AnalyticsConfig;
pub use dataset::LeagueDataset;
pub use error::{AnalyticsError, Result};
pub use normalize::{normalize, GameFilter};
pub use report::LeagueReport;
pub use types::{AddRecord, DraftPick, GameRecord, Outcome, Season, StandingsRecord, TeamWeek, TradeRecord, Week};
