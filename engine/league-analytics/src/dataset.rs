//! # League Dataset
//!
//! Everything the fetch layer hands over for one league, bundled so it can
//! be stored as a single JSON document and fed to the report.

use crate::error::{AnalyticsError, Result};
use crate::types::{AddRecord, DraftPick, GameRecord, Season, StandingsRecord, TradeRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// All input tables for one league
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueDataset {
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub games: Vec<GameRecord>,
    #[serde(default)]
    pub standings: Vec<StandingsRecord>,
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    #[serde(default)]
    pub adds: Vec<AddRecord>,
    #[serde(default)]
    pub drafts: Vec<DraftPick>,
}

impl LeagueDataset {
    /// Load a dataset from a JSON file and validate it
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading league dataset from: {:?}", path.as_ref());
        let content = tokio::fs::read_to_string(&path).await?;
        let dataset = Self::from_json_str(&content)?;
        info!(
            games = dataset.games.len(),
            standings = dataset.standings.len(),
            trades = dataset.trades.len(),
            adds = dataset.adds.len(),
            drafts = dataset.drafts.len(),
            "Loaded league dataset"
        );
        Ok(dataset)
    }

    /// Parse and validate a dataset from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let dataset: LeagueDataset = serde_json::from_str(content)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Write the dataset as pretty-printed JSON
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
            && self.standings.is_empty()
            && self.trades.is_empty()
            && self.adds.is_empty()
            && self.drafts.is_empty()
    }

    /// Distinct seasons with at least one game, oldest first
    pub fn seasons(&self) -> Vec<Season> {
        let mut seasons: Vec<Season> = self.games.iter().map(|g| g.season).collect();
        seasons.sort_unstable();
        seasons.dedup();
        seasons
    }

    /// Reject records the analyzers cannot make sense of
    ///
    /// Hard errors: a team playing itself, a negative or non-finite score,
    /// more than one champion in a season. Softer oddities (an empty team id,
    /// duplicated standings ranks) are only logged.
    pub fn validate(&self) -> Result<()> {
        for game in &self.games {
            if game.team1_id == game.team2_id {
                return Err(AnalyticsError::InvalidDataset(format!(
                    "team {} plays itself in season {} week {}",
                    game.team1_id, game.season, game.week
                )));
            }
            for score in [game.score1, game.score2] {
                if !score.is_finite() || score < 0.0 {
                    return Err(AnalyticsError::InvalidDataset(format!(
                        "invalid score {} in season {} week {}",
                        score, game.season, game.week
                    )));
                }
            }
            if game.team1_id.is_empty() || game.team2_id.is_empty() {
                warn!("Game in season {} week {} has an empty team id", game.season, game.week);
            }
        }

        let mut champions: BTreeMap<Season, u32> = BTreeMap::new();
        let mut ranks: BTreeMap<(Season, u32), u32> = BTreeMap::new();
        for standing in &self.standings {
            if standing.won_championship {
                *champions.entry(standing.season).or_default() += 1;
            }
            *ranks.entry((standing.season, standing.rank)).or_default() += 1;
        }
        if let Some((season, count)) = champions.iter().find(|(_, count)| **count > 1) {
            return Err(AnalyticsError::InvalidDataset(format!(
                "season {} has {} champions",
                season, count
            )));
        }
        for ((season, rank), count) in ranks {
            if count > 1 {
                warn!("Season {} has {} teams at rank {}", season, count, rank);
            }
        }

        Ok(())
    }
}
