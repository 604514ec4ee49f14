//! # Game Extremes
//!
//! Blowouts, nail-biters, combined-score records and the margin histogram.
//! Works on game records directly since every metric here is symmetric in
//! the two participants.

use crate::aggregation::{bottom_n_by, ratio, top_n_by};
use crate::normalize::GameFilter;
use crate::types::{GameRecord, Season, Week};
use serde::{Deserialize, Serialize};

/// A game described by its winner and loser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub season: Season,
    pub week: Week,
    pub winner: String,
    pub loser: String,
    pub winner_score: f64,
    pub loser_score: f64,
    pub margin: f64,
    pub is_playoff: bool,
}

impl From<&GameRecord> for GameResult {
    fn from(game: &GameRecord) -> Self {
        let (winner, loser) = game.winner_loser();
        Self {
            season: game.season,
            week: game.week,
            winner: winner.team_name.to_string(),
            loser: loser.team_name.to_string(),
            winner_score: winner.score,
            loser_score: loser.score,
            margin: game.margin(),
            is_playoff: game.is_playoff,
        }
    }
}

/// Largest margins of victory
pub fn biggest_blowouts(games: &[GameRecord], top_n: usize, include_playoffs: bool) -> Vec<GameResult> {
    let filter = GameFilter::with_playoffs(include_playoffs);
    let results = games
        .iter()
        .filter(|g| filter.includes(g.is_playoff))
        .map(GameResult::from)
        .collect();
    top_n_by(results, top_n, |r: &GameResult| r.margin)
}

/// Smallest margins, ignoring 0-0 placeholder games
pub fn closest_games(games: &[GameRecord], top_n: usize, include_playoffs: bool) -> Vec<GameResult> {
    let filter = GameFilter::with_playoffs(include_playoffs);
    let results = games
        .iter()
        .filter(|g| filter.includes(g.is_playoff) && !g.is_unplayed())
        .map(GameResult::from)
        .collect();
    bottom_n_by(results, top_n, |r: &GameResult| r.margin)
}

/// A game described by its combined output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    pub season: Season,
    pub week: Week,
    pub team1_name: String,
    pub team2_name: String,
    pub score1: f64,
    pub score2: f64,
    pub combined_score: f64,
    pub is_playoff: bool,
}

impl From<&GameRecord> for CombinedScore {
    fn from(game: &GameRecord) -> Self {
        Self {
            season: game.season,
            week: game.week,
            team1_name: game.team1_name.clone(),
            team2_name: game.team2_name.clone(),
            score1: game.score1,
            score2: game.score2,
            combined_score: game.combined_score(),
            is_playoff: game.is_playoff,
        }
    }
}

pub fn highest_combined_scores(games: &[GameRecord], top_n: usize) -> Vec<CombinedScore> {
    let rows = games.iter().map(CombinedScore::from).collect();
    top_n_by(rows, top_n, |r: &CombinedScore| r.combined_score)
}

/// Lowest combined scores among games where both teams put up points
pub fn lowest_combined_scores(games: &[GameRecord], top_n: usize) -> Vec<CombinedScore> {
    let rows = games.iter().filter(|g| g.is_complete()).map(CombinedScore::from).collect();
    bottom_n_by(rows, top_n, |r: &CombinedScore| r.combined_score)
}

/// Half-open margin buckets `[lower, upper)`; the last bucket is unbounded
const MARGIN_BINS: [(f64, f64, &str); 7] = [
    (0.0, 5.0, "0-5"),
    (5.0, 10.0, "5-10"),
    (10.0, 20.0, "10-20"),
    (20.0, 30.0, "20-30"),
    (30.0, 50.0, "30-50"),
    (50.0, 100.0, "50-100"),
    (100.0, f64::INFINITY, "100+"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginBucket {
    pub margin_range: String,
    pub count: u32,
    /// Fraction of all games
    pub share: Option<f64>,
}

/// Histogram of game margins over all games; empty buckets are omitted
pub fn margin_distribution(games: &[GameRecord]) -> Vec<MarginBucket> {
    let mut counts = [0u32; MARGIN_BINS.len()];
    for game in games {
        let margin = game.margin();
        if let Some(idx) = MARGIN_BINS.iter().position(|(lo, hi, _)| margin >= *lo && margin < *hi) {
            counts[idx] += 1;
        }
    }
    let total: u32 = counts.iter().sum();

    MARGIN_BINS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|((_, _, label), count)| MarginBucket {
            margin_range: label.to_string(),
            count,
            share: ratio(count as f64, total as f64),
        })
        .collect()
}
