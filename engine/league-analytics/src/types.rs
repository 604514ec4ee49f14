//! # League Data Model
//!
//! Input records handed over by the fetch layer and the per-team perspective
//! row every analyzer works from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fantasy season (e.g. 2023)
pub type Season = i32;

/// Week number within a season, 1-based
pub type Week = u32;

/// A single completed head-to-head game between two distinct teams
///
/// There is no ordering guarantee between `team1` and `team2`; either side
/// may be the higher scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub season: Season,
    pub week: Week,
    pub team1_id: String,
    pub team1_name: String,
    pub team2_id: String,
    pub team2_name: String,
    pub score1: f64,
    pub score2: f64,
    #[serde(default)]
    pub is_playoff: bool,
    #[serde(default)]
    pub is_championship: bool,
}

/// One participant of a game, borrowed from its [`GameRecord`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameSide<'a> {
    pub team_id: &'a str,
    pub team_name: &'a str,
    pub score: f64,
}

impl GameRecord {
    /// Both participants in record order
    pub fn sides(&self) -> (GameSide<'_>, GameSide<'_>) {
        (
            GameSide { team_id: &self.team1_id, team_name: &self.team1_name, score: self.score1 },
            GameSide { team_id: &self.team2_id, team_name: &self.team2_name, score: self.score2 },
        )
    }

    /// Orientation-independent `(winner, loser)` split.
    ///
    /// Team 1 is the winner only on a strictly higher score, so a tied game
    /// reports team 2 in the winner slot.
    pub fn winner_loser(&self) -> (GameSide<'_>, GameSide<'_>) {
        let (one, two) = self.sides();
        if one.score > two.score {
            (one, two)
        } else {
            (two, one)
        }
    }

    /// Absolute score difference
    pub fn margin(&self) -> f64 {
        (self.score1 - self.score2).abs()
    }

    /// Sum of both scores
    pub fn combined_score(&self) -> f64 {
        self.score1 + self.score2
    }

    pub fn is_tie(&self) -> bool {
        self.score1 == self.score2
    }

    /// 0-0 games are placeholders for weeks that were never played
    pub fn is_unplayed(&self) -> bool {
        self.score1 <= 0.0 && self.score2 <= 0.0
    }

    /// Both sides put up a positive score
    pub fn is_complete(&self) -> bool {
        self.score1 > 0.0 && self.score2 > 0.0
    }
}

/// Result of a game from one team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn from_scores(points_for: f64, points_against: f64) -> Self {
        if points_for > points_against {
            Outcome::Win
        } else if points_for < points_against {
            Outcome::Loss
        } else {
            Outcome::Tie
        }
    }
}

/// One team's view of one game (two rows per [`GameRecord`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWeek {
    pub season: Season,
    pub week: Week,
    pub team_id: String,
    pub team_name: String,
    pub opponent_id: String,
    pub opponent_name: String,
    pub points_for: f64,
    pub points_against: f64,
    /// Strictly outscored the opponent; false for both sides of a tie
    pub won: bool,
    pub tied: bool,
    pub is_playoff: bool,
    pub is_championship: bool,
}

impl TeamWeek {
    pub fn outcome(&self) -> Outcome {
        if self.won {
            Outcome::Win
        } else if self.tied {
            Outcome::Tie
        } else {
            Outcome::Loss
        }
    }

    pub fn lost(&self) -> bool {
        self.outcome() == Outcome::Loss
    }
}

/// Final standings line for one team in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRecord {
    pub season: Season,
    pub team_id: String,
    pub team_name: String,
    #[serde(default)]
    pub manager: Option<String>,
    /// 1-based, unique within a season
    pub rank: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub points_for: f64,
    #[serde(default)]
    pub points_against: f64,
    #[serde(default)]
    pub made_playoffs: bool,
    #[serde(default)]
    pub won_championship: bool,
    #[serde(default)]
    pub finals_appearance: bool,
}

/// One player moving between two teams as part of a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub season: Season,
    /// Platform transaction id; shared by every player in the same trade
    #[serde(default)]
    pub trade_id: Option<String>,
    pub date: NaiveDate,
    pub player_name: String,
    pub from_team_id: String,
    pub to_team_id: String,
    #[serde(default)]
    pub from_manager: Option<String>,
    #[serde(default)]
    pub to_manager: Option<String>,
    /// Points the player scored for the receiving team after the trade
    #[serde(default)]
    pub points_after: Option<f64>,
}

/// A waiver claim or free-agent pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRecord {
    pub season: Season,
    pub date: NaiveDate,
    pub team_id: String,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
    pub player_name: String,
    #[serde(default)]
    pub position: String,
    /// Platform source label, e.g. "waivers" or "freeagents"
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub is_waiver: bool,
    /// Points the player scored after acquisition, when attribution data exists
    #[serde(default)]
    pub points_after: Option<f64>,
}

/// One draft selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    pub season: Season,
    pub team_name: String,
    pub player_name: String,
    #[serde(default)]
    pub position: String,
    /// Overall pick number
    pub pick: u32,
    pub round: u32,
    #[serde(default)]
    pub season_points: Option<f64>,
    /// Baseline for this pick slot, supplied externally
    #[serde(default)]
    pub expected_points: Option<f64>,
}

impl DraftPick {
    /// `season_points - expected_points` when both are known
    pub fn value_over_expected(&self) -> Option<f64> {
        Some(self.season_points? - self.expected_points?)
    }
}
