//! # Head-to-Head Analyzer
//!
//! Pairwise records between every two teams that have met, as a square
//! matrix over the alphabetical team list and as a per-rivalry table.

use crate::aggregation::ratio;
use crate::normalize::GameFilter;
use crate::types::GameRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One team's record against one opponent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl PairRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

/// Square win-loss matrix; row team's record against column team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMatrix {
    /// Alphabetical; indexes rows and columns
    pub teams: Vec<String>,
    /// `None` on the diagonal
    pub records: Vec<Vec<Option<PairRecord>>>,
}

impl RecordMatrix {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, team: &str, opponent: &str) -> Option<PairRecord> {
        let row = self.index_of(team)?;
        let col = self.index_of(opponent)?;
        self.records[row][col]
    }

    /// Display form of a cell: `"-"` on the diagonal, `"W-L"` elsewhere
    pub fn label(&self, row: usize, col: usize) -> String {
        match self.records.get(row).and_then(|r| r.get(col)).copied().flatten() {
            Some(rec) => format!("{}-{}", rec.wins, rec.losses),
            None => "-".to_string(),
        }
    }

    fn index_of(&self, team: &str) -> Option<usize> {
        self.teams.binary_search_by(|t| t.as_str().cmp(team)).ok()
    }
}

/// Square win-share matrix in [0, 1]; ties count half a win for each side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentageMatrix {
    pub teams: Vec<String>,
    /// `None` on the diagonal and for pairs that never met
    pub values: Vec<Vec<Option<f64>>>,
}

impl PercentageMatrix {
    pub fn get(&self, team: &str, opponent: &str) -> Option<f64> {
        let row = self.teams.binary_search_by(|t| t.as_str().cmp(team)).ok()?;
        let col = self.teams.binary_search_by(|t| t.as_str().cmp(opponent)).ok()?;
        self.values[row][col]
    }
}

type PairTable = BTreeMap<(String, String), PairRecord>;

/// Per ordered (team, opponent) records plus the team list, skipping
/// malformed games where a team meets itself.
fn tally(games: &[GameRecord], include_playoffs: bool) -> (Vec<String>, PairTable) {
    let filter = GameFilter::with_playoffs(include_playoffs);
    let mut teams = BTreeSet::new();
    let mut table: PairTable = BTreeMap::new();

    for game in games.iter().filter(|g| filter.includes(g.is_playoff)) {
        if game.team1_name == game.team2_name {
            continue;
        }
        teams.insert(game.team1_name.clone());
        teams.insert(game.team2_name.clone());

        let (winner, loser) = game.winner_loser();
        let w_key = (winner.team_name.to_string(), loser.team_name.to_string());
        let l_key = (loser.team_name.to_string(), winner.team_name.to_string());
        if game.is_tie() {
            table.entry(w_key).or_default().ties += 1;
            table.entry(l_key).or_default().ties += 1;
        } else {
            table.entry(w_key).or_default().wins += 1;
            table.entry(l_key).or_default().losses += 1;
        }
    }
    (teams.into_iter().collect(), table)
}

/// Win-loss matrix over every team seen in the (optionally playoff-filtered)
/// games. Ties are kept out of the displayed record.
pub fn build_h2h_matrix(games: &[GameRecord], include_playoffs: bool) -> RecordMatrix {
    let (teams, table) = tally(games, include_playoffs);
    let records = teams
        .iter()
        .map(|team| {
            teams
                .iter()
                .map(|other| {
                    if team == other {
                        None
                    } else {
                        Some(table.get(&(team.clone(), other.clone())).copied().unwrap_or_default())
                    }
                })
                .collect()
        })
        .collect();
    RecordMatrix { teams, records }
}

/// Win share of the row team against the column team
pub fn h2h_percentage_matrix(games: &[GameRecord], include_playoffs: bool) -> PercentageMatrix {
    let (teams, table) = tally(games, include_playoffs);
    let values = teams
        .iter()
        .map(|team| {
            teams
                .iter()
                .map(|other| {
                    if team == other {
                        return None;
                    }
                    let rec = table.get(&(team.clone(), other.clone()))?;
                    ratio(rec.wins as f64 + 0.5 * rec.ties as f64, rec.games() as f64)
                })
                .collect()
        })
        .collect();
    PercentageMatrix { teams, values }
}

/// All-time series between two teams, named in alphabetical order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalryRecord {
    pub team1: String,
    pub team2: String,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub ties: u32,
    pub total_games: u32,
    /// Outright wins of `team1` over all games played
    pub team1_win_pct: Option<f64>,
}

/// Every pair that has met (playoffs included), most games first
pub fn h2h_detailed(games: &[GameRecord]) -> Vec<RivalryRecord> {
    let (_, table) = tally(games, true);
    let mut out: Vec<RivalryRecord> = table
        .into_iter()
        .filter(|((team, opponent), _)| team < opponent)
        .map(|((team1, team2), rec)| {
            let total = rec.games();
            RivalryRecord {
                team1,
                team2,
                team1_wins: rec.wins,
                team2_wins: rec.losses,
                ties: rec.ties,
                total_games: total,
                team1_win_pct: ratio(rec.wins as f64, total as f64),
            }
        })
        .collect();
    out.sort_by(|a, b| b.total_games.cmp(&a.total_games));
    out
}

pub fn most_played_rivalries(games: &[GameRecord], top_n: usize) -> Vec<RivalryRecord> {
    let mut rivalries = h2h_detailed(games);
    rivalries.truncate(top_n);
    rivalries
}
