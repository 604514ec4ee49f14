//! # Game Record Normalizer
//!
//! Turns head-to-head game records into the per-team perspective table that
//! every score and outcome analyzer consumes.

use crate::types::{GameRecord, TeamWeek};

/// Emit two perspective rows per game: team 1's view, then team 2's view.
///
/// No filtering happens here; callers select regular season or playoff rows
/// by predicate on `is_playoff`. Consumers that care about chronology must
/// sort the output themselves.
pub fn normalize(games: &[GameRecord]) -> Vec<TeamWeek> {
    let mut rows = Vec::with_capacity(games.len() * 2);
    for game in games {
        rows.push(perspective(game, true));
        rows.push(perspective(game, false));
    }
    rows
}

fn perspective(game: &GameRecord, first: bool) -> TeamWeek {
    let (us, them) = if first { game.sides() } else { swap(game.sides()) };
    TeamWeek {
        season: game.season,
        week: game.week,
        team_id: us.team_id.to_string(),
        team_name: us.team_name.to_string(),
        opponent_id: them.team_id.to_string(),
        opponent_name: them.team_name.to_string(),
        points_for: us.score,
        points_against: them.score,
        won: us.score > them.score,
        tied: us.score == them.score,
        is_playoff: game.is_playoff,
        is_championship: game.is_championship,
    }
}

fn swap<T>((a, b): (T, T)) -> (T, T) {
    (b, a)
}

/// Which slice of the schedule an analyzer should look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameFilter {
    RegularSeason,
    Playoffs,
    All,
}

impl GameFilter {
    pub fn includes(self, is_playoff: bool) -> bool {
        match self {
            GameFilter::RegularSeason => !is_playoff,
            GameFilter::Playoffs => is_playoff,
            GameFilter::All => true,
        }
    }

    /// `All` when playoffs are wanted, regular season otherwise
    pub fn with_playoffs(include_playoffs: bool) -> Self {
        if include_playoffs {
            GameFilter::All
        } else {
            GameFilter::RegularSeason
        }
    }
}

/// Perspective rows that pass `filter`
pub fn filtered(rows: &[TeamWeek], filter: GameFilter) -> impl Iterator<Item = &TeamWeek> {
    rows.iter().filter(move |r| filter.includes(r.is_playoff))
}
