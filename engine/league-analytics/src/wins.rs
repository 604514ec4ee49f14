//! # Outcome & Streak Analyzer
//!
//! Win/loss rollups and longest-run streak detection. Ties are their own
//! outcome: they never count as wins or losses, and they end both kinds of
//! streak.

use crate::aggregation::{median, rank_within_groups, rollup_all_time, rollup_by_season, RankOrder};
use crate::normalize::{filtered, GameFilter};
use crate::types::{Outcome, Season, TeamWeek, Week};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Regular-season record of one team in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub season: Season,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub games: u32,
    pub win_pct: Option<f64>,
    /// Rank by wins within the season, shared on ties
    pub season_rank: Option<u32>,
}

/// Season records ranked by wins, newest season first then most wins
pub fn season_win_leaders(rows: &[TeamWeek]) -> Vec<SeasonRecord> {
    let mut out: Vec<SeasonRecord> = rollup_by_season(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .map(|((season, team_name), t)| SeasonRecord {
            season,
            team_name,
            wins: t.wins,
            losses: t.losses,
            ties: t.ties,
            games: t.games,
            win_pct: t.win_pct(),
            season_rank: None,
        })
        .collect();

    let ranks = rank_within_groups(&out, |r| r.season, |r| Some(r.wins as f64), RankOrder::Descending);
    for (row, rank) in out.iter_mut().zip(ranks) {
        row.season_rank = rank;
    }
    out.sort_by(|a, b| b.season.cmp(&a.season).then(b.wins.cmp(&a.wins)));
    out
}

/// Career regular-season record of one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeRecord {
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub games: u32,
    pub seasons: u32,
    pub win_pct: Option<f64>,
}

pub fn alltime_win_leaders(rows: &[TeamWeek]) -> Vec<AllTimeRecord> {
    let mut out: Vec<AllTimeRecord> = rollup_all_time(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .map(|(team_name, t)| AllTimeRecord {
            team_name,
            wins: t.wins,
            losses: t.losses,
            ties: t.ties,
            games: t.games,
            seasons: t.season_count(),
            win_pct: t.win_pct(),
        })
        .collect();
    out.sort_by(|a, b| b.wins.cmp(&a.wins));
    out
}

/// The team with the most regular-season wins in each season, oldest season
/// first. Equal win totals go to the alphabetically first team.
pub fn best_teams_by_season(rows: &[TeamWeek]) -> Vec<SeasonRecord> {
    let mut best: BTreeMap<Season, SeasonRecord> = BTreeMap::new();
    for record in season_win_leaders(rows) {
        match best.get(&record.season) {
            Some(current)
                if current.wins > record.wins
                    || (current.wins == record.wins && current.team_name <= record.team_name) => {}
            _ => {
                best.insert(record.season, record);
            }
        }
    }
    best.into_values().collect()
}

/// The worst team of a season with its scoring context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstTeam {
    pub season: Season,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub total_pts: f64,
    pub avg_ppg: Option<f64>,
    /// Distance from the median team's points-per-game that season
    pub ppg_vs_median: Option<f64>,
}

/// The team with the fewest regular-season wins in each season, newest
/// season first. Equal win totals go to the alphabetically first team.
pub fn worst_teams_by_season(rows: &[TeamWeek]) -> Vec<WorstTeam> {
    let totals = rollup_by_season(filtered(rows, GameFilter::RegularSeason));

    let mut ppg_by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for ((season, _), t) in &totals {
        if let Some(ppg) = t.ppg() {
            ppg_by_season.entry(*season).or_default().push(ppg);
        }
    }
    let median_ppg: BTreeMap<Season, f64> = ppg_by_season
        .into_iter()
        .filter_map(|(season, values)| Some((season, median(&values)?)))
        .collect();

    // BTreeMap iteration is alphabetical within a season, so strict `<`
    // keeps the first team on equal wins.
    let mut worst: BTreeMap<Season, WorstTeam> = BTreeMap::new();
    for ((season, team_name), t) in totals {
        if worst.get(&season).is_some_and(|w| w.wins <= t.wins) {
            continue;
        }
        let avg_ppg = t.ppg();
        let ppg_vs_median = avg_ppg.zip(median_ppg.get(&season).copied()).map(|(p, m)| p - m);
        worst.insert(
            season,
            WorstTeam {
                season,
                team_name,
                wins: t.wins,
                losses: t.losses,
                ties: t.ties,
                total_pts: t.points_for,
                avg_ppg,
                ppg_vs_median,
            },
        );
    }
    worst.into_values().rev().collect()
}

/// Where a streak ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPoint {
    pub season: Season,
    pub week: Week,
}

/// Longest win and loss runs of one team across its whole history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub team_name: String,
    pub max_win_streak: u32,
    /// Last game of the earliest longest win streak
    pub win_streak_end: Option<StreakPoint>,
    pub max_loss_streak: u32,
    pub loss_streak_end: Option<StreakPoint>,
}

#[derive(Default)]
struct StreakTracker {
    current_win: u32,
    current_loss: u32,
    max_win: u32,
    max_loss: u32,
    win_end: Option<StreakPoint>,
    loss_end: Option<StreakPoint>,
}

impl StreakTracker {
    fn observe(&mut self, outcome: Outcome, at: StreakPoint) {
        match outcome {
            Outcome::Win => {
                self.current_win += 1;
                self.current_loss = 0;
                if self.current_win > self.max_win {
                    self.max_win = self.current_win;
                    self.win_end = Some(at);
                }
            }
            Outcome::Loss => {
                self.current_loss += 1;
                self.current_win = 0;
                if self.current_loss > self.max_loss {
                    self.max_loss = self.current_loss;
                    self.loss_end = Some(at);
                }
            }
            Outcome::Tie => {
                self.current_win = 0;
                self.current_loss = 0;
            }
        }
    }
}

/// Streaks for every team over all games (regular season and playoffs),
/// in alphabetical team order.
///
/// Each team's games are replayed in (season, week) order; the recorded
/// maximum only moves on a strictly longer run.
pub fn calculate_streaks(rows: &[TeamWeek]) -> Vec<StreakRecord> {
    let mut by_team: BTreeMap<&str, Vec<&TeamWeek>> = BTreeMap::new();
    for row in rows {
        by_team.entry(row.team_name.as_str()).or_default().push(row);
    }

    by_team
        .into_iter()
        .map(|(team_name, mut games)| {
            games.sort_by_key(|g| (g.season, g.week));
            let mut tracker = StreakTracker::default();
            for g in games {
                tracker.observe(g.outcome(), StreakPoint { season: g.season, week: g.week });
            }
            StreakRecord {
                team_name: team_name.to_string(),
                max_win_streak: tracker.max_win,
                win_streak_end: tracker.win_end,
                max_loss_streak: tracker.max_loss,
                loss_streak_end: tracker.loss_end,
            }
        })
        .collect()
}

pub fn longest_win_streaks(rows: &[TeamWeek], top_n: usize) -> Vec<StreakRecord> {
    let mut streaks = calculate_streaks(rows);
    streaks.sort_by(|a, b| b.max_win_streak.cmp(&a.max_win_streak));
    streaks.truncate(top_n);
    streaks
}

pub fn longest_loss_streaks(rows: &[TeamWeek], top_n: usize) -> Vec<StreakRecord> {
    let mut streaks = calculate_streaks(rows);
    streaks.sort_by(|a, b| b.max_loss_streak.cmp(&a.max_loss_streak));
    streaks.truncate(top_n);
    streaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::types::GameRecord;

    fn game(season: Season, week: Week, a: (&str, f64), b: (&str, f64)) -> GameRecord {
        GameRecord {
            season,
            week,
            team1_id: a.0.to_lowercase(),
            team1_name: a.0.to_string(),
            team2_id: b.0.to_lowercase(),
            team2_name: b.0.to_string(),
            score1: a.1,
            score2: b.1,
            is_playoff: false,
            is_championship: false,
        }
    }

    fn season_2022() -> Vec<TeamWeek> {
        normalize(&[
            game(2022, 1, ("Alpha", 110.0), ("Bravo", 90.0)),
            game(2022, 1, ("Charlie", 100.0), ("Delta", 100.0)),
            game(2022, 2, ("Alpha", 120.0), ("Charlie", 80.0)),
            game(2022, 2, ("Bravo", 95.0), ("Delta", 105.0)),
        ])
    }

    #[test]
    fn test_season_win_leaders_track_ties() {
        let leaders = season_win_leaders(&season_2022());
        assert_eq!(leaders[0].team_name, "Alpha");
        assert_eq!(leaders[0].wins, 2);
        assert_eq!(leaders[0].win_pct, Some(1.0));
        assert_eq!(leaders[0].season_rank, Some(1));

        let charlie = leaders.iter().find(|r| r.team_name == "Charlie").unwrap();
        assert_eq!((charlie.wins, charlie.losses, charlie.ties), (0, 1, 1));
        assert_eq!(charlie.win_pct, Some(0.0));

        let delta = leaders.iter().find(|r| r.team_name == "Delta").unwrap();
        assert_eq!(delta.season_rank, Some(2));
        assert_eq!(charlie.season_rank, Some(3));
    }

    #[test]
    fn test_alltime_win_leaders() {
        let mut games = vec![game(2021, 1, ("Alpha", 80.0), ("Bravo", 90.0))];
        games.push(game(2022, 1, ("Alpha", 100.0), ("Bravo", 90.0)));
        games.push(game(2022, 2, ("Alpha", 100.0), ("Bravo", 90.0)));
        let alltime = alltime_win_leaders(&normalize(&games));
        assert_eq!(alltime[0].team_name, "Alpha");
        assert_eq!(alltime[0].wins, 2);
        assert_eq!(alltime[0].losses, 1);
        assert_eq!(alltime[0].seasons, 2);
    }

    #[test]
    fn test_best_and_worst_by_season() {
        let best = best_teams_by_season(&season_2022());
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].team_name, "Alpha");

        let worst = worst_teams_by_season(&season_2022());
        assert_eq!(worst.len(), 1);
        // Bravo and Charlie both have zero wins; Bravo sorts first
        assert_eq!(worst[0].team_name, "Bravo");
        assert_eq!(worst[0].total_pts, 185.0);
        // Season ppg values: Alpha 115, Bravo 92.5, Charlie 90, Delta 102.5
        assert_eq!(worst[0].ppg_vs_median, Some(92.5 - 97.5));
    }

    #[test]
    fn test_streak_keeps_first_longest_run() {
        let rows = normalize(&[
            game(2022, 1, ("Alpha", 100.0), ("Bravo", 90.0)),
            game(2022, 2, ("Alpha", 100.0), ("Bravo", 90.0)),
            game(2022, 3, ("Alpha", 80.0), ("Bravo", 90.0)),
            game(2022, 4, ("Alpha", 100.0), ("Bravo", 90.0)),
        ]);
        let streaks = calculate_streaks(&rows);
        let alpha = &streaks[0];
        assert_eq!(alpha.max_win_streak, 2);
        assert_eq!(alpha.win_streak_end, Some(StreakPoint { season: 2022, week: 2 }));
        assert_eq!(alpha.max_loss_streak, 1);
        assert_eq!(alpha.loss_streak_end, Some(StreakPoint { season: 2022, week: 3 }));

        let bravo = &streaks[1];
        assert_eq!(bravo.max_loss_streak, 2);
        assert_eq!(bravo.max_win_streak, 1);
    }

    #[test]
    fn test_streaks_follow_chronology_not_input_order() {
        let rows = normalize(&[
            game(2023, 1, ("Alpha", 100.0), ("Bravo", 90.0)),
            game(2022, 14, ("Alpha", 100.0), ("Bravo", 90.0)),
            game(2022, 13, ("Alpha", 100.0), ("Bravo", 90.0)),
        ]);
        let alpha = &calculate_streaks(&rows)[0];
        assert_eq!(alpha.max_win_streak, 3);
        assert_eq!(alpha.win_streak_end, Some(StreakPoint { season: 2023, week: 1 }));
    }

    #[test]
    fn test_tie_breaks_both_streaks() {
        let rows = normalize(&[
            game(2022, 1, ("Alpha", 100.0), ("Bravo", 90.0)),
            game(2022, 2, ("Alpha", 100.0), ("Bravo", 100.0)),
            game(2022, 3, ("Alpha", 100.0), ("Bravo", 90.0)),
        ]);
        let streaks = calculate_streaks(&rows);
        assert_eq!(streaks[0].max_win_streak, 1);
        assert_eq!(streaks[1].max_loss_streak, 1);
    }

    #[test]
    fn test_longest_streak_tables() {
        let rows = season_2022();
        let wins = longest_win_streaks(&rows, 2);
        assert_eq!(wins.len(), 2);
        assert_eq!(wins[0].team_name, "Alpha");
        assert_eq!(wins[0].max_win_streak, 2);

        let losses = longest_loss_streaks(&rows, 1);
        assert_eq!(losses[0].team_name, "Bravo");
        assert_eq!(losses[0].max_loss_streak, 2);

        let none = calculate_streaks(&[]);
        assert!(none.is_empty());
    }
}
