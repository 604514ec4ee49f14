//! # Scoring Analyzer
//!
//! Weekly extremes plus season and all-time points tables. Every function
//! takes the normalized perspective rows and returns rows already sorted in
//! the order the report renders them.

use crate::aggregation::{
    bottom_n_by, rank_within_groups, rollup_all_time, rollup_by_season, top_n_by, RankOrder,
};
use crate::normalize::{filtered, GameFilter};
use crate::types::{Season, TeamWeek, Week};
use serde::{Deserialize, Serialize};

/// A single-week team score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub season: Season,
    pub week: Week,
    pub team_name: String,
    pub points_for: f64,
    pub opponent_name: String,
    pub won: bool,
    pub is_playoff: bool,
}

impl From<&TeamWeek> for WeeklyScore {
    fn from(row: &TeamWeek) -> Self {
        Self {
            season: row.season,
            week: row.week,
            team_name: row.team_name.clone(),
            points_for: row.points_for,
            opponent_name: row.opponent_name.clone(),
            won: row.won,
            is_playoff: row.is_playoff,
        }
    }
}

/// Highest single-week scores, descending
pub fn weekly_high_scores(rows: &[TeamWeek], top_n: usize, include_playoffs: bool) -> Vec<WeeklyScore> {
    let scores = filtered(rows, GameFilter::with_playoffs(include_playoffs))
        .map(WeeklyScore::from)
        .collect();
    top_n_by(scores, top_n, |s: &WeeklyScore| s.points_for)
}

/// Lowest single-week scores, ascending.
///
/// Zero-point entries are unplayed weeks, not genuine low performances, and
/// are left out.
pub fn weekly_low_scores(rows: &[TeamWeek], top_n: usize, include_playoffs: bool) -> Vec<WeeklyScore> {
    let scores = filtered(rows, GameFilter::with_playoffs(include_playoffs))
        .filter(|r| r.points_for > 0.0)
        .map(WeeklyScore::from)
        .collect();
    bottom_n_by(scores, top_n, |s: &WeeklyScore| s.points_for)
}

/// Total points for one team in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonScoring {
    pub season: Season,
    pub team_name: String,
    pub total_points: f64,
    pub games: u32,
    pub ppg: Option<f64>,
    pub season_rank: Option<u32>,
}

/// Season points totals, ranked within each season by total points.
///
/// Sorted newest season first, then by total points descending.
pub fn season_scoring_leaders(rows: &[TeamWeek], include_playoffs: bool) -> Vec<SeasonScoring> {
    let totals = rollup_by_season(filtered(rows, GameFilter::with_playoffs(include_playoffs)));
    let mut out: Vec<SeasonScoring> = totals
        .into_iter()
        .map(|((season, team_name), t)| SeasonScoring {
            season,
            team_name,
            total_points: t.points_for,
            games: t.games,
            ppg: t.ppg(),
            season_rank: None,
        })
        .collect();

    let ranks = rank_within_groups(&out, |r| r.season, |r| Some(r.total_points), RankOrder::Descending);
    for (row, rank) in out.iter_mut().zip(ranks) {
        row.season_rank = rank;
    }

    out.sort_by(|a, b| b.season.cmp(&a.season).then(b.total_points.total_cmp(&a.total_points)));
    out
}

/// Regular-season points across every season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeScoring {
    pub team_name: String,
    pub total_points: f64,
    pub games: u32,
    pub seasons: u32,
    pub ppg: Option<f64>,
}

/// All-time regular-season points, descending
pub fn alltime_scoring_leaders(rows: &[TeamWeek]) -> Vec<AllTimeScoring> {
    let mut out: Vec<AllTimeScoring> = rollup_all_time(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .map(|(team_name, t)| AllTimeScoring {
            team_name,
            total_points: t.points_for,
            games: t.games,
            seasons: t.season_count(),
            ppg: t.ppg(),
        })
        .collect();
    out.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
    out
}

/// The top regular-season scorer(s) of every season; shared first place
/// yields one row per team.
pub fn season_high_scorers(rows: &[TeamWeek]) -> Vec<SeasonScoring> {
    season_scoring_leaders(rows, false)
        .into_iter()
        .filter(|r| r.season_rank == Some(1))
        .collect()
}

/// Points for and against for one team-season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsSummary {
    pub season: Season,
    pub team_name: String,
    pub points_for: f64,
    pub points_against: f64,
    pub wins: u32,
    pub games: u32,
    pub point_diff: f64,
    pub ppg_for: Option<f64>,
    pub ppg_against: Option<f64>,
}

/// Regular-season PF/PA per team-season, newest season first then by PF
pub fn points_for_vs_against(rows: &[TeamWeek]) -> Vec<PointsSummary> {
    let mut out: Vec<PointsSummary> = rollup_by_season(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .map(|((season, team_name), t)| PointsSummary {
            season,
            team_name,
            points_for: t.points_for,
            points_against: t.points_against,
            wins: t.wins,
            games: t.games,
            point_diff: t.points_for - t.points_against,
            ppg_for: t.ppg(),
            ppg_against: t.pa_per_game(),
        })
        .collect();
    out.sort_by(|a, b| b.season.cmp(&a.season).then(b.points_for.total_cmp(&a.points_for)));
    out
}

/// Chart feed: regular-season points per team per year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTotal {
    pub season: Season,
    pub team_name: String,
    pub total_points: f64,
}

/// Sorted by season, then team name
pub fn yearly_scoring_totals(rows: &[TeamWeek]) -> Vec<YearlyTotal> {
    rollup_by_season(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .map(|((season, team_name), t)| YearlyTotal { season, team_name, total_points: t.points_for })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::types::GameRecord;

    fn game(season: Season, week: Week, a: (&str, f64), b: (&str, f64), playoff: bool) -> GameRecord {
        GameRecord {
            season,
            week,
            team1_id: a.0.to_lowercase(),
            team1_name: a.0.to_string(),
            team2_id: b.0.to_lowercase(),
            team2_name: b.0.to_string(),
            score1: a.1,
            score2: b.1,
            is_playoff: playoff,
            is_championship: false,
        }
    }

    fn sample() -> Vec<TeamWeek> {
        normalize(&[
            game(2022, 1, ("Alpha", 120.0), ("Bravo", 90.0), false),
            game(2022, 2, ("Alpha", 100.0), ("Bravo", 110.0), false),
            game(2022, 15, ("Alpha", 150.0), ("Bravo", 0.0), true),
            game(2023, 1, ("Alpha", 80.0), ("Charlie", 130.0), false),
        ])
    }

    #[test]
    fn test_weekly_high_scores_respects_playoff_flag() {
        let rows = sample();
        let with = weekly_high_scores(&rows, 2, true);
        assert_eq!(with[0].points_for, 150.0);
        assert!(with[0].is_playoff);

        let without = weekly_high_scores(&rows, 2, false);
        assert_eq!(without[0].points_for, 130.0);
        assert_eq!(without[1].points_for, 120.0);
    }

    #[test]
    fn test_weekly_low_scores_skip_zero() {
        let lows = weekly_low_scores(&sample(), 3, true);
        assert_eq!(lows.iter().map(|s| s.points_for).collect::<Vec<_>>(), vec![80.0, 90.0, 100.0]);
    }

    #[test]
    fn test_season_scoring_leaders_order_and_rank() {
        let leaders = season_scoring_leaders(&sample(), false);
        assert_eq!(leaders[0].season, 2023);
        assert_eq!(leaders[0].team_name, "Charlie");
        assert_eq!(leaders[0].season_rank, Some(1));

        let alpha_2022 = leaders.iter().find(|r| r.season == 2022 && r.team_name == "Alpha").unwrap();
        assert_eq!(alpha_2022.total_points, 220.0);
        assert_eq!(alpha_2022.games, 2);
        assert_eq!(alpha_2022.ppg, Some(110.0));
        assert_eq!(alpha_2022.season_rank, Some(1));
    }

    #[test]
    fn test_season_rank_shares_ties() {
        let rows = normalize(&[game(2021, 1, ("Alpha", 100.0), ("Bravo", 100.0), false)]);
        let leaders = season_scoring_leaders(&rows, false);
        assert!(leaders.iter().all(|r| r.season_rank == Some(1)));
        assert_eq!(season_high_scorers(&rows).len(), 2);
    }

    #[test]
    fn test_alltime_scoring_is_regular_season_only() {
        let alltime = alltime_scoring_leaders(&sample());
        let alpha = alltime.iter().find(|r| r.team_name == "Alpha").unwrap();
        assert_eq!(alpha.total_points, 300.0);
        assert_eq!(alpha.games, 3);
        assert_eq!(alpha.seasons, 2);
        assert_eq!(alltime[0].team_name, "Alpha");
    }

    #[test]
    fn test_points_for_vs_against() {
        let summary = points_for_vs_against(&sample());
        let bravo = summary.iter().find(|r| r.team_name == "Bravo").unwrap();
        assert_eq!(bravo.points_for, 200.0);
        assert_eq!(bravo.points_against, 220.0);
        assert_eq!(bravo.point_diff, -20.0);
        assert_eq!(bravo.wins, 1);
        assert_eq!(bravo.ppg_against, Some(110.0));
    }

    #[test]
    fn test_yearly_totals_sorted_by_season_then_team() {
        let totals = yearly_scoring_totals(&sample());
        let keys: Vec<_> = totals.iter().map(|t| (t.season, t.team_name.as_str())).collect();
        assert_eq!(keys, vec![(2022, "Alpha"), (2022, "Bravo"), (2023, "Alpha"), (2023, "Charlie")]);
    }

    #[test]
    fn test_empty_input_yields_empty_tables() {
        assert!(weekly_high_scores(&[], 10, true).is_empty());
        assert!(season_scoring_leaders(&[], false).is_empty());
        assert!(alltime_scoring_leaders(&[]).is_empty());
        assert!(season_high_scorers(&[]).is_empty());
    }
}
