//! # Luck Analyzer
//!
//! Separates schedule luck from scoring strength. Each team's weekly score
//! is compared against the weekly median and against every other team's
//! score that week (the all-play record); the gap between the actual and
//! the all-play win rate is the luck index.
//!
//! All-play and luck tables use regular-season weeks only. Weekly medians,
//! and the lucky/unlucky game lists derived from them, include playoff
//! weeks.

use crate::aggregation::{
    asc_defined_first, bottom_n_by, desc_defined_first, mean, median, rank_within_groups, ratio,
    rollup_by_season, top_n_by, RankOrder,
};
use crate::normalize::{filtered, GameFilter};
use crate::types::{Outcome, Season, TeamWeek, Week};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Median points-for across every team that played in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMedian {
    pub season: Season,
    pub week: Week,
    pub median_score: f64,
}

/// Per-(season, week) median, in chronological order
pub fn weekly_medians(rows: &[TeamWeek]) -> Vec<WeeklyMedian> {
    median_lookup(rows)
        .into_iter()
        .map(|((season, week), median_score)| WeeklyMedian { season, week, median_score })
        .collect()
}

fn median_lookup(rows: &[TeamWeek]) -> BTreeMap<(Season, Week), f64> {
    let mut scores: BTreeMap<(Season, Week), Vec<f64>> = BTreeMap::new();
    for row in rows {
        scores.entry((row.season, row.week)).or_default().push(row.points_for);
    }
    scores
        .into_iter()
        .filter_map(|(key, values)| Some((key, median(&values)?)))
        .collect()
}

/// A loss despite outscoring the weekly median
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnluckyLoss {
    pub season: Season,
    pub week: Week,
    pub team_name: String,
    pub points_for: f64,
    pub opponent_name: String,
    pub points_against: f64,
    pub median_score: f64,
    pub above_median: f64,
}

/// Highest-scoring losses that beat the weekly median, by points-for descending
pub fn unlucky_losses(rows: &[TeamWeek], top_n: usize) -> Vec<UnluckyLoss> {
    let medians = median_lookup(rows);
    let losses = rows
        .iter()
        .filter(|r| r.outcome() == Outcome::Loss)
        .filter_map(|r| {
            let median_score = *medians.get(&(r.season, r.week))?;
            (r.points_for > median_score).then(|| UnluckyLoss {
                season: r.season,
                week: r.week,
                team_name: r.team_name.clone(),
                points_for: r.points_for,
                opponent_name: r.opponent_name.clone(),
                points_against: r.points_against,
                median_score,
                above_median: r.points_for - median_score,
            })
        })
        .collect();
    top_n_by(losses, top_n, |l: &UnluckyLoss| l.points_for)
}

/// A win despite scoring under the weekly median
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuckyWin {
    pub season: Season,
    pub week: Week,
    pub team_name: String,
    pub points_for: f64,
    pub opponent_name: String,
    pub points_against: f64,
    pub median_score: f64,
    pub below_median: f64,
}

/// Lowest-scoring wins under the weekly median, by points-for ascending
pub fn lucky_wins(rows: &[TeamWeek], top_n: usize) -> Vec<LuckyWin> {
    let medians = median_lookup(rows);
    let wins = rows
        .iter()
        .filter(|r| r.won)
        .filter_map(|r| {
            let median_score = *medians.get(&(r.season, r.week))?;
            (r.points_for < median_score).then(|| LuckyWin {
                season: r.season,
                week: r.week,
                team_name: r.team_name.clone(),
                points_for: r.points_for,
                opponent_name: r.opponent_name.clone(),
                points_against: r.points_against,
                median_score,
                below_median: median_score - r.points_for,
            })
        })
        .collect();
    bottom_n_by(wins, top_n, |w: &LuckyWin| w.points_for)
}

/// One team's all-play result for one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllPlayWeek {
    pub season: Season,
    pub week: Week,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

/// Every regular-season team score compared with every other score that
/// same week. Output is chronological, teams in input order within a week.
pub fn all_play_weekly(rows: &[TeamWeek]) -> Vec<AllPlayWeek> {
    let mut weeks: BTreeMap<(Season, Week), Vec<&TeamWeek>> = BTreeMap::new();
    for row in filtered(rows, GameFilter::RegularSeason) {
        weeks.entry((row.season, row.week)).or_default().push(row);
    }

    let mut out = Vec::new();
    for ((season, week), entries) in weeks {
        for (i, team) in entries.iter().enumerate() {
            let mut rec = AllPlayWeek { season, week, team_name: team.team_name.clone(), wins: 0, losses: 0, ties: 0 };
            for (j, other) in entries.iter().enumerate() {
                if i == j {
                    continue;
                }
                match Outcome::from_scores(team.points_for, other.points_for) {
                    Outcome::Win => rec.wins += 1,
                    Outcome::Loss => rec.losses += 1,
                    Outcome::Tie => rec.ties += 1,
                }
            }
            out.push(rec);
        }
    }
    out
}

/// Season all-play totals for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllPlayRecord {
    pub season: Season,
    pub team_name: String,
    pub all_play_wins: u32,
    pub all_play_losses: u32,
    pub all_play_ties: u32,
    pub all_play_games: u32,
    pub all_play_win_pct: Option<f64>,
}

/// All-play records per team-season, newest season first then best win rate
pub fn all_play_records(rows: &[TeamWeek]) -> Vec<AllPlayRecord> {
    let mut totals: BTreeMap<(Season, String), (u32, u32, u32)> = BTreeMap::new();
    for week in all_play_weekly(rows) {
        let entry = totals.entry((week.season, week.team_name)).or_default();
        entry.0 += week.wins;
        entry.1 += week.losses;
        entry.2 += week.ties;
    }

    let mut out: Vec<AllPlayRecord> = totals
        .into_iter()
        .map(|((season, team_name), (w, l, t))| {
            let games = w + l + t;
            AllPlayRecord {
                season,
                team_name,
                all_play_wins: w,
                all_play_losses: l,
                all_play_ties: t,
                all_play_games: games,
                all_play_win_pct: ratio(w as f64, games as f64),
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.season
            .cmp(&a.season)
            .then(desc_defined_first(a.all_play_win_pct, b.all_play_win_pct))
    });
    out
}

/// Career all-play totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeAllPlay {
    pub team_name: String,
    pub all_play_wins: u32,
    pub all_play_losses: u32,
    pub all_play_ties: u32,
    pub all_play_games: u32,
    pub all_play_win_pct: Option<f64>,
    pub seasons: u32,
}

pub fn alltime_all_play(rows: &[TeamWeek]) -> Vec<AllTimeAllPlay> {
    let mut totals: BTreeMap<String, (u32, u32, u32, BTreeSet<Season>)> = BTreeMap::new();
    for rec in all_play_records(rows) {
        let entry = totals.entry(rec.team_name).or_default();
        entry.0 += rec.all_play_wins;
        entry.1 += rec.all_play_losses;
        entry.2 += rec.all_play_ties;
        entry.3.insert(rec.season);
    }

    let mut out: Vec<AllTimeAllPlay> = totals
        .into_iter()
        .map(|(team_name, (w, l, t, seasons))| {
            let games = w + l + t;
            AllTimeAllPlay {
                team_name,
                all_play_wins: w,
                all_play_losses: l,
                all_play_ties: t,
                all_play_games: games,
                all_play_win_pct: ratio(w as f64, games as f64),
                seasons: seasons.len() as u32,
            }
        })
        .collect();
    out.sort_by(|a, b| desc_defined_first(a.all_play_win_pct, b.all_play_win_pct));
    out
}

/// Actual versus all-play win rate for one team-season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuckIndex {
    pub season: Season,
    pub team_name: String,
    pub actual_wins: u32,
    pub games: u32,
    pub actual_win_pct: Option<f64>,
    pub all_play_win_pct: Option<f64>,
    /// Positive means the schedule helped
    pub luck_index: Option<f64>,
}

/// Luck index per regular-season team-season, unluckiest first
pub fn luck_index(rows: &[TeamWeek]) -> Vec<LuckIndex> {
    let all_play: BTreeMap<(Season, String), Option<f64>> = all_play_records(rows)
        .into_iter()
        .map(|r| ((r.season, r.team_name), r.all_play_win_pct))
        .collect();

    let mut out: Vec<LuckIndex> = rollup_by_season(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .filter_map(|(key, t)| {
            let all_play_win_pct = *all_play.get(&key)?;
            let actual_win_pct = t.win_pct();
            let (season, team_name) = key;
            Some(LuckIndex {
                season,
                team_name,
                actual_wins: t.wins,
                games: t.games,
                actual_win_pct,
                all_play_win_pct,
                luck_index: actual_win_pct.zip(all_play_win_pct).map(|(a, p)| a - p),
            })
        })
        .collect();
    out.sort_by(|a, b| asc_defined_first(a.luck_index, b.luck_index));
    out
}

pub fn unluckiest_teams(rows: &[TeamWeek], top_n: usize) -> Vec<LuckIndex> {
    let mut luck: Vec<_> = luck_index(rows).into_iter().filter(|l| l.luck_index.is_some()).collect();
    luck.truncate(top_n);
    luck
}

pub fn luckiest_teams(rows: &[TeamWeek], top_n: usize) -> Vec<LuckIndex> {
    let mut luck: Vec<_> = luck_index(rows).into_iter().filter(|l| l.luck_index.is_some()).collect();
    luck.sort_by(|a, b| desc_defined_first(a.luck_index, b.luck_index));
    luck.truncate(top_n);
    luck
}

/// Regular-season points allowed by one team in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsAgainstSummary {
    pub season: Season,
    pub team_name: String,
    pub total_pa: f64,
    pub avg_pa: Option<f64>,
    pub total_pf: f64,
    pub wins: u32,
    /// 1 = fewest points allowed that season
    pub pa_rank: Option<u32>,
}

/// Points-against per team-season, newest season first then fewest allowed
pub fn points_against_analysis(rows: &[TeamWeek]) -> Vec<PointsAgainstSummary> {
    let mut out: Vec<PointsAgainstSummary> = rollup_by_season(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .map(|((season, team_name), t)| PointsAgainstSummary {
            season,
            team_name,
            total_pa: t.points_against,
            avg_pa: t.pa_per_game(),
            total_pf: t.points_for,
            wins: t.wins,
            pa_rank: None,
        })
        .collect();

    let ranks = rank_within_groups(&out, |r| r.season, |r| Some(r.total_pa), RankOrder::Ascending);
    for (row, rank) in out.iter_mut().zip(ranks) {
        row.pa_rank = rank;
    }
    out.sort_by(|a, b| b.season.cmp(&a.season).then(a.total_pa.total_cmp(&b.total_pa)));
    out
}

/// The team that faced the most points in a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsAgainstLeader {
    pub season: Season,
    pub team_name: String,
    pub total_pa: f64,
    pub avg_pa: Option<f64>,
    pub wins: u32,
    pub games: u32,
    pub league_avg_pa: f64,
    pub pa_vs_avg: f64,
}

/// One row per season, newest first. Equal totals go to the alphabetically
/// first team.
pub fn points_against_leaders_by_year(rows: &[TeamWeek]) -> Vec<PointsAgainstLeader> {
    let totals = rollup_by_season(filtered(rows, GameFilter::RegularSeason));

    let mut pa_by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for ((season, _), t) in &totals {
        pa_by_season.entry(*season).or_default().push(t.points_against);
    }

    let mut leaders: BTreeMap<Season, PointsAgainstLeader> = BTreeMap::new();
    for ((season, team_name), t) in totals {
        if leaders.get(&season).is_some_and(|l| l.total_pa >= t.points_against) {
            continue;
        }
        let Some(league_avg_pa) = pa_by_season.get(&season).and_then(|v| mean(v)) else {
            continue;
        };
        leaders.insert(
            season,
            PointsAgainstLeader {
                season,
                team_name,
                total_pa: t.points_against,
                avg_pa: t.pa_per_game(),
                wins: t.wins,
                games: t.games,
                league_avg_pa,
                pa_vs_avg: t.points_against - league_avg_pa,
            },
        );
    }
    leaders.into_values().rev().collect()
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

    /// Four teams over two weeks; Alpha scores well but draws Bravo in week 1
    fn league() -> Vec<TeamWeek> {
        normalize(&[
            game(2022, 1, ("Alpha", 120.0), ("Bravo", 130.0)),
            game(2022, 1, ("Charlie", 80.0), ("Delta", 70.0)),
            game(2022, 2, ("Alpha", 110.0), ("Charlie", 100.0)),
            game(2022, 2, ("Bravo", 90.0), ("Delta", 95.0)),
        ])
    }

    #[test]
    fn test_weekly_medians() {
        let medians = weekly_medians(&league());
        assert_eq!(medians.len(), 2);
        assert_eq!(medians[0].median_score, 100.0);
        assert_eq!(medians[1].median_score, 97.5);
    }

    #[test]
    fn test_unlucky_losses() {
        let losses = unlucky_losses(&league(), 10);
        assert_eq!(losses.len(), 2);
        assert_eq!(losses[0].team_name, "Alpha");
        assert_eq!(losses[0].above_median, 20.0);
        assert_eq!(losses[0].opponent_name, "Bravo");
        assert_eq!(losses[1].team_name, "Charlie");
        assert_eq!(losses[1].above_median, 2.5);

        assert_eq!(unlucky_losses(&league(), 1).len(), 1);

        // A tie above the median is not a loss
        let mut rows = league();
        rows.extend(normalize(&[
            game(2022, 3, ("Alpha", 140.0), ("Bravo", 140.0)),
            game(2022, 3, ("Charlie", 90.0), ("Delta", 100.0)),
        ]));
        let losses = unlucky_losses(&rows, 10);
        assert_eq!(losses.len(), 2);
        assert!(losses.iter().all(|l| l.week != 3));
    }

    #[test]
    fn test_lucky_wins() {
        let wins = lucky_wins(&league(), 10);
        assert_eq!(wins.len(), 2);
        assert_eq!(wins[0].team_name, "Charlie");
        assert_eq!(wins[0].points_for, 80.0);
        assert_eq!(wins[0].below_median, 20.0);
        assert_eq!(wins[1].team_name, "Delta");
        assert_eq!(wins[1].below_median, 2.5);
    }

    #[test]
    fn test_all_play_records() {
        let weekly = all_play_weekly(&league());
        assert_eq!(weekly.len(), 8);
        let week1_alpha = weekly.iter().find(|w| w.week == 1 && w.team_name == "Alpha").unwrap();
        assert_eq!((week1_alpha.wins, week1_alpha.losses), (2, 1));

        let records = all_play_records(&league());
        assert_eq!(records[0].team_name, "Alpha");
        assert_eq!(records[0].all_play_wins, 5);
        assert_eq!(records[0].all_play_games, 6);

        let alltime = alltime_all_play(&league());
        assert_eq!(alltime[0].team_name, "Alpha");
        assert_eq!(alltime[0].seasons, 1);
    }

    #[test]
    fn test_all_play_counts_ties() {
        let rows = normalize(&[game(2022, 1, ("Alpha", 100.0), ("Bravo", 100.0))]);
        let weekly = all_play_weekly(&rows);
        assert!(weekly.iter().all(|w| w.ties == 1 && w.wins == 0 && w.losses == 0));
    }

    #[test]
    fn test_luck_index_order() {
        let luck = luck_index(&league());
        assert_eq!(luck[0].team_name, "Alpha");
        assert!((luck[0].luck_index.unwrap() - (0.5 - 5.0 / 6.0)).abs() < 1e-12);

        let luckiest = luckiest_teams(&league(), 1);
        assert_eq!(luckiest[0].team_name, "Delta");
        assert!((luckiest[0].luck_index.unwrap() - (0.5 - 1.0 / 6.0)).abs() < 1e-12);

        assert_eq!(unluckiest_teams(&league(), 2).len(), 2);
    }

    #[test]
    fn test_points_against() {
        let pa = points_against_analysis(&league());
        assert_eq!(pa[0].team_name, "Delta");
        assert_eq!(pa[0].total_pa, 170.0);
        assert_eq!(pa[0].pa_rank, Some(1));
        let alpha = pa.iter().find(|p| p.team_name == "Alpha").unwrap();
        assert_eq!(alpha.total_pa, 230.0);
        assert_eq!(alpha.pa_rank, Some(4));

        let leaders = points_against_leaders_by_year(&league());
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].team_name, "Alpha");
        assert_eq!(leaders[0].league_avg_pa, 198.75);
        assert_eq!(leaders[0].pa_vs_avg, 31.25);
    }

    #[test]
    fn test_empty_input() {
        assert!(weekly_medians(&[]).is_empty());
        assert!(all_play_records(&[]).is_empty());
        assert!(luck_index(&[]).is_empty());
        assert!(points_against_leaders_by_year(&[]).is_empty());
    }
}
