//! # Draft Analyzer
//!
//! Draft classes graded by what the picks produced. Every table here needs
//! season points; without any, the tables come back empty.

use crate::aggregation::{
    competition_ranks, desc, mean, median, rank_within_groups, ratio, sample_std_dev, RankOrder,
};
use crate::types::{DraftPick, Season};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn has_season_points(picks: &[DraftPick]) -> bool {
    picks.iter().any(|p| p.season_points.is_some())
}

/// A pick with its production measured against the slot baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftValue {
    pub season: Season,
    pub team_name: String,
    pub player_name: String,
    pub position: String,
    pub pick: u32,
    pub round: u32,
    pub season_points: f64,
    pub expected_points: f64,
    pub value_over_expected: f64,
}

fn valued(picks: &[DraftPick]) -> impl Iterator<Item = DraftValue> + '_ {
    picks.iter().filter_map(|p| {
        Some(DraftValue {
            season: p.season,
            team_name: p.team_name.clone(),
            player_name: p.player_name.clone(),
            position: p.position.clone(),
            pick: p.pick,
            round: p.round,
            season_points: p.season_points?,
            expected_points: p.expected_points?,
            value_over_expected: p.value_over_expected()?,
        })
    })
}

/// Picks that beat their slot by the most
pub fn draft_steals(picks: &[DraftPick], top_n: usize) -> Vec<DraftValue> {
    let mut steals: Vec<DraftValue> = valued(picks).collect();
    steals.sort_by(|a, b| desc(a.value_over_expected, b.value_over_expected));
    steals.truncate(top_n);
    steals
}

/// Early-round picks (round `early_round_cutoff` or sooner) that fell
/// furthest short of their slot
pub fn draft_busts(picks: &[DraftPick], top_n: usize, early_round_cutoff: u32) -> Vec<DraftValue> {
    let mut busts: Vec<DraftValue> = valued(picks).filter(|v| v.round <= early_round_cutoff).collect();
    busts.sort_by(|a, b| a.value_over_expected.total_cmp(&b.value_over_expected));
    busts.truncate(top_n);
    busts
}

/// One team's draft class in one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftGrade {
    pub season: Season,
    pub team_name: String,
    pub total_drafted_points: f64,
    pub picks: u32,
    pub avg_points_per_pick: Option<f64>,
    pub draft_rank: Option<u32>,
}

/// Draft classes ranked by total points within each season, newest season
/// first then best rank
pub fn draft_grades(picks: &[DraftPick]) -> Vec<DraftGrade> {
    if !has_season_points(picks) {
        return Vec::new();
    }
    let mut totals: BTreeMap<(Season, &str), (f64, u32)> = BTreeMap::new();
    for p in picks {
        let entry = totals.entry((p.season, p.team_name.as_str())).or_default();
        entry.0 += p.season_points.unwrap_or(0.0);
        entry.1 += 1;
    }
    let mut grades: Vec<DraftGrade> = totals
        .into_iter()
        .map(|((season, team), (total, count))| DraftGrade {
            season,
            team_name: team.to_string(),
            total_drafted_points: total,
            picks: count,
            avg_points_per_pick: ratio(total, count as f64),
            draft_rank: None,
        })
        .collect();

    let ranks = rank_within_groups(&grades, |g| g.season, |g| Some(g.total_drafted_points), RankOrder::Descending);
    for (grade, rank) in grades.iter_mut().zip(ranks) {
        grade.draft_rank = rank;
    }
    grades.sort_by(|a, b| b.season.cmp(&a.season).then(a.draft_rank.cmp(&b.draft_rank)));
    grades
}

pub fn best_drafts(picks: &[DraftPick], top_n: usize) -> Vec<DraftGrade> {
    let mut grades = draft_grades(picks);
    grades.sort_by(|a, b| desc(a.total_drafted_points, b.total_drafted_points));
    grades.truncate(top_n);
    grades
}

pub fn worst_drafts(picks: &[DraftPick], top_n: usize) -> Vec<DraftGrade> {
    let mut grades = draft_grades(picks);
    grades.sort_by(|a, b| a.total_drafted_points.total_cmp(&b.total_drafted_points));
    grades.truncate(top_n);
    grades
}

/// Production of every pick made in one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPerformance {
    pub round: u32,
    pub avg_points: Option<f64>,
    pub median_points: Option<f64>,
    pub std_dev: Option<f64>,
    pub max_points: Option<f64>,
    pub total_picks: u32,
}

/// Per-round production, in round order
pub fn round_performance(picks: &[DraftPick]) -> Vec<RoundPerformance> {
    if !has_season_points(picks) {
        return Vec::new();
    }
    let mut rounds: BTreeMap<u32, (Vec<f64>, u32)> = BTreeMap::new();
    for p in picks {
        let entry = rounds.entry(p.round).or_default();
        entry.0.extend(p.season_points);
        entry.1 += 1;
    }
    rounds
        .into_iter()
        .map(|(round, (points, total_picks))| RoundPerformance {
            round,
            avg_points: mean(&points),
            median_points: median(&points),
            std_dev: sample_std_dev(&points),
            max_points: points.iter().copied().reduce(f64::max),
            total_picks,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValue {
    pub position: String,
    pub total_points: f64,
    pub avg_points: Option<f64>,
    pub times_drafted: u32,
    pub avg_draft_position: Option<f64>,
}

/// Production by position, highest total first
pub fn position_draft_value(picks: &[DraftPick]) -> Vec<PositionValue> {
    if !has_season_points(picks) {
        return Vec::new();
    }
    let mut positions: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for p in picks {
        let entry = positions.entry(p.position.as_str()).or_default();
        entry.0.extend(p.season_points);
        entry.1.push(p.pick as f64);
    }
    let mut out: Vec<PositionValue> = positions
        .into_iter()
        .map(|(position, (points, slots))| PositionValue {
            position: position.to_string(),
            total_points: points.iter().sum(),
            avg_points: mean(&points),
            times_drafted: slots.len() as u32,
            avg_draft_position: mean(&slots),
        })
        .collect();
    out.sort_by(|a, b| desc(a.total_points, b.total_points));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstRoundPick {
    pub season: Season,
    pub pick: u32,
    pub team_name: String,
    pub player_name: String,
    pub position: String,
    pub season_points: Option<f64>,
}

/// Every first-round pick, sorted by season then pick
pub fn first_round_performance(picks: &[DraftPick]) -> Vec<FirstRoundPick> {
    if !has_season_points(picks) {
        return Vec::new();
    }
    let mut out: Vec<FirstRoundPick> = picks
        .iter()
        .filter(|p| p.round == 1)
        .map(|p| FirstRoundPick {
            season: p.season,
            pick: p.pick,
            team_name: p.team_name.clone(),
            player_name: p.player_name.clone(),
            position: p.position.clone(),
            season_points: p.season_points,
        })
        .collect();
    out.sort_by_key(|p| (p.season, p.pick));
    out
}

/// Career drafting record of one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDraftHistory {
    pub team_name: String,
    pub total_points: f64,
    pub avg_points_per_pick: Option<f64>,
    pub seasons_drafted: u32,
    pub total_picks: u32,
    pub draft_rank: u32,
}

pub fn team_draft_history(picks: &[DraftPick]) -> Vec<TeamDraftHistory> {
    if !has_season_points(picks) {
        return Vec::new();
    }
    let mut teams: BTreeMap<&str, (Vec<f64>, BTreeSet<Season>, u32)> = BTreeMap::new();
    for p in picks {
        let entry = teams.entry(p.team_name.as_str()).or_default();
        entry.0.extend(p.season_points);
        entry.1.insert(p.season);
        entry.2 += 1;
    }
    let rows: Vec<(String, f64, Option<f64>, u32, u32)> = teams
        .into_iter()
        .map(|(team, (points, seasons, count))| {
            (team.to_string(), points.iter().sum(), mean(&points), seasons.len() as u32, count)
        })
        .collect();
    let totals: Vec<f64> = rows.iter().map(|r| r.1).collect();
    let ranks = competition_ranks(&totals, RankOrder::Descending);

    let mut out: Vec<TeamDraftHistory> = rows
        .into_iter()
        .zip(ranks)
        .map(|((team_name, total_points, avg, seasons, picks), rank)| TeamDraftHistory {
            team_name,
            total_points,
            avg_points_per_pick: avg,
            seasons_drafted: seasons,
            total_picks: picks,
            draft_rank: rank,
        })
        .collect();
    out.sort_by(|a, b| desc(a.total_points, b.total_points));
    out
}

/// Fill missing `expected_points` with the league's historical average for
/// the same overall pick. Slots never scored stay `None`.
pub fn apply_slot_baseline(picks: &[DraftPick]) -> Vec<DraftPick> {
    let mut by_slot: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for p in picks {
        if let Some(points) = p.season_points {
            by_slot.entry(p.pick).or_default().push(points);
        }
    }
    let baseline: BTreeMap<u32, f64> = by_slot
        .into_iter()
        .filter_map(|(slot, points)| Some((slot, mean(&points)?)))
        .collect();

    picks
        .iter()
        .cloned()
        .map(|mut p| {
            if p.expected_points.is_none() {
                p.expected_points = baseline.get(&p.pick).copied();
            }
            p
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(season: Season, team: &str, player: &str, position: &str, overall: u32, round: u32, points: Option<f64>, expected: Option<f64>) -> DraftPick {
        DraftPick {
            season,
            team_name: team.to_string(),
            player_name: player.to_string(),
            position: position.to_string(),
            pick: overall,
            round,
            season_points: points,
            expected_points: expected,
        }
    }

    fn draft() -> Vec<DraftPick> {
        vec![
            pick(2022, "Alpha", "Runner One", "RB", 1, 1, Some(250.0), Some(220.0)),
            pick(2022, "Bravo", "Wideout One", "WR", 2, 1, Some(120.0), Some(210.0)),
            pick(2022, "Alpha", "Late Flyer", "WR", 15, 8, Some(180.0), Some(60.0)),
            pick(2022, "Bravo", "Tight End", "TE", 16, 8, None, Some(55.0)),
            pick(2023, "Alpha", "Runner Two", "RB", 1, 1, Some(200.0), Some(220.0)),
            pick(2023, "Bravo", "Passer", "QB", 12, 6, Some(100.0), Some(150.0)),
        ]
    }

    #[test]
    fn test_steals_and_busts() {
        let steals = draft_steals(&draft(), 2);
        assert_eq!(steals[0].player_name, "Late Flyer");
        assert_eq!(steals[0].value_over_expected, 120.0);
        assert_eq!(steals[1].player_name, "Runner One");

        let busts = draft_busts(&draft(), 5, 5);
        assert_eq!(busts.iter().map(|b| b.player_name.as_str()).collect::<Vec<_>>(), vec!["Wideout One", "Runner Two", "Runner One"]);

        let wider = draft_busts(&draft(), 1, 6);
        assert_eq!(wider[0].player_name, "Wideout One");
    }

    #[test]
    fn test_draft_grades() {
        let grades = draft_grades(&draft());
        assert_eq!(grades[0].season, 2023);
        assert_eq!(grades[0].team_name, "Alpha");
        assert_eq!(grades[0].draft_rank, Some(1));

        let bravo_2022 = grades.iter().find(|g| g.season == 2022 && g.team_name == "Bravo").unwrap();
        assert_eq!(bravo_2022.total_drafted_points, 120.0);
        assert_eq!(bravo_2022.picks, 2);
        assert_eq!(bravo_2022.avg_points_per_pick, Some(60.0));
        assert_eq!(bravo_2022.draft_rank, Some(2));

        assert_eq!(best_drafts(&draft(), 1)[0].total_drafted_points, 430.0);
        assert_eq!(worst_drafts(&draft(), 1)[0].total_drafted_points, 100.0);
    }

    #[test]
    fn test_round_and_position_tables() {
        let rounds = round_performance(&draft());
        assert_eq!(rounds.iter().map(|r| r.round).collect::<Vec<_>>(), vec![1, 6, 8]);
        assert_eq!(rounds[0].total_picks, 3);
        assert_eq!(rounds[0].median_points, Some(200.0));
        assert_eq!(rounds[0].max_points, Some(250.0));
        assert_eq!(rounds[2].total_picks, 2);
        assert_eq!(rounds[2].std_dev, None);

        let positions = position_draft_value(&draft());
        assert_eq!(positions[0].position, "RB");
        assert_eq!(positions[0].total_points, 450.0);
        assert_eq!(positions[0].avg_draft_position, Some(1.0));
        let te = positions.iter().find(|p| p.position == "TE").unwrap();
        // Counted even without season points
        assert_eq!(te.times_drafted, 1);
        assert_eq!(te.avg_draft_position, Some(16.0));
        assert_eq!(te.avg_points, None);
    }

    #[test]
    fn test_first_round_and_history() {
        let firsts = first_round_performance(&draft());
        assert_eq!(firsts.iter().map(|p| (p.season, p.pick)).collect::<Vec<_>>(), vec![(2022, 1), (2022, 2), (2023, 1)]);

        let history = team_draft_history(&draft());
        assert_eq!(history[0].team_name, "Alpha");
        assert_eq!(history[0].total_points, 630.0);
        assert_eq!(history[0].seasons_drafted, 2);
        assert_eq!(history[0].draft_rank, 1);
        assert_eq!(history[1].total_picks, 3);
    }

    #[test]
    fn test_missing_points_yield_empty_tables() {
        let picks: Vec<DraftPick> = draft()
            .into_iter()
            .map(|mut p| {
                p.season_points = None;
                p
            })
            .collect();
        assert!(draft_grades(&picks).is_empty());
        assert!(round_performance(&picks).is_empty());
        assert!(team_draft_history(&picks).is_empty());
        assert!(draft_steals(&picks, 5).is_empty());
    }

    #[test]
    fn test_slot_baseline_fills_gaps_only() {
        let mut picks = draft();
        for p in picks.iter_mut() {
            if p.pick == 1 {
                p.expected_points = None;
            }
        }
        let filled = apply_slot_baseline(&picks);
        assert_eq!(filled[0].expected_points, Some(225.0));
        assert_eq!(filled[4].expected_points, Some(225.0));
        assert_eq!(filled[1].expected_points, Some(210.0));
        assert_eq!(filled[0].value_over_expected(), Some(25.0));
    }
}
