//! # Consistency Analyzer
//!
//! Scoring variance over regular-season games: coefficient of variation
//! rankings, boom/bust classification and percentile distributions.

use crate::aggregation::{
    asc_defined_first, coefficient_of_variation, desc_defined_first, mean, percentile, rank_within_groups,
    ratio, rollup_all_time, rollup_by_season, sample_std_dev, sorted_copy, RankOrder,
};
use crate::normalize::{filtered, GameFilter};
use crate::types::{Season, TeamWeek};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spread of one team's weekly scores within a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringVariance {
    pub season: Season,
    pub team_name: String,
    pub avg_score: f64,
    /// Undefined for a single game
    pub std_dev: Option<f64>,
    pub min_score: f64,
    pub max_score: f64,
    pub games: u32,
    /// Undefined when the average is zero or the std dev is undefined
    pub cv: Option<f64>,
    pub score_range: f64,
    /// Ascending-CV rank within the season; filled by [`consistency_rankings`]
    #[serde(default)]
    pub consistency_rank: Option<u32>,
}

fn min_max(scores: &[f64]) -> (f64, f64) {
    scores.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(*s), hi.max(*s)))
}

/// Variance metrics per team-season, newest season first then ascending CV
pub fn scoring_variance(rows: &[TeamWeek]) -> Vec<ScoringVariance> {
    let mut out: Vec<ScoringVariance> = rollup_by_season(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .filter_map(|((season, team_name), t)| {
            let avg = mean(&t.scores)?;
            let std_dev = sample_std_dev(&t.scores);
            let (min_score, max_score) = min_max(&t.scores);
            Some(ScoringVariance {
                season,
                team_name,
                avg_score: avg,
                std_dev,
                min_score,
                max_score,
                games: t.games,
                cv: coefficient_of_variation(std_dev, avg),
                score_range: max_score - min_score,
                consistency_rank: None,
            })
        })
        .collect();
    out.sort_by(|a, b| b.season.cmp(&a.season).then(asc_defined_first(a.cv, b.cv)));
    out
}

/// Lowest-CV team-seasons across all years
pub fn most_consistent(rows: &[TeamWeek], top_n: usize) -> Vec<ScoringVariance> {
    let mut all: Vec<_> = scoring_variance(rows).into_iter().filter(|v| v.cv.is_some()).collect();
    all.sort_by(|a, b| asc_defined_first(a.cv, b.cv));
    all.truncate(top_n);
    all
}

/// Highest-CV team-seasons across all years
pub fn most_volatile(rows: &[TeamWeek], top_n: usize) -> Vec<ScoringVariance> {
    let mut all: Vec<_> = scoring_variance(rows).into_iter().filter(|v| v.cv.is_some()).collect();
    all.sort_by(|a, b| desc_defined_first(a.cv, b.cv));
    all.truncate(top_n);
    all
}

/// Variance table with `consistency_rank` filled in, sorted by season then rank
pub fn consistency_rankings(rows: &[TeamWeek]) -> Vec<ScoringVariance> {
    let mut table = scoring_variance(rows);
    let ranks = rank_within_groups(&table, |v| v.season, |v| v.cv, RankOrder::Ascending);
    for (row, rank) in table.iter_mut().zip(ranks) {
        row.consistency_rank = rank;
    }
    table.sort_by(|a, b| {
        a.season.cmp(&b.season).then(match (a.consistency_rank, b.consistency_rank) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });
    table
}

/// Career scoring spread for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeConsistency {
    pub team_name: String,
    pub avg_score: f64,
    pub std_dev: Option<f64>,
    pub min_score: f64,
    pub max_score: f64,
    pub total_games: u32,
    pub seasons: u32,
    pub cv: Option<f64>,
    pub score_range: f64,
}

/// Regular-season variance across every season, ascending CV
pub fn alltime_consistency(rows: &[TeamWeek]) -> Vec<AllTimeConsistency> {
    let mut out: Vec<AllTimeConsistency> = rollup_all_time(filtered(rows, GameFilter::RegularSeason))
        .into_iter()
        .filter_map(|(team_name, t)| {
            let avg = mean(&t.scores)?;
            let std_dev = sample_std_dev(&t.scores);
            let (min_score, max_score) = min_max(&t.scores);
            Some(AllTimeConsistency {
                team_name,
                avg_score: avg,
                std_dev,
                min_score,
                max_score,
                total_games: t.games,
                seasons: t.season_count(),
                cv: coefficient_of_variation(std_dev, avg),
                score_range: max_score - min_score,
            })
        })
        .collect();
    out.sort_by(|a, b| asc_defined_first(a.cv, b.cv));
    out
}

/// Which average a game is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoomBustScope {
    /// The team's average for that season
    Season,
    /// The team's career regular-season average
    AllTime,
}

/// Ratios of a team's average that mark a boom or a bust game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoomBustThresholds {
    pub boom_ratio: f64,
    pub bust_ratio: f64,
}

impl Default for BoomBustThresholds {
    fn default() -> Self {
        Self { boom_ratio: 1.20, bust_ratio: 0.80 }
    }
}

/// Boom/bust counts for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoomBust {
    pub team_name: String,
    pub boom_games: u32,
    pub bust_games: u32,
    pub total_games: u32,
    /// Fractions of `total_games`
    pub boom_pct: Option<f64>,
    pub bust_pct: Option<f64>,
    pub volatility_score: Option<f64>,
}

/// Count boom and bust regular-season games per team, most volatile first.
///
/// Games of a team whose reference average is zero are counted in
/// `total_games` but classify as neither.
pub fn boom_bust_analysis(
    rows: &[TeamWeek],
    scope: BoomBustScope,
    thresholds: BoomBustThresholds,
) -> Vec<BoomBust> {
    let regular: Vec<&TeamWeek> = filtered(rows, GameFilter::RegularSeason).collect();

    let averages: BTreeMap<(Option<Season>, String), f64> = match scope {
        BoomBustScope::Season => rollup_by_season(regular.iter().copied())
            .into_iter()
            .filter_map(|((season, team), t)| Some(((Some(season), team), mean(&t.scores)?)))
            .collect(),
        BoomBustScope::AllTime => rollup_all_time(regular.iter().copied())
            .into_iter()
            .filter_map(|(team, t)| Some(((None, team), mean(&t.scores)?)))
            .collect(),
    };

    let mut counts: BTreeMap<String, (u32, u32, u32)> = BTreeMap::new();
    for row in &regular {
        let key = match scope {
            BoomBustScope::Season => (Some(row.season), row.team_name.clone()),
            BoomBustScope::AllTime => (None, row.team_name.clone()),
        };
        let entry = counts.entry(row.team_name.clone()).or_default();
        entry.2 += 1;
        let Some(avg) = averages.get(&key).copied().filter(|a| *a > 0.0) else {
            continue;
        };
        let pct_of_avg = row.points_for / avg;
        if pct_of_avg >= thresholds.boom_ratio {
            entry.0 += 1;
        }
        if pct_of_avg <= thresholds.bust_ratio {
            entry.1 += 1;
        }
    }

    let mut out: Vec<BoomBust> = counts
        .into_iter()
        .map(|(team_name, (boom, bust, total))| {
            let boom_pct = ratio(boom as f64, total as f64);
            let bust_pct = ratio(bust as f64, total as f64);
            BoomBust {
                team_name,
                boom_games: boom,
                bust_games: bust,
                total_games: total,
                boom_pct,
                bust_pct,
                volatility_score: boom_pct.zip(bust_pct).map(|(b, s)| b + s),
            }
        })
        .collect();
    out.sort_by(|a, b| desc_defined_first(a.volatility_score, b.volatility_score));
    out
}

/// Descriptive statistics of one team's regular-season scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringDistribution {
    pub team_name: String,
    pub count: u32,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub max: f64,
}

/// Percentile breakdown per team, optionally for a single team only
pub fn scoring_distribution(rows: &[TeamWeek], team: Option<&str>) -> Vec<ScoringDistribution> {
    let selected = filtered(rows, GameFilter::RegularSeason)
        .filter(|r| team.map_or(true, |name| r.team_name == name));

    rollup_all_time(selected)
        .into_iter()
        .filter_map(|(team_name, t)| {
            let sorted = sorted_copy(&t.scores);
            let pct = |q: f64| percentile(&sorted, q);
            Some(ScoringDistribution {
                team_name,
                count: t.games,
                mean: mean(&sorted)?,
                std_dev: sample_std_dev(&sorted),
                min: *sorted.first()?,
                p10: pct(10.0)?,
                p25: pct(25.0)?,
                p50: pct(50.0)?,
                p75: pct(75.0)?,
                p90: pct(90.0)?,
                max: *sorted.last()?,
            })
        })
        .collect()
}
