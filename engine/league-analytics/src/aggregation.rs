//! # Aggregation Primitives
//!
//! Grouping, ranking and descriptive-statistics helpers shared by every
//! analyzer. Ratios never panic or produce NaN: a zero denominator yields
//! `None` and the caller still emits the row.

use crate::types::{Outcome, Season, TeamWeek};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

/// `num / den`, undefined when the denominator is zero
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    ratio(values.iter().sum(), values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); undefined below two values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let var = values
        .iter()
        .map(|v| {
            let d = v - avg;
            d * d
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Coefficient of variation. Only defined for a positive mean.
pub fn coefficient_of_variation(std_dev: Option<f64>, mean: f64) -> Option<f64> {
    let std_dev = std_dev?;
    if mean > 0.0 {
        Some(std_dev / mean)
    } else {
        None
    }
}

/// Middle value, averaging the two central values for even-length input
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted_copy(values);
    percentile(&sorted, 50.0)
}

/// Linearly interpolated percentile of already-sorted data (`pct` in 0..=100)
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let index = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        Some(sorted[lower])
    } else {
        let weight = index - lower as f64;
        Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
    }
}

pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Descending comparison for `sort_by`
pub fn desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Ascending comparison that pushes undefined values to the end
pub fn asc_defined_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending comparison that pushes undefined values to the end
pub fn desc_defined_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable "n largest": sort descending by `key`, keep the first `n`
pub fn top_n_by<T>(mut rows: Vec<T>, n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    rows.sort_by(|a, b| desc(key(a), key(b)));
    rows.truncate(n);
    rows
}

/// Stable "n smallest": sort ascending by `key`, keep the first `n`
pub fn bottom_n_by<T>(mut rows: Vec<T>, n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    rows.sort_by(|a, b| key(a).total_cmp(&key(b)));
    rows.truncate(n);
    rows
}

/// Sort direction for ranking: `Descending` gives rank 1 to the largest key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Ascending,
    Descending,
}

/// Competition ("min") ranks of `keys`: equal keys share the lowest rank and
/// the next distinct key skips accordingly (1, 2, 2, 4).
pub fn competition_ranks(keys: &[f64], order: RankOrder) -> Vec<u32> {
    keys.iter()
        .map(|k| {
            let better = keys
                .iter()
                .filter(|other| match order {
                    RankOrder::Descending => **other > *k,
                    RankOrder::Ascending => **other < *k,
                })
                .count();
            better as u32 + 1
        })
        .collect()
}

/// Competition ranks computed independently inside each group.
///
/// Rows whose key is undefined get no rank and do not displace others.
pub fn rank_within_groups<T, G, F, K>(
    rows: &[T],
    group_of: F,
    key_of: K,
    order: RankOrder,
) -> Vec<Option<u32>>
where
    G: Eq + Hash,
    F: Fn(&T) -> G,
    K: Fn(&T) -> Option<f64>,
{
    let mut keys_by_group: HashMap<G, Vec<f64>> = HashMap::new();
    for row in rows {
        if let Some(k) = key_of(row) {
            keys_by_group.entry(group_of(row)).or_default().push(k);
        }
    }

    rows.iter()
        .map(|row| {
            let k = key_of(row)?;
            let peers = keys_by_group.get(&group_of(row))?;
            let better = peers
                .iter()
                .filter(|other| match order {
                    RankOrder::Descending => **other > k,
                    RankOrder::Ascending => **other < k,
                })
                .count();
            Some(better as u32 + 1)
        })
        .collect()
}

/// Running totals for one team (optionally within one season)
#[derive(Debug, Clone, Default)]
pub struct TeamTotals {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    /// Individual points-for values in input order
    pub scores: Vec<f64>,
    pub seasons: BTreeSet<Season>,
}

impl TeamTotals {
    pub fn record(&mut self, row: &TeamWeek) {
        self.games += 1;
        match row.outcome() {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        self.points_for += row.points_for;
        self.points_against += row.points_against;
        self.scores.push(row.points_for);
        self.seasons.insert(row.season);
    }

    pub fn win_pct(&self) -> Option<f64> {
        ratio(self.wins as f64, self.games as f64)
    }

    /// Points-for per game
    pub fn ppg(&self) -> Option<f64> {
        ratio(self.points_for, self.games as f64)
    }

    /// Points-against per game
    pub fn pa_per_game(&self) -> Option<f64> {
        ratio(self.points_against, self.games as f64)
    }

    pub fn season_count(&self) -> u32 {
        self.seasons.len() as u32
    }
}

/// Totals keyed by `(season, team_name)`, in ascending key order
pub fn rollup_by_season<'a>(
    rows: impl IntoIterator<Item = &'a TeamWeek>,
) -> BTreeMap<(Season, String), TeamTotals> {
    let mut totals: BTreeMap<(Season, String), TeamTotals> = BTreeMap::new();
    for row in rows {
        totals.entry((row.season, row.team_name.clone())).or_default().record(row);
    }
    totals
}

/// Totals keyed by team name across every season, in ascending name order
pub fn rollup_all_time<'a>(
    rows: impl IntoIterator<Item = &'a TeamWeek>,
) -> BTreeMap<String, TeamTotals> {
    let mut totals: BTreeMap<String, TeamTotals> = BTreeMap::new();
    for row in rows {
        totals.entry(row.team_name.clone()).or_default().record(row);
    }
    totals
}
