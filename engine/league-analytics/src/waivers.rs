//! # Waiver Analyzer
//!
//! Waiver claims and free-agent pickups. Activity counts only need the add
//! records; value tables also need post-acquisition points, and pickups
//! that scored nothing are treated as noise.

use crate::aggregation::{desc, mean, ratio};
use crate::types::{AddRecord, Season};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn has_points(adds: &[AddRecord]) -> bool {
    adds.iter().any(|a| a.points_after.is_some())
}

/// A single productive pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverPickup {
    pub season: Season,
    pub date: NaiveDate,
    pub team_id: String,
    pub player_name: String,
    pub position: String,
    pub source_type: String,
    pub points_after: f64,
}

fn scored_pickups(adds: &[AddRecord], waiver_only: bool) -> Vec<WaiverPickup> {
    adds.iter()
        .filter(|a| !waiver_only || a.is_waiver)
        .filter_map(|a| {
            let points_after = a.points_after.filter(|p| *p > 0.0)?;
            Some(WaiverPickup {
                season: a.season,
                date: a.date,
                team_id: a.team_id.clone(),
                player_name: a.player_name.clone(),
                position: a.position.clone(),
                source_type: a.source_type.clone(),
                points_after,
            })
        })
        .collect()
}

/// Highest-scoring pickups, optionally waiver claims only
pub fn best_waiver_pickups(adds: &[AddRecord], top_n: usize, waiver_only: bool) -> Vec<WaiverPickup> {
    let mut pickups = scored_pickups(adds, waiver_only);
    pickups.sort_by(|a, b| desc(a.points_after, b.points_after));
    pickups.truncate(top_n);
    pickups
}

/// Pickup activity of one team across all seasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverSummary {
    pub team_id: String,
    pub total_adds: u32,
    pub waiver_claims: u32,
    pub free_agent_adds: u32,
    /// Present only when point attribution data was supplied
    pub total_points_from_adds: Option<f64>,
    pub avg_points_per_add: Option<f64>,
}

/// Per-team pickup counts, busiest first
pub fn waiver_pickup_summary(adds: &[AddRecord]) -> Vec<WaiverSummary> {
    let with_points = has_points(adds);
    let mut teams: BTreeMap<&str, (u32, u32, f64)> = BTreeMap::new();
    for a in adds {
        let entry = teams.entry(a.team_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += u32::from(a.is_waiver);
        entry.2 += a.points_after.unwrap_or(0.0);
    }
    let mut out: Vec<WaiverSummary> = teams
        .into_iter()
        .map(|(team, (total, waivers, points))| {
            let total_points = with_points.then_some(points);
            WaiverSummary {
                team_id: team.to_string(),
                total_adds: total,
                waiver_claims: waivers,
                free_agent_adds: total - waivers,
                total_points_from_adds: total_points,
                avg_points_per_add: total_points.and_then(|p| ratio(p, total as f64)),
            }
        })
        .collect();
    out.sort_by(|a, b| b.total_adds.cmp(&a.total_adds));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverSeasonActivity {
    pub season: Season,
    pub team_id: String,
    pub total_adds: u32,
    pub waiver_claims: u32,
    pub points_from_adds: Option<f64>,
}

/// Pickups per team-season, newest season first then busiest
pub fn waiver_activity_by_season(adds: &[AddRecord]) -> Vec<WaiverSeasonActivity> {
    let with_points = has_points(adds);
    let mut groups: BTreeMap<(Season, &str), (u32, u32, f64)> = BTreeMap::new();
    for a in adds {
        let entry = groups.entry((a.season, a.team_id.as_str())).or_default();
        entry.0 += 1;
        entry.1 += u32::from(a.is_waiver);
        entry.2 += a.points_after.unwrap_or(0.0);
    }
    let mut out: Vec<WaiverSeasonActivity> = groups
        .into_iter()
        .map(|((season, team), (total, waivers, points))| WaiverSeasonActivity {
            season,
            team_id: team.to_string(),
            total_adds: total,
            waiver_claims: waivers,
            points_from_adds: with_points.then_some(points),
        })
        .collect();
    out.sort_by(|a, b| b.season.cmp(&a.season).then(b.total_adds.cmp(&a.total_adds)));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPickupSuccess {
    pub position: String,
    pub pickup_count: u32,
    pub total_points: f64,
    pub avg_points: Option<f64>,
    pub max_points: Option<f64>,
}

/// Pickup production by position, highest total first
pub fn position_pickup_success(adds: &[AddRecord]) -> Vec<PositionPickupSuccess> {
    if !has_points(adds) {
        return Vec::new();
    }
    let mut positions: BTreeMap<&str, (u32, Vec<f64>)> = BTreeMap::new();
    for a in adds {
        let entry = positions.entry(a.position.as_str()).or_default();
        entry.0 += 1;
        entry.1.extend(a.points_after);
    }
    let mut out: Vec<PositionPickupSuccess> = positions
        .into_iter()
        .map(|(position, (count, points))| PositionPickupSuccess {
            position: position.to_string(),
            pickup_count: count,
            total_points: points.iter().sum(),
            avg_points: mean(&points),
            max_points: points.iter().copied().reduce(f64::max),
        })
        .collect();
    out.sort_by(|a, b| desc(a.total_points, b.total_points));
    out
}

/// The single best pickup of every season, oldest first. Equal scores keep
/// the earlier record.
pub fn waiver_mvps_by_season(adds: &[AddRecord]) -> Vec<WaiverPickup> {
    let mut best: BTreeMap<Season, WaiverPickup> = BTreeMap::new();
    for pickup in scored_pickups(adds, false) {
        match best.get(&pickup.season) {
            Some(current) if current.points_after >= pickup.points_after => {}
            _ => {
                best.insert(pickup.season, pickup);
            }
        }
    }
    best.into_values().collect()
}

pub fn most_active_waiver_teams(adds: &[AddRecord], top_n: usize) -> Vec<WaiverSummary> {
    let mut summary = waiver_pickup_summary(adds);
    summary.truncate(top_n);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(season: Season, team: &str, player: &str, position: &str, waiver: bool, points: Option<f64>) -> AddRecord {
        AddRecord {
            season,
            date: NaiveDate::from_ymd_opt(season, 10, 1).unwrap(),
            team_id: team.to_string(),
            manager: None,
            player_id: None,
            player_name: player.to_string(),
            position: position.to_string(),
            source_type: if waiver { "waivers" } else { "freeagents" }.to_string(),
            is_waiver: waiver,
            points_after: points,
        }
    }

    fn adds() -> Vec<AddRecord> {
        vec![
            add(2022, "a", "Breakout Back", "RB", true, Some(140.0)),
            add(2022, "a", "Streamer", "DEF", false, Some(0.0)),
            add(2022, "b", "Handcuff", "RB", false, Some(60.0)),
            add(2023, "b", "Late Receiver", "WR", true, Some(95.0)),
            add(2023, "b", "Kicker", "K", false, None),
        ]
    }

    #[test]
    fn test_best_pickups_skip_zero_points() {
        let best = best_waiver_pickups(&adds(), 10, false);
        assert_eq!(best.len(), 3);
        assert_eq!(best[0].player_name, "Breakout Back");

        let claims = best_waiver_pickups(&adds(), 10, true);
        assert_eq!(claims.iter().map(|p| p.player_name.as_str()).collect::<Vec<_>>(), vec!["Breakout Back", "Late Receiver"]);
    }

    #[test]
    fn test_summary_and_activity() {
        let summary = waiver_pickup_summary(&adds());
        assert_eq!(summary[0].team_id, "b");
        assert_eq!(summary[0].total_adds, 3);
        assert_eq!(summary[0].waiver_claims, 1);
        assert_eq!(summary[0].free_agent_adds, 2);
        assert_eq!(summary[0].total_points_from_adds, Some(155.0));

        let activity = waiver_activity_by_season(&adds());
        assert_eq!(activity[0].season, 2023);
        assert_eq!(activity[0].total_adds, 2);
        assert_eq!(activity.len(), 3);

        assert_eq!(most_active_waiver_teams(&adds(), 1).len(), 1);
    }

    #[test]
    fn test_counts_without_points() {
        let bare: Vec<AddRecord> = adds()
            .into_iter()
            .map(|mut a| {
                a.points_after = None;
                a
            })
            .collect();
        let summary = waiver_pickup_summary(&bare);
        assert_eq!(summary.len(), 2);
        assert!(summary.iter().all(|s| s.total_points_from_adds.is_none()));
        assert!(position_pickup_success(&bare).is_empty());
        assert!(best_waiver_pickups(&bare, 5, false).is_empty());
    }

    #[test]
    fn test_position_success_and_mvps() {
        let positions = position_pickup_success(&adds());
        assert_eq!(positions[0].position, "RB");
        assert_eq!(positions[0].pickup_count, 2);
        assert_eq!(positions[0].total_points, 200.0);
        assert_eq!(positions[0].max_points, Some(140.0));

        let mvps = waiver_mvps_by_season(&adds());
        assert_eq!(mvps.len(), 2);
        assert_eq!(mvps[0].player_name, "Breakout Back");
        assert_eq!(mvps[1].player_name, "Late Receiver");
    }
}
