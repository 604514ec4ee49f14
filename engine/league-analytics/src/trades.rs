//! # Trade Analyzer
//!
//! Individual player moves are grouped into trade events keyed by season,
//! date and the sorted pair of participating teams. A two-team event is won
//! by the side whose received players scored more afterwards.
//!
//! Events that belong to a trade involving more than two teams (detected
//! through a shared `trade_id`) cannot be scored and are dropped.

use crate::aggregation::{desc, desc_defined_first, ratio};
use crate::types::{AddRecord, Season, TradeRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Scored two-team trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub season: Season,
    pub date: NaiveDate,
    pub trade_id: Option<String>,
    pub winner_team_id: String,
    pub loser_team_id: String,
    pub winner_points: f64,
    pub loser_points: f64,
    pub point_differential: f64,
    /// Players the winner received
    pub winner_acquired: Vec<String>,
    pub loser_acquired: Vec<String>,
}

type EventKey = (Season, NaiveDate, String, String);

fn event_key(t: &TradeRecord) -> EventKey {
    let (a, b) = if t.from_team_id <= t.to_team_id {
        (t.from_team_id.clone(), t.to_team_id.clone())
    } else {
        (t.to_team_id.clone(), t.from_team_id.clone())
    };
    (t.season, t.date, a, b)
}

/// Trade ids whose moves span more than two teams
fn multi_team_trade_ids(trades: &[TradeRecord]) -> HashSet<&str> {
    let mut teams: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for t in trades {
        if let Some(id) = t.trade_id.as_deref() {
            let set = teams.entry(id).or_default();
            set.insert(t.from_team_id.as_str());
            set.insert(t.to_team_id.as_str());
        }
    }
    teams.into_iter().filter(|(_, set)| set.len() > 2).map(|(id, _)| id).collect()
}

/// Score every two-team trade event, in (season, date, teams) order.
///
/// Needs post-trade points; returns nothing if no move carries them.
/// Equal totals give a zero differential with the second team of the sorted
/// pair as nominal winner.
pub fn analyze_trades(trades: &[TradeRecord]) -> Vec<TradeOutcome> {
    if !trades.iter().any(|t| t.points_after.is_some()) {
        return Vec::new();
    }
    let excluded = multi_team_trade_ids(trades);
    if !excluded.is_empty() {
        debug!("Skipping {} multi-team trades", excluded.len());
    }

    let mut events: BTreeMap<EventKey, Vec<&TradeRecord>> = BTreeMap::new();
    for t in trades {
        if t.trade_id.as_deref().is_some_and(|id| excluded.contains(id)) {
            continue;
        }
        events.entry(event_key(t)).or_default().push(t);
    }

    events
        .into_iter()
        .filter_map(|((season, date, team_a, team_b), moves)| {
            if team_a == team_b {
                return None;
            }
            let received = |team: &str| -> (f64, Vec<String>) {
                let to_team = moves.iter().filter(|m| m.to_team_id == team);
                let points = to_team.clone().filter_map(|m| m.points_after).sum();
                (points, to_team.map(|m| m.player_name.clone()).collect())
            };
            let (a_points, a_players) = received(&team_a);
            let (b_points, b_players) = received(&team_b);
            let trade_id = moves.iter().find_map(|m| m.trade_id.clone());

            let outcome = if a_points > b_points {
                TradeOutcome {
                    season,
                    date,
                    trade_id,
                    winner_team_id: team_a,
                    loser_team_id: team_b,
                    winner_points: a_points,
                    loser_points: b_points,
                    point_differential: a_points - b_points,
                    winner_acquired: a_players,
                    loser_acquired: b_players,
                }
            } else {
                TradeOutcome {
                    season,
                    date,
                    trade_id,
                    winner_team_id: team_b,
                    loser_team_id: team_a,
                    winner_points: b_points,
                    loser_points: a_points,
                    point_differential: b_points - a_points,
                    winner_acquired: b_players,
                    loser_acquired: a_players,
                }
            };
            Some(outcome)
        })
        .collect()
}

/// Trades with the largest point differential
pub fn most_lopsided_trades(trades: &[TradeRecord], top_n: usize) -> Vec<TradeOutcome> {
    let mut scored = analyze_trades(trades);
    scored.sort_by(|a, b| desc(a.point_differential, b.point_differential));
    scored.truncate(top_n);
    scored
}

/// Best trades from the winner's side: the most lopsided events
pub fn best_trades(trades: &[TradeRecord], top_n: usize) -> Vec<TradeOutcome> {
    most_lopsided_trades(trades, top_n)
}

/// Worst trades from the loser's side. These are the same lopsided events;
/// the renderer reads the `loser_*` fields first.
pub fn worst_trades(trades: &[TradeRecord], top_n: usize) -> Vec<TradeOutcome> {
    most_lopsided_trades(trades, top_n)
}

/// Player moves per team, regardless of points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFrequency {
    pub team_id: String,
    pub players_sent: u32,
    pub players_received: u32,
    pub total_players_traded: u32,
}

pub fn trade_frequency(trades: &[TradeRecord]) -> Vec<TradeFrequency> {
    let mut counts: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for t in trades {
        counts.entry(t.from_team_id.as_str()).or_default().0 += 1;
        counts.entry(t.to_team_id.as_str()).or_default().1 += 1;
    }
    let mut out: Vec<TradeFrequency> = counts
        .into_iter()
        .map(|(team, (sent, received))| TradeFrequency {
            team_id: team.to_string(),
            players_sent: sent,
            players_received: received,
            total_players_traded: sent + received,
        })
        .collect();
    out.sort_by(|a, b| b.total_players_traded.cmp(&a.total_players_traded));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeWinRate {
    pub team_id: String,
    pub trade_wins: u32,
    pub trade_losses: u32,
    pub total_trades: u32,
    pub trade_win_rate: Option<f64>,
}

/// Share of scored trades each team came out ahead on, best first
pub fn trade_win_rate(trades: &[TradeRecord]) -> Vec<TradeWinRate> {
    let mut counts: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for outcome in analyze_trades(trades) {
        counts.entry(outcome.winner_team_id).or_default().0 += 1;
        counts.entry(outcome.loser_team_id).or_default().1 += 1;
    }
    let mut out: Vec<TradeWinRate> = counts
        .into_iter()
        .map(|(team_id, (wins, losses))| TradeWinRate {
            team_id,
            trade_wins: wins,
            trade_losses: losses,
            total_trades: wins + losses,
            trade_win_rate: ratio(wins as f64, (wins + losses) as f64),
        })
        .collect();
    out.sort_by(|a, b| desc_defined_first(a.trade_win_rate, b.trade_win_rate));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerTradeCount {
    pub manager: String,
    pub total_trades: u32,
    pub seasons: u32,
}

/// Distinct trades each manager took part in, on either side.
///
/// Needs trade ids and manager names; moves missing either are ignored.
pub fn trade_counts_by_manager(trades: &[TradeRecord]) -> Vec<ManagerTradeCount> {
    let mut managers: BTreeMap<&str, (BTreeSet<&str>, BTreeSet<Season>)> = BTreeMap::new();
    for t in trades {
        let Some(id) = t.trade_id.as_deref() else { continue };
        for manager in [t.from_manager.as_deref(), t.to_manager.as_deref()].into_iter().flatten() {
            let entry = managers.entry(manager).or_default();
            entry.0.insert(id);
            entry.1.insert(t.season);
        }
    }
    let mut out: Vec<ManagerTradeCount> = managers
        .into_iter()
        .map(|(manager, (ids, seasons))| ManagerTradeCount {
            manager: manager.to_string(),
            total_trades: ids.len() as u32,
            seasons: seasons.len() as u32,
        })
        .collect();
    out.sort_by(|a, b| b.total_trades.cmp(&a.total_trades));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerMoves {
    pub manager: String,
    pub trades: u32,
    pub adds: u32,
    pub total_moves: u32,
}

/// Trades plus waiver/free-agent adds per manager, busiest first
pub fn total_moves_by_manager(trades: &[TradeRecord], adds: &[AddRecord]) -> Vec<ManagerMoves> {
    let mut moves: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for count in trade_counts_by_manager(trades) {
        moves.entry(count.manager).or_default().0 = count.total_trades;
    }
    for add in adds {
        if let Some(manager) = add.manager.as_deref() {
            moves.entry(manager.to_string()).or_default().1 += 1;
        }
    }
    let mut out: Vec<ManagerMoves> = moves
        .into_iter()
        .map(|(manager, (trades, adds))| ManagerMoves { manager, trades, adds, total_moves: trades + adds })
        .collect();
    out.sort_by(|a, b| b.total_moves.cmp(&a.total_moves));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 10, d).unwrap()
    }

    fn mv(id: &str, d: u32, player: &str, from: &str, to: &str, points: Option<f64>) -> TradeRecord {
        TradeRecord {
            season: 2022,
            trade_id: Some(id.to_string()),
            date: day(d),
            player_name: player.to_string(),
            from_team_id: from.to_string(),
            to_team_id: to.to_string(),
            from_manager: Some(format!("mgr-{from}")),
            to_manager: Some(format!("mgr-{to}")),
            points_after: points,
        }
    }

    #[test]
    fn test_two_team_trade_winner() {
        let trades = vec![
            mv("t1", 3, "Back A", "b", "a", Some(90.0)),
            mv("t1", 3, "Back B", "b", "a", Some(60.0)),
            mv("t1", 3, "Receiver", "a", "b", Some(100.0)),
        ];
        let outcomes = analyze_trades(&trades);
        assert_eq!(outcomes.len(), 1);
        let o = &outcomes[0];
        assert_eq!(o.winner_team_id, "a");
        assert_eq!(o.point_differential, 50.0);
        assert_eq!(o.winner_acquired, vec!["Back A", "Back B"]);
        assert_eq!(o.loser_acquired, vec!["Receiver"]);
        assert_eq!(o.trade_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_equal_trade_goes_to_second_team() {
        let trades = vec![mv("t1", 3, "X", "b", "a", Some(40.0)), mv("t1", 3, "Y", "a", "b", Some(40.0))];
        let o = &analyze_trades(&trades)[0];
        assert_eq!(o.winner_team_id, "b");
        assert_eq!(o.point_differential, 0.0);
    }

    #[test]
    fn test_multi_team_trade_is_excluded() {
        let trades = vec![
            mv("t9", 5, "X", "a", "b", Some(10.0)),
            mv("t9", 5, "Y", "b", "c", Some(20.0)),
            mv("t9", 5, "Z", "c", "a", Some(30.0)),
            mv("t2", 6, "W", "a", "b", Some(5.0)),
        ];
        let outcomes = analyze_trades(&trades);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].trade_id.as_deref(), Some("t2"));
    }

    #[test]
    fn test_missing_points_column() {
        let trades = vec![mv("t1", 3, "X", "a", "b", None)];
        assert!(analyze_trades(&trades).is_empty());
        assert!(trade_win_rate(&trades).is_empty());
        // Frequency does not need points
        assert_eq!(trade_frequency(&trades).len(), 2);
    }

    #[test]
    fn test_lopsided_and_win_rate() {
        let trades = vec![
            mv("t1", 1, "X", "a", "b", Some(100.0)),
            mv("t1", 1, "Y", "b", "a", Some(10.0)),
            mv("t2", 2, "Z", "a", "c", Some(5.0)),
            mv("t2", 2, "Q", "c", "a", Some(25.0)),
        ];
        let top = most_lopsided_trades(&trades, 1);
        assert_eq!(top[0].winner_team_id, "b");
        assert_eq!(top[0].point_differential, 90.0);
        assert_eq!(best_trades(&trades, 5).len(), 2);
        assert_eq!(worst_trades(&trades, 5)[0].loser_team_id, "a");

        let rates = trade_win_rate(&trades);
        let a = rates.iter().find(|r| r.team_id == "a").unwrap();
        assert_eq!((a.trade_wins, a.trade_losses), (1, 1));
        assert_eq!(a.trade_win_rate, Some(0.5));
        assert_eq!(rates[0].trade_win_rate, Some(1.0));
    }

    #[test]
    fn test_manager_counts_and_moves() {
        let trades = vec![
            mv("t1", 1, "X", "a", "b", None),
            mv("t1", 1, "Y", "b", "a", None),
            mv("t2", 2, "Z", "a", "c", None),
        ];
        let counts = trade_counts_by_manager(&trades);
        assert_eq!(counts[0].manager, "mgr-a");
        assert_eq!(counts[0].total_trades, 2);
        assert_eq!(counts[0].seasons, 1);

        let adds = vec![AddRecord {
            season: 2022,
            date: day(4),
            team_id: "c".to_string(),
            manager: Some("mgr-c".to_string()),
            player_id: None,
            player_name: "Pickup".to_string(),
            position: "WR".to_string(),
            source_type: "waivers".to_string(),
            is_waiver: true,
            points_after: None,
        }];
        let moves = total_moves_by_manager(&trades, &adds);
        let c = moves.iter().find(|m| m.manager == "mgr-c").unwrap();
        assert_eq!((c.trades, c.adds, c.total_moves), (1, 1, 2));
        assert_eq!(moves[0].manager, "mgr-a");
    }
}
