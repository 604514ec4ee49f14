#![allow(dead_code)]

use chrono::NaiveDate;
use league_analytics::{GameRecord, TeamWeek, TradeRecord};

pub fn game(season: i32, week: u32, team1: &str, team2: &str, score1: f64, score2: f64) -> GameRecord {
    GameRecord {
        season,
        week,
        team1_id: team1.to_lowercase(),
        team1_name: team1.to_string(),
        team2_id: team2.to_lowercase(),
        team2_name: team2.to_string(),
        score1,
        score2,
        is_playoff: false,
        is_championship: false,
    }
}

pub fn playoff(mut game: GameRecord, championship: bool) -> GameRecord {
    game.is_playoff = true;
    game.is_championship = championship;
    game
}

/// A perspective row for a team whose opponent is irrelevant to the test
pub fn team_week(season: i32, week: u32, team: &str, points_for: f64, points_against: f64) -> TeamWeek {
    TeamWeek {
        season,
        week,
        team_id: team.to_lowercase(),
        team_name: team.to_string(),
        opponent_id: "bye".to_string(),
        opponent_name: "Bye".to_string(),
        points_for,
        points_against,
        won: points_for > points_against,
        tied: points_for == points_against,
        is_playoff: false,
        is_championship: false,
    }
}

pub fn traded(from: &str, to: &str, player: &str, points_after: f64) -> TradeRecord {
    TradeRecord {
        season: 2023,
        trade_id: Some("t-100".to_string()),
        date: NaiveDate::from_ymd_opt(2023, 10, 12).unwrap(),
        player_name: player.to_string(),
        from_team_id: from.to_string(),
        to_team_id: to.to_string(),
        from_manager: None,
        to_manager: None,
        points_after: Some(points_after),
    }
}
