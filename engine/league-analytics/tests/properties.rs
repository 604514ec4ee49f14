//! Property tests for invariants that must hold on any league

mod common;

use league_analytics::consistency::scoring_variance;
use league_analytics::head_to_head::{build_h2h_matrix, h2h_percentage_matrix};
use league_analytics::luck::all_play_weekly;
use league_analytics::wins::calculate_streaks;
use league_analytics::{normalize, GameRecord};
use proptest::prelude::*;
use std::collections::BTreeMap;

const TEAMS: [&str; 5] = ["Ants", "Bees", "Crabs", "Ducks", "Eels"];

/// Games between distinct teams; scores move in 5-point steps so ties happen
fn arb_game() -> impl Strategy<Value = GameRecord> {
    (0usize..5, 1usize..5, 1u32..6, 0u32..40, 0u32..40, any::<bool>()).prop_map(
        |(home, offset, week, s1, s2, is_playoff)| {
            let mut g = common::game(
                2023,
                week,
                TEAMS[home],
                TEAMS[(home + offset) % TEAMS.len()],
                s1 as f64 * 5.0,
                s2 as f64 * 5.0,
            );
            g.is_playoff = is_playoff;
            g
        },
    )
}

/// One week of a league: every team plays exactly once
fn arb_week() -> impl Strategy<Value = Vec<GameRecord>> {
    (prop::collection::vec(0u32..30, 6), Just(["A", "B", "C", "D", "E", "F"])).prop_map(|(scores, teams)| {
        (0..3)
            .map(|i| {
                common::game(
                    2023,
                    1,
                    teams[2 * i],
                    teams[2 * i + 1],
                    scores[2 * i] as f64 * 10.0,
                    scores[2 * i + 1] as f64 * 10.0,
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_normalizer_round_trip(games in prop::collection::vec(arb_game(), 0..30)) {
        let rows = normalize(&games);
        prop_assert_eq!(rows.len(), games.len() * 2);
        for (game, pair) in games.iter().zip(rows.chunks(2)) {
            let first = &pair[0];
            let second = &pair[1];
            prop_assert_eq!(&first.team_id, &game.team1_id);
            prop_assert_eq!(first.points_for, game.score1);
            prop_assert_eq!(second.points_for, game.score2);
            prop_assert_eq!(first.points_against, second.points_for);
            if game.score1 == game.score2 {
                prop_assert!(!first.won && !second.won);
                prop_assert!(first.tied && second.tied);
            } else {
                prop_assert!(first.won ^ second.won);
            }
        }
    }

    #[test]
    fn prop_h2h_symmetry(games in prop::collection::vec(arb_game(), 1..40)) {
        let matrix = build_h2h_matrix(&games, true);
        let pct = h2h_percentage_matrix(&games, true);

        let mut decisive: BTreeMap<(String, String), u32> = BTreeMap::new();
        for g in &games {
            if g.score1 != g.score2 {
                let key = if g.team1_name < g.team2_name {
                    (g.team1_name.clone(), g.team2_name.clone())
                } else {
                    (g.team2_name.clone(), g.team1_name.clone())
                };
                *decisive.entry(key).or_default() += 1;
            }
        }

        for a in &matrix.teams {
            for b in &matrix.teams {
                if a >= b {
                    continue;
                }
                let ab = matrix.get(a, b).unwrap();
                let ba = matrix.get(b, a).unwrap();
                let expected = decisive.get(&(a.clone(), b.clone())).copied().unwrap_or(0);
                prop_assert_eq!(ab.wins + ba.wins, expected);
                prop_assert_eq!(ab.wins, ba.losses);
                prop_assert_eq!(ab.ties, ba.ties);

                if let (Some(x), Some(y)) = (pct.get(a, b), pct.get(b, a)) {
                    prop_assert!((x + y - 1.0).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn prop_all_play_balance(games in arb_week()) {
        let rows = normalize(&games);
        let weekly = all_play_weekly(&rows);
        let n = rows.len() as u32;
        let wins: u32 = weekly.iter().map(|w| w.wins).sum();
        let losses: u32 = weekly.iter().map(|w| w.losses).sum();
        let ties: u32 = weekly.iter().map(|w| w.ties).sum();

        prop_assert_eq!(wins, losses);
        prop_assert_eq!(ties % 2, 0);
        prop_assert_eq!(wins + ties / 2, n * (n - 1) / 2);
    }

    #[test]
    fn prop_streak_bounds(outcomes in prop::collection::vec(any::<bool>(), 1..30)) {
        let games: Vec<GameRecord> = outcomes
            .iter()
            .enumerate()
            .map(|(i, win)| {
                let (s1, s2) = if *win { (110.0, 90.0) } else { (90.0, 110.0) };
                common::game(2023, i as u32 + 1, "Solo", "Field", s1, s2)
            })
            .collect();
        let streaks = calculate_streaks(&normalize(&games));
        let solo = streaks.iter().find(|s| s.team_name == "Solo").unwrap();

        let mut current = 0u32;
        for win in &outcomes {
            current = if *win { current + 1 } else { 0 };
            prop_assert!(solo.max_win_streak >= current);
        }
        if outcomes.iter().all(|w| *w) {
            prop_assert_eq!(solo.max_win_streak, outcomes.len() as u32);
        }
    }

    #[test]
    fn prop_cv_non_negative(games in prop::collection::vec(arb_game(), 1..30)) {
        for row in scoring_variance(&normalize(&games)) {
            match row.cv {
                Some(cv) => {
                    prop_assert!(cv >= 0.0);
                    prop_assert!(row.avg_score > 0.0);
                }
                None => prop_assert!(row.avg_score == 0.0 || row.std_dev.is_none()),
            }
        }
    }
}
