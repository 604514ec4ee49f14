//! # Report Assembly
//!
//! Runs every analyzer over one dataset and bundles the resulting tables
//! into named sections. Game records are normalized once and shared by all
//! analyzers; independent groups run in parallel on the rayon pool.
//!
//! A section whose input table is empty stays empty, which the renderer
//! treats as "omit this section".

use crate::config::AnalyticsConfig;
use crate::consistency::{self, AllTimeConsistency, BoomBust, BoomBustScope, ScoringDistribution, ScoringVariance};
use crate::dataset::LeagueDataset;
use crate::drafts::{self, DraftGrade, DraftValue, FirstRoundPick, PositionValue, RoundPerformance, TeamDraftHistory};
use crate::games::{self, CombinedScore, GameResult, MarginBucket};
use crate::head_to_head::{self, PercentageMatrix, RecordMatrix, RivalryRecord};
use crate::luck::{
    self, AllPlayRecord, AllTimeAllPlay, LuckIndex, LuckyWin, PointsAgainstLeader, PointsAgainstSummary,
    UnluckyLoss, WeeklyMedian,
};
use crate::normalize::normalize;
use crate::playoffs::{
    self, BracketRecord, ChampionshipCount, PlacementCount, PlayoffAppearance, Podium, RegularVsPlayoff,
};
use crate::scoring::{self, AllTimeScoring, PointsSummary, SeasonScoring, WeeklyScore, YearlyTotal};
use crate::trades::{self, ManagerMoves, ManagerTradeCount, TradeFrequency, TradeOutcome, TradeWinRate};
use crate::types::{DraftPick, GameRecord, StandingsRecord, TeamWeek};
use crate::waivers::{self, PositionPickupSuccess, WaiverPickup, WaiverSeasonActivity, WaiverSummary};
use crate::wins::{self, AllTimeRecord, SeasonRecord, StreakRecord, WorstTeam};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringSection {
    pub weekly_high_scores: Vec<WeeklyScore>,
    pub weekly_low_scores: Vec<WeeklyScore>,
    pub season_leaders: Vec<SeasonScoring>,
    pub season_high_scorers: Vec<SeasonScoring>,
    pub alltime_leaders: Vec<AllTimeScoring>,
    pub points_for_vs_against: Vec<PointsSummary>,
    pub yearly_totals: Vec<YearlyTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencySection {
    pub variance: Vec<ScoringVariance>,
    pub rankings: Vec<ScoringVariance>,
    pub most_consistent: Vec<ScoringVariance>,
    pub most_volatile: Vec<ScoringVariance>,
    pub alltime: Vec<AllTimeConsistency>,
    pub boom_bust: Vec<BoomBust>,
    pub distribution: Vec<ScoringDistribution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordsSection {
    pub season_leaders: Vec<SeasonRecord>,
    pub alltime_leaders: Vec<AllTimeRecord>,
    pub best_by_season: Vec<SeasonRecord>,
    pub worst_by_season: Vec<WorstTeam>,
    pub win_streaks: Vec<StreakRecord>,
    pub loss_streaks: Vec<StreakRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadSection {
    pub record_matrix: RecordMatrix,
    pub percentage_matrix: PercentageMatrix,
    pub rivalries: Vec<RivalryRecord>,
    pub most_played: Vec<RivalryRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesSection {
    pub blowouts: Vec<GameResult>,
    pub closest: Vec<GameResult>,
    pub highest_combined: Vec<CombinedScore>,
    pub lowest_combined: Vec<CombinedScore>,
    pub margin_distribution: Vec<MarginBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LuckSection {
    pub weekly_medians: Vec<WeeklyMedian>,
    pub unlucky_losses: Vec<UnluckyLoss>,
    pub lucky_wins: Vec<LuckyWin>,
    pub all_play: Vec<AllPlayRecord>,
    pub alltime_all_play: Vec<AllTimeAllPlay>,
    pub luck_index: Vec<LuckIndex>,
    pub luckiest: Vec<LuckIndex>,
    pub unluckiest: Vec<LuckIndex>,
    pub points_against: Vec<PointsAgainstSummary>,
    pub points_against_leaders: Vec<PointsAgainstLeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayoffSection {
    pub appearances: Vec<PlayoffAppearance>,
    pub championships: Vec<ChampionshipCount>,
    pub placements: Vec<PlacementCount>,
    pub podiums: Vec<Podium>,
    pub records: Vec<BracketRecord>,
    pub championship_bracket: Vec<BracketRecord>,
    pub consolation_bracket: Vec<BracketRecord>,
    pub regular_vs_playoff: Vec<RegularVsPlayoff>,
    pub underdog_champions: Vec<RegularVsPlayoff>,
    pub failed_favorites: Vec<RegularVsPlayoff>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftSection {
    pub steals: Vec<DraftValue>,
    pub busts: Vec<DraftValue>,
    pub grades: Vec<DraftGrade>,
    pub best: Vec<DraftGrade>,
    pub worst: Vec<DraftGrade>,
    pub rounds: Vec<RoundPerformance>,
    pub positions: Vec<PositionValue>,
    pub first_round: Vec<FirstRoundPick>,
    pub team_history: Vec<TeamDraftHistory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSection {
    pub lopsided_trades: Vec<TradeOutcome>,
    pub best_trades: Vec<TradeOutcome>,
    pub worst_trades: Vec<TradeOutcome>,
    pub trade_frequency: Vec<TradeFrequency>,
    pub trade_win_rate: Vec<TradeWinRate>,
    pub trade_counts: Vec<ManagerTradeCount>,
    pub total_moves: Vec<ManagerMoves>,
    pub best_pickups: Vec<WaiverPickup>,
    pub best_waiver_claims: Vec<WaiverPickup>,
    pub pickup_summary: Vec<WaiverSummary>,
    pub most_active: Vec<WaiverSummary>,
    pub activity_by_season: Vec<WaiverSeasonActivity>,
    pub position_success: Vec<PositionPickupSuccess>,
    pub pickup_mvps: Vec<WaiverPickup>,
}

/// Every table of one league report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueReport {
    pub league_name: Option<String>,
    pub seasons: Vec<i32>,
    pub scoring: ScoringSection,
    pub consistency: ConsistencySection,
    pub records: RecordsSection,
    pub head_to_head: HeadToHeadSection,
    pub games: GamesSection,
    pub luck: LuckSection,
    pub playoffs: PlayoffSection,
    pub drafts: DraftSection,
    pub transactions: TransactionSection,
}

/// Inputs shared by every section builder
struct ReportInput<'a> {
    games: &'a [GameRecord],
    rows: &'a [TeamWeek],
    standings: &'a [StandingsRecord],
    drafts: &'a [DraftPick],
    dataset: &'a LeagueDataset,
    config: &'a AnalyticsConfig,
}

impl LeagueReport {
    /// Build the full report; never fails, empty inputs give empty sections
    pub fn build(dataset: &LeagueDataset, config: &AnalyticsConfig) -> Self {
        info!(
            games = dataset.games.len(),
            standings = dataset.standings.len(),
            trades = dataset.trades.len(),
            adds = dataset.adds.len(),
            drafts = dataset.drafts.len(),
            "Building league report"
        );

        let rows = normalize(&dataset.games);
        let standings = prepare_standings(dataset, config.thresholds.championship_bracket_cutoff);
        let drafts = drafts::apply_slot_baseline(&dataset.drafts);
        let input = ReportInput {
            games: &dataset.games,
            rows: &rows,
            standings: &standings,
            drafts: &drafts,
            dataset,
            config,
        };

        let ((scoring, consistency), (records, head_to_head)) = rayon::join(
            || rayon::join(|| scoring_section(&input), || consistency_section(&input)),
            || rayon::join(|| records_section(&input), || head_to_head_section(&input)),
        );
        let ((games, luck), (playoffs, (drafts, transactions))) = rayon::join(
            || rayon::join(|| games_section(&input), || luck_section(&input)),
            || {
                rayon::join(
                    || playoff_section(&input),
                    || rayon::join(|| draft_section(&input), || transaction_section(&input)),
                )
            },
        );

        let report = Self {
            league_name: dataset.league_name.clone(),
            seasons: dataset.seasons(),
            scoring,
            consistency,
            records,
            head_to_head,
            games,
            luck,
            playoffs,
            drafts,
            transactions,
        };
        info!("League report built for {} seasons", report.seasons.len());
        report
    }
}

/// Standings as supplied, or computed from games when the platform gave
/// none, with title flags filled in from championship games
fn prepare_standings(dataset: &LeagueDataset, playoff_spots: u32) -> Vec<StandingsRecord> {
    let base = if dataset.standings.is_empty() && !dataset.games.is_empty() {
        debug!("No standings supplied, deriving them from regular-season games");
        dataset
            .seasons()
            .into_iter()
            .flat_map(|season| playoffs::standings_from_games(&dataset.games, season, playoff_spots))
            .collect()
    } else {
        dataset.standings.clone()
    };
    if dataset.games.iter().any(|g| g.is_championship) {
        playoffs::mark_championships(&base, &dataset.games)
    } else {
        base
    }
}

fn skipped(section: &str, input: &str) {
    info!("Skipping {} section: no {} supplied", section, input);
}

fn scoring_section(input: &ReportInput) -> ScoringSection {
    if input.rows.is_empty() {
        skipped("scoring", "games");
        return ScoringSection::default();
    }
    let top_n = input.config.report.top_n;
    let extremes = input.config.report.include_playoffs_in_extremes;
    ScoringSection {
        weekly_high_scores: scoring::weekly_high_scores(input.rows, top_n, extremes),
        weekly_low_scores: scoring::weekly_low_scores(input.rows, top_n, extremes),
        season_leaders: scoring::season_scoring_leaders(input.rows, false),
        season_high_scorers: scoring::season_high_scorers(input.rows),
        alltime_leaders: scoring::alltime_scoring_leaders(input.rows),
        points_for_vs_against: scoring::points_for_vs_against(input.rows),
        yearly_totals: scoring::yearly_scoring_totals(input.rows),
    }
}

fn consistency_section(input: &ReportInput) -> ConsistencySection {
    if input.rows.is_empty() {
        skipped("consistency", "games");
        return ConsistencySection::default();
    }
    let top_n = input.config.report.top_n;
    ConsistencySection {
        variance: consistency::scoring_variance(input.rows),
        rankings: consistency::consistency_rankings(input.rows),
        most_consistent: consistency::most_consistent(input.rows, top_n),
        most_volatile: consistency::most_volatile(input.rows, top_n),
        alltime: consistency::alltime_consistency(input.rows),
        boom_bust: consistency::boom_bust_analysis(
            input.rows,
            BoomBustScope::Season,
            input.config.thresholds.boom_bust(),
        ),
        distribution: consistency::scoring_distribution(input.rows, None),
    }
}

fn records_section(input: &ReportInput) -> RecordsSection {
    if input.rows.is_empty() {
        skipped("records", "games");
        return RecordsSection::default();
    }
    let streak_top_n = input.config.report.streak_top_n;
    RecordsSection {
        season_leaders: wins::season_win_leaders(input.rows),
        alltime_leaders: wins::alltime_win_leaders(input.rows),
        best_by_season: wins::best_teams_by_season(input.rows),
        worst_by_season: wins::worst_teams_by_season(input.rows),
        win_streaks: wins::longest_win_streaks(input.rows, streak_top_n),
        loss_streaks: wins::longest_loss_streaks(input.rows, streak_top_n),
    }
}

fn head_to_head_section(input: &ReportInput) -> HeadToHeadSection {
    if input.games.is_empty() {
        skipped("head-to-head", "games");
        return HeadToHeadSection::default();
    }
    HeadToHeadSection {
        record_matrix: head_to_head::build_h2h_matrix(input.games, true),
        percentage_matrix: head_to_head::h2h_percentage_matrix(input.games, true),
        rivalries: head_to_head::h2h_detailed(input.games),
        most_played: head_to_head::most_played_rivalries(input.games, input.config.report.rivalry_top_n),
    }
}

fn games_section(input: &ReportInput) -> GamesSection {
    if input.games.is_empty() {
        skipped("games", "games");
        return GamesSection::default();
    }
    let top_n = input.config.report.top_n;
    let extremes = input.config.report.include_playoffs_in_extremes;
    GamesSection {
        blowouts: games::biggest_blowouts(input.games, top_n, extremes),
        closest: games::closest_games(input.games, top_n, extremes),
        highest_combined: games::highest_combined_scores(input.games, top_n),
        lowest_combined: games::lowest_combined_scores(input.games, top_n),
        margin_distribution: games::margin_distribution(input.games),
    }
}

fn luck_section(input: &ReportInput) -> LuckSection {
    if input.rows.is_empty() {
        skipped("luck", "games");
        return LuckSection::default();
    }
    let top_n = input.config.report.top_n;
    LuckSection {
        weekly_medians: luck::weekly_medians(input.rows),
        unlucky_losses: luck::unlucky_losses(input.rows, top_n),
        lucky_wins: luck::lucky_wins(input.rows, top_n),
        all_play: luck::all_play_records(input.rows),
        alltime_all_play: luck::alltime_all_play(input.rows),
        luck_index: luck::luck_index(input.rows),
        luckiest: luck::luckiest_teams(input.rows, top_n),
        unluckiest: luck::unluckiest_teams(input.rows, top_n),
        points_against: luck::points_against_analysis(input.rows),
        points_against_leaders: luck::points_against_leaders_by_year(input.rows),
    }
}

fn playoff_section(input: &ReportInput) -> PlayoffSection {
    if input.standings.is_empty() && input.rows.is_empty() {
        skipped("playoffs", "standings or games");
        return PlayoffSection::default();
    }
    let thresholds = &input.config.thresholds;
    PlayoffSection {
        appearances: playoffs::playoff_appearances(input.standings),
        championships: playoffs::championship_counts(input.standings),
        placements: playoffs::placement_counts(input.standings),
        podiums: playoffs::podium_by_year(input.standings),
        records: playoffs::playoff_records(input.rows),
        championship_bracket: playoffs::championship_bracket_records(
            input.rows,
            input.standings,
            thresholds.championship_bracket_cutoff,
        ),
        consolation_bracket: playoffs::consolation_bracket_records(
            input.rows,
            input.standings,
            thresholds.championship_bracket_cutoff,
        ),
        regular_vs_playoff: playoffs::regular_vs_playoff(input.rows, input.standings),
        underdog_champions: playoffs::underdog_champions(input.rows, input.standings, thresholds.underdog_min_seed),
        failed_favorites: playoffs::failed_favorites(input.rows, input.standings),
    }
}

fn draft_section(input: &ReportInput) -> DraftSection {
    if input.drafts.is_empty() {
        skipped("draft", "draft picks");
        return DraftSection::default();
    }
    let top_n = input.config.report.top_n;
    DraftSection {
        steals: drafts::draft_steals(input.drafts, top_n),
        busts: drafts::draft_busts(input.drafts, top_n, input.config.thresholds.early_round_cutoff),
        grades: drafts::draft_grades(input.drafts),
        best: drafts::best_drafts(input.drafts, top_n),
        worst: drafts::worst_drafts(input.drafts, top_n),
        rounds: drafts::round_performance(input.drafts),
        positions: drafts::position_draft_value(input.drafts),
        first_round: drafts::first_round_performance(input.drafts),
        team_history: drafts::team_draft_history(input.drafts),
    }
}

fn transaction_section(input: &ReportInput) -> TransactionSection {
    let trades = &input.dataset.trades;
    let adds = &input.dataset.adds;
    if trades.is_empty() && adds.is_empty() {
        skipped("transactions", "trades or adds");
        return TransactionSection::default();
    }
    let top_n = input.config.report.top_n;
    TransactionSection {
        lopsided_trades: trades::most_lopsided_trades(trades, top_n),
        best_trades: trades::best_trades(trades, top_n),
        worst_trades: trades::worst_trades(trades, top_n),
        trade_frequency: trades::trade_frequency(trades),
        trade_win_rate: trades::trade_win_rate(trades),
        trade_counts: trades::trade_counts_by_manager(trades),
        total_moves: trades::total_moves_by_manager(trades, adds),
        best_pickups: waivers::best_waiver_pickups(adds, top_n, false),
        best_waiver_claims: waivers::best_waiver_pickups(adds, top_n, true),
        pickup_summary: waivers::waiver_pickup_summary(adds),
        most_active: waivers::most_active_waiver_teams(adds, top_n),
        activity_by_season: waivers::waiver_activity_by_season(adds),
        position_success: waivers::position_pickup_success(adds),
        pickup_mvps: waivers::waiver_mvps_by_season(adds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(season: i32, week: u32, a: &str, b: &str, score1: f64, score2: f64) -> GameRecord {
        GameRecord {
            season,
            week,
            team1_id: a.to_lowercase(),
            team1_name: a.to_string(),
            team2_id: b.to_lowercase(),
            team2_name: b.to_string(),
            score1,
            score2,
            is_playoff: false,
            is_championship: false,
        }
    }

    #[test]
    fn test_empty_dataset_gives_empty_report() {
        let report = LeagueReport::build(&LeagueDataset::default(), &AnalyticsConfig::default());
        assert_eq!(report, LeagueReport::default());
    }

    #[test]
    fn test_derives_standings_and_champion() {
        let mut final_game = game(2023, 3, "Alpha", "Bravo", 130.0, 110.0);
        final_game.is_playoff = true;
        final_game.is_championship = true;
        let dataset = LeagueDataset {
            games: vec![
                game(2023, 1, "Alpha", "Bravo", 100.0, 90.0),
                game(2023, 2, "Alpha", "Bravo", 80.0, 95.0),
                final_game,
            ],
            ..Default::default()
        };
        let standings = prepare_standings(&dataset, 6);
        assert_eq!(standings.len(), 2);
        let alpha = standings.iter().find(|s| s.team_name == "Alpha").unwrap();
        assert!(alpha.won_championship);
        assert!(alpha.finals_appearance);

        let report = LeagueReport::build(&dataset, &AnalyticsConfig::default());
        assert_eq!(report.seasons, vec![2023]);
        assert_eq!(report.playoffs.championships.len(), 2);
        assert!(report.drafts.steals.is_empty());
        assert!(report.transactions.best_trades.is_empty());
    }
}
