//! # Playoff Analyzer
//!
//! Postseason history from standings and playoff games: appearances,
//! titles, podiums, bracket records, and how regular-season seeding held up.

use crate::aggregation::{competition_ranks, ratio, rollup_all_time, rollup_by_season, RankOrder};
use crate::normalize::{filtered, GameFilter};
use crate::types::{GameRecord, Season, StandingsRecord, TeamWeek};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Playoff sub-tournament a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    Championship,
    Consolation,
}

/// How far a team went, in priority order: the first that applies wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffFinish {
    Champion,
    Finals,
    MadePlayoffs,
    Missed,
}

impl PlayoffFinish {
    /// Finish recorded in a standings line; no line means the team missed
    pub fn from_standing(standing: Option<&StandingsRecord>) -> Self {
        match standing {
            Some(s) if s.won_championship => PlayoffFinish::Champion,
            Some(s) if s.finals_appearance => PlayoffFinish::Finals,
            Some(s) if s.made_playoffs => PlayoffFinish::MadePlayoffs,
            _ => PlayoffFinish::Missed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffAppearance {
    pub team_name: String,
    pub playoff_appearances: u32,
    pub seasons_played: u32,
    pub appearance_pct: Option<f64>,
}

/// Playoff appearances per team, most first
pub fn playoff_appearances(standings: &[StandingsRecord]) -> Vec<PlayoffAppearance> {
    let mut counts: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for s in standings {
        let entry = counts.entry(s.team_name.as_str()).or_default();
        entry.0 += u32::from(s.made_playoffs);
        entry.1 += 1;
    }
    let mut out: Vec<PlayoffAppearance> = counts
        .into_iter()
        .map(|(team, (made, seasons))| PlayoffAppearance {
            team_name: team.to_string(),
            playoff_appearances: made,
            seasons_played: seasons,
            appearance_pct: ratio(made as f64, seasons as f64),
        })
        .collect();
    out.sort_by(|a, b| b.playoff_appearances.cmp(&a.playoff_appearances));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionshipCount {
    pub team_name: String,
    pub championships: u32,
    pub finals_appearances: u32,
    pub seasons: u32,
    /// Titles per finals appearance; undefined without a finals appearance
    pub conversion_rate: Option<f64>,
}

/// Titles and finals trips per team, most titles first
pub fn championship_counts(standings: &[StandingsRecord]) -> Vec<ChampionshipCount> {
    let mut counts: BTreeMap<&str, (u32, u32, u32)> = BTreeMap::new();
    for s in standings {
        let entry = counts.entry(s.team_name.as_str()).or_default();
        entry.0 += u32::from(s.won_championship);
        entry.1 += u32::from(s.finals_appearance);
        entry.2 += 1;
    }
    let mut out: Vec<ChampionshipCount> = counts
        .into_iter()
        .map(|(team, (titles, finals, seasons))| ChampionshipCount {
            team_name: team.to_string(),
            championships: titles,
            finals_appearances: finals,
            seasons,
            conversion_rate: ratio(titles as f64, finals as f64),
        })
        .collect();
    out.sort_by(|a, b| {
        b.championships.cmp(&a.championships).then(b.finals_appearances.cmp(&a.finals_appearances))
    });
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementCount {
    pub team_name: String,
    pub first: u32,
    pub second: u32,
    pub third: u32,
    pub total_podium: u32,
    pub seasons: u32,
}

/// Top-three final placements per team, sorted by firsts, seconds, thirds
pub fn placement_counts(standings: &[StandingsRecord]) -> Vec<PlacementCount> {
    let mut counts: BTreeMap<&str, PlacementCount> = BTreeMap::new();
    for s in standings {
        let entry = counts.entry(s.team_name.as_str()).or_insert_with(|| PlacementCount {
            team_name: s.team_name.clone(),
            first: 0,
            second: 0,
            third: 0,
            total_podium: 0,
            seasons: 0,
        });
        match s.rank {
            1 => entry.first += 1,
            2 => entry.second += 1,
            3 => entry.third += 1,
            _ => {}
        }
        entry.seasons += 1;
    }
    let mut out: Vec<PlacementCount> = counts
        .into_values()
        .map(|mut p| {
            p.total_podium = p.first + p.second + p.third;
            p
        })
        .collect();
    out.sort_by(|a, b| {
        (b.first, b.second, b.third, b.total_podium).cmp(&(a.first, a.second, a.third, a.total_podium))
    });
    out
}

/// Final top three of one season; a missing placement is `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podium {
    pub season: Season,
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
}

/// One podium per season, newest first
pub fn podium_by_year(standings: &[StandingsRecord]) -> Vec<Podium> {
    let mut podiums: BTreeMap<Season, Podium> = BTreeMap::new();
    for s in standings {
        let podium = podiums
            .entry(s.season)
            .or_insert_with(|| Podium { season: s.season, first: None, second: None, third: None });
        let slot = match s.rank {
            1 => &mut podium.first,
            2 => &mut podium.second,
            3 => &mut podium.third,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(s.team_name.clone());
        }
    }
    podiums.into_values().rev().collect()
}

/// Win/loss record over a set of playoff games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketRecord {
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub games: u32,
    pub win_pct: Option<f64>,
}

fn bracket_table<'a>(rows: impl IntoIterator<Item = &'a TeamWeek>) -> Vec<BracketRecord> {
    let mut out: Vec<BracketRecord> = rollup_all_time(rows)
        .into_iter()
        .map(|(team_name, t)| BracketRecord {
            team_name,
            wins: t.wins,
            losses: t.losses,
            ties: t.ties,
            games: t.games,
            win_pct: t.win_pct(),
        })
        .collect();
    out.sort_by(|a, b| b.wins.cmp(&a.wins));
    out
}

/// All playoff games per team, most wins first
pub fn playoff_records(rows: &[TeamWeek]) -> Vec<BracketRecord> {
    bracket_table(filtered(rows, GameFilter::Playoffs))
}

/// A playoff perspective row tagged with its bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketGame<'a> {
    pub bracket: Bracket,
    pub game: &'a TeamWeek,
}

/// Split playoff games by the team's regular-season seed: rank within
/// `cutoff` plays for the title, everyone else is in the consolation bracket.
///
/// Returns nothing when no standings are available.
pub fn classify_playoff_games<'a>(
    rows: &'a [TeamWeek],
    standings: &[StandingsRecord],
    cutoff: u32,
) -> Vec<BracketGame<'a>> {
    if standings.is_empty() {
        return Vec::new();
    }
    let contenders: HashSet<(Season, &str)> = standings
        .iter()
        .filter(|s| s.rank <= cutoff)
        .map(|s| (s.season, s.team_name.as_str()))
        .collect();

    filtered(rows, GameFilter::Playoffs)
        .map(|game| {
            let bracket = if contenders.contains(&(game.season, game.team_name.as_str())) {
                Bracket::Championship
            } else {
                Bracket::Consolation
            };
            BracketGame { bracket, game }
        })
        .collect()
}

pub fn championship_bracket_records(
    rows: &[TeamWeek],
    standings: &[StandingsRecord],
    cutoff: u32,
) -> Vec<BracketRecord> {
    let games = classify_playoff_games(rows, standings, cutoff);
    bracket_table(games.iter().filter(|g| g.bracket == Bracket::Championship).map(|g| g.game))
}

pub fn consolation_bracket_records(
    rows: &[TeamWeek],
    standings: &[StandingsRecord],
    cutoff: u32,
) -> Vec<BracketRecord> {
    let games = classify_playoff_games(rows, standings, cutoff);
    bracket_table(games.iter().filter(|g| g.bracket == Bracket::Consolation).map(|g| g.game))
}

/// Regular-season seed next to the eventual playoff finish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularVsPlayoff {
    pub season: Season,
    pub team_name: String,
    pub wins: u32,
    pub points_for: f64,
    /// Rank by regular-season wins, shared on ties
    pub reg_season_rank: u32,
    pub playoff_finish: PlayoffFinish,
}

/// One row per team-season that played regular-season games, sorted by
/// season then seed. Returns nothing without both games and standings.
pub fn regular_vs_playoff(rows: &[TeamWeek], standings: &[StandingsRecord]) -> Vec<RegularVsPlayoff> {
    if rows.is_empty() || standings.is_empty() {
        return Vec::new();
    }
    let lookup: HashMap<(Season, &str), &StandingsRecord> =
        standings.iter().map(|s| ((s.season, s.team_name.as_str()), s)).collect();

    let mut by_season: BTreeMap<Season, Vec<(String, u32, f64)>> = BTreeMap::new();
    for ((season, team), t) in rollup_by_season(filtered(rows, GameFilter::RegularSeason)) {
        by_season.entry(season).or_default().push((team, t.wins, t.points_for));
    }

    let mut out = Vec::new();
    for (season, teams) in by_season {
        let wins: Vec<f64> = teams.iter().map(|t| t.1 as f64).collect();
        let ranks = competition_ranks(&wins, RankOrder::Descending);
        for ((team_name, wins, points_for), rank) in teams.into_iter().zip(ranks) {
            let standing = lookup.get(&(season, team_name.as_str())).copied();
            out.push(RegularVsPlayoff {
                season,
                playoff_finish: PlayoffFinish::from_standing(standing),
                team_name,
                wins,
                points_for,
                reg_season_rank: rank,
            });
        }
    }
    out.sort_by_key(|r| (r.season, r.reg_season_rank));
    out
}

/// Champions whose regular-season seed was `min_seed` or worse
pub fn underdog_champions(
    rows: &[TeamWeek],
    standings: &[StandingsRecord],
    min_seed: u32,
) -> Vec<RegularVsPlayoff> {
    regular_vs_playoff(rows, standings)
        .into_iter()
        .filter(|r| r.playoff_finish == PlayoffFinish::Champion && r.reg_season_rank >= min_seed)
        .collect()
}

/// Top seeds that did not win the title
pub fn failed_favorites(rows: &[TeamWeek], standings: &[StandingsRecord]) -> Vec<RegularVsPlayoff> {
    regular_vs_playoff(rows, standings)
        .into_iter()
        .filter(|r| r.reg_season_rank == 1 && r.playoff_finish != PlayoffFinish::Champion)
        .collect()
}

/// Which flagged game decided a season's title
enum TitleGame<'a> {
    Decided(&'a GameRecord),
    /// Candidates that could not be told apart
    Ambiguous(Vec<&'a GameRecord>),
}

/// Picks the final among a season's flagged games: the meeting of the best
/// seeds (lowest rank sum), then the latest week.
fn select_title_game<'a>(candidates: &[&'a GameRecord], seeds: &HashMap<&str, u32>) -> TitleGame<'a> {
    let seed_sum = |g: &GameRecord| -> Option<u32> {
        Some(seeds.get(g.team1_name.as_str())? + seeds.get(g.team2_name.as_str())?)
    };

    let mut pool: Vec<&GameRecord> = candidates.to_vec();
    let sums: Option<Vec<u32>> = pool.iter().map(|g| seed_sum(*g)).collect();
    if let Some(best) = sums.as_ref().and_then(|s| s.iter().min().copied()) {
        pool.retain(|g| seed_sum(*g) == Some(best));
    }
    if let Some(last) = pool.iter().map(|g| g.week).max() {
        pool.retain(|g| g.week == last);
    }
    if pool.len() == 1 {
        TitleGame::Decided(pool[0])
    } else {
        TitleGame::Ambiguous(pool)
    }
}

fn mark_finalists(marked: &mut [StandingsRecord], game: &GameRecord) {
    for s in marked.iter_mut().filter(|s| s.season == game.season) {
        if s.team_name == game.team1_name || s.team_name == game.team2_name {
            s.finals_appearance = true;
        }
    }
}

/// Copy of `standings` with title flags derived from championship games.
///
/// At most one flagged game per season is treated as the final: the winner
/// is marked champion and both finalists get a finals appearance. Tied
/// finals mark finalists only, as do seasons where several flagged games
/// cannot be told apart. Seasons that already carry a champion are left
/// untouched.
pub fn mark_championships(standings: &[StandingsRecord], games: &[GameRecord]) -> Vec<StandingsRecord> {
    let mut marked = standings.to_vec();
    let mut flagged: BTreeMap<Season, Vec<&GameRecord>> = BTreeMap::new();
    for game in games.iter().filter(|g| g.is_championship) {
        flagged.entry(game.season).or_default().push(game);
    }

    for (season, candidates) in flagged {
        if standings.iter().any(|s| s.season == season && s.won_championship) {
            debug!("Season {} champion supplied, ignoring championship games", season);
            continue;
        }
        let seeds: HashMap<&str, u32> = standings
            .iter()
            .filter(|s| s.season == season)
            .map(|s| (s.team_name.as_str(), s.rank))
            .collect();

        match select_title_game(&candidates, &seeds) {
            TitleGame::Decided(game) => {
                mark_finalists(&mut marked, game);
                if game.is_tie() {
                    warn!("Season {} title game ended in a tie, no champion marked", season);
                    continue;
                }
                let (winner, _) = game.winner_loser();
                for s in marked.iter_mut().filter(|s| s.season == season && s.team_name == winner.team_name) {
                    s.won_championship = true;
                }
                debug!("Championship {} decided: {}", season, winner.team_name);
            }
            TitleGame::Ambiguous(tied) => {
                warn!(
                    "Season {} has {} indistinguishable championship games, marking finalists only",
                    season,
                    tied.len()
                );
                for game in tied {
                    mark_finalists(&mut marked, game);
                }
            }
        }
    }
    marked
}

/// Standings for one season computed from its regular-season games, for
/// platforms that report no standings.
///
/// Teams are ranked by wins, then points-for, with unique ranks; equal
/// records keep team id order. The top `playoff_spots` are marked as
/// playoff teams.
pub fn standings_from_games(games: &[GameRecord], season: Season, playoff_spots: u32) -> Vec<StandingsRecord> {
    let mut teams: BTreeMap<&str, StandingsRecord> = BTreeMap::new();
    for game in games.iter().filter(|g| g.season == season) {
        for (us, them) in [game.sides(), (game.sides().1, game.sides().0)] {
            let entry = teams.entry(us.team_id).or_insert_with(|| StandingsRecord {
                season,
                team_id: us.team_id.to_string(),
                team_name: us.team_name.to_string(),
                manager: None,
                rank: 0,
                wins: 0,
                losses: 0,
                ties: 0,
                points_for: 0.0,
                points_against: 0.0,
                made_playoffs: false,
                won_championship: false,
                finals_appearance: false,
            });
            if game.is_playoff {
                continue;
            }
            entry.points_for += us.score;
            entry.points_against += them.score;
            if us.score > them.score {
                entry.wins += 1;
            } else if us.score < them.score {
                entry.losses += 1;
            } else {
                entry.ties += 1;
            }
        }
    }

    let mut table: Vec<StandingsRecord> = teams.into_values().collect();
    table.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.points_for.total_cmp(&a.points_for)));
    for (idx, s) in table.iter_mut().enumerate() {
        s.rank = idx as u32 + 1;
        s.made_playoffs = s.rank <= playoff_spots;
    }
    table
}
