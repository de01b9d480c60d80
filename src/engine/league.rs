//! League pipeline and odds engine.
//!
//! [`analyze_league`] runs every season through normalize → seasonal →
//! bracket → awards → Elo/power, then folds careers and milestones.
//! [`OddsEngine`] prices matchups and futures on top of an analysis; it owns
//! the only shared state, a TTL memo of team profiles keyed by
//! `(season, week)`.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    cli::types::{CurrentPeriod, OwnerId, RosterId, Season, Week},
    core::{
        cache::{MemoCache, SeasonWeekKey},
        config::EngineConfig,
    },
    engine::{
        bracket::{rank_brackets, BracketRanking},
        career::{aggregate_careers, milestone_timeline, CareerMetric, MilestoneTimeline},
        markets::{generate_market, MarketInputs, MarketQuote},
        names::{TeamNameResolver, UNKNOWN_TEAM},
        normalize::{normalize_season, NormalizedSeason},
        power::{elo_timeline, power_ratings, EloTimeline, PowerRating},
        seasonal::{apply_awards, compute_season_metrics, metrics_through_week, ratio, SeasonalMetric},
        simulate::{simulate, SimTeam, SimulationInput, SimulationResult},
        status::SeasonStatus,
        win_prob::{win_probability, HeadToHead, TeamProfile},
    },
    error::{LeagueError, Result},
    sleeper::types::{LeagueHistory, SeasonRecords},
};


/// Seasons of history behind the totals baseline.
const TOTALS_HISTORY_SEASONS: u16 = 3;
/// Seasons of meetings counted as head-to-head.
const HEAD_TO_HEAD_SEASONS: u16 = 2;

/// Everything derived for one season.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonAnalysis {
    pub season: Season,
    pub status: SeasonStatus,
    pub normalized: NormalizedSeason,
    pub metrics: Vec<SeasonalMetric>,
    pub ranking: BracketRanking,
    pub elo: EloTimeline,
    pub power: BTreeMap<RosterId, PowerRating>,
}

impl SeasonAnalysis {
    pub fn metric(&self, roster: RosterId) -> Option<&SeasonalMetric> {
        self.metrics.iter().find(|m| m.roster_id == roster)
    }

    pub fn team_name(&self, roster: RosterId) -> String {
        self.metric(roster)
            .map(|m| m.team_name.clone())
            .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
    }
}

/// A whole league history, analyzed.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueAnalysis {
    /// Oldest first.
    pub seasons: Vec<SeasonAnalysis>,
    pub careers: BTreeMap<OwnerId, CareerMetric>,
    pub milestones: MilestoneTimeline,
    /// Seasons left out, with the reason.
    pub skipped: Vec<(Season, String)>,
}

impl LeagueAnalysis {
    pub fn season(&self, season: Season) -> Option<&SeasonAnalysis> {
        self.seasons.iter().find(|s| s.season == season)
    }

    pub fn latest(&self) -> Option<&SeasonAnalysis> {
        self.seasons.last()
    }

    fn require(&self, season: Season) -> Result<&SeasonAnalysis> {
        self.season(season).ok_or_else(|| LeagueError::MissingData {
            season,
            what: "analysis".to_string(),
        })
    }

    /// Every seasonal row across the history.
    pub fn all_metrics(&self) -> impl Iterator<Item = &SeasonalMetric> {
        self.seasons.iter().flat_map(|s| s.metrics.iter())
    }
}

fn analyze_season(
    records: &SeasonRecords,
    current: Option<CurrentPeriod>,
    config: &EngineConfig,
    names: &dyn TeamNameResolver,
) -> Result<SeasonAnalysis> {
    let season = records.season;
    let last_completed = current.and_then(|now| now.last_completed_week(season));
    let normalized = normalize_season(records, last_completed, config.default_playoff_week_start)?;
    let status = SeasonStatus::from_winners_bracket(&records.winners_bracket);

    let mut metrics = compute_season_metrics(&normalized, |_, owner| match owner {
        Some(owner) => names.team_name(owner, Some(season)),
        None => UNKNOWN_TEAM.to_string(),
    });

    let regular_points: BTreeMap<RosterId, f64> = metrics
        .iter()
        .map(|m| (m.roster_id, m.regular_season_points_for))
        .collect();
    let ranking = rank_brackets(
        &records.winners_bracket,
        &records.losers_bracket,
        config.bracket_fallback,
        &regular_points,
    );
    apply_awards(&mut metrics, status, &ranking.ranks, &ranking.playoff_teams);

    let elo = elo_timeline(&normalized, &config.elo);
    let power = power_ratings(&normalized, &metrics, &elo, &config.momentum);

    debug!(
        "Season {}: {} rosters, {} weeks, {:?}",
        season,
        normalized.rosters.len(),
        normalized.total_weeks,
        status
    );

    Ok(SeasonAnalysis {
        season,
        status,
        normalized,
        metrics,
        ranking,
        elo,
        power,
    })
}

/// Analyze every season of `history`.
///
/// Seasons run in parallel. A season that cannot be normalized is skipped
/// with a warning and listed in [`LeagueAnalysis::skipped`]; it never stops
/// the others.
pub fn analyze_league(
    history: &LeagueHistory,
    current: Option<CurrentPeriod>,
    config: &EngineConfig,
    names: &dyn TeamNameResolver,
) -> LeagueAnalysis {
    let results: Vec<(Season, Result<SeasonAnalysis>)> = history
        .seasons
        .par_iter()
        .map(|records| (records.season, analyze_season(records, current, config, names)))
        .collect();

    let mut seasons = Vec::new();
    let mut skipped = Vec::new();
    for (season, result) in results {
        match result {
            Ok(analysis) => seasons.push(analysis),
            Err(e) => {
                warn!("Skipping season {}: {}", season, e);
                skipped.push((season, e.to_string()));
            }
        }
    }
    seasons.sort_by_key(|s| s.season);

    let rows: Vec<SeasonalMetric> = seasons
        .iter()
        .flat_map(|s| s.metrics.iter().cloned())
        .collect();
    let careers = aggregate_careers(&rows, |owner| names.team_name(owner, None));
    let normalized: Vec<&NormalizedSeason> = seasons.iter().map(|s| &s.normalized).collect();
    let milestones = milestone_timeline(&normalized, &config.milestones);

    LeagueAnalysis {
        seasons,
        careers,
        milestones,
        skipped,
    }
}

/// A priced matchup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupQuote {
    pub season: Season,
    pub week: Week,
    pub team_a: RosterId,
    pub team_b: RosterId,
    pub name_a: String,
    pub name_b: String,
    pub quote: MarketQuote,
}

type Profiles = Arc<BTreeMap<RosterId, TeamProfile>>;

/// Prices matchups and futures from a [`LeagueAnalysis`].
pub struct OddsEngine {
    config: EngineConfig,
    profiles: MemoCache<SeasonWeekKey, Profiles>,
}

impl OddsEngine {
    pub fn new(config: EngineConfig) -> Self {
        let profiles = MemoCache::new(
            config.memo_capacity,
            Duration::from_secs(config.memo_ttl_secs),
        );
        Self { config, profiles }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop memoized profiles. Output is unaffected.
    pub fn clear_cache(&self) {
        self.profiles.clear();
    }

    pub fn cache_stats(&self) -> (usize, usize) {
        self.profiles.stats()
    }

    /// Team profiles for `season` as they stood before `week` kicked off.
    pub fn profiles(&self, analysis: &LeagueAnalysis, season: Season, week: Week) -> Result<Profiles> {
        let season_analysis = analysis.require(season)?;
        let key = SeasonWeekKey::new(season, week);
        Ok(self.profiles.get_or_insert_with(key, || {
            debug!("Computing team profiles for {} week {}", season, week);
            let last_week = week.as_u16().saturating_sub(1);
            let truncated = season_analysis.normalized.truncated(last_week);
            let metrics = metrics_through_week(&season_analysis.normalized, week.as_u16(), |_, _| {
                String::new()
            });
            let elo = elo_timeline(&truncated, &self.config.elo);
            let power = power_ratings(&truncated, &metrics, &elo, &self.config.momentum);
            let profiles = power
                .values()
                .map(|p| {
                    let metric = metrics.iter().find(|m| m.roster_id == p.roster_id);
                    (p.roster_id, TeamProfile::from_parts(p, metric))
                })
                .collect();
            Arc::new(profiles)
        }))
    }

    /// Meetings between the owners of `a` and `b` over the trailing seasons,
    /// counting only weeks before `week` of `season`.
    pub fn head_to_head(
        &self,
        analysis: &LeagueAnalysis,
        season: Season,
        week: Week,
        a: RosterId,
        b: RosterId,
    ) -> HeadToHead {
        let Some(current) = analysis.season(season) else {
            return HeadToHead::default();
        };
        let (Some(owner_a), Some(owner_b)) =
            (current.normalized.owner_of(a), current.normalized.owner_of(b))
        else {
            return HeadToHead::default();
        };

        let first = Season::new(season.as_u16().saturating_sub(HEAD_TO_HEAD_SEASONS - 1));
        let mut h2h = HeadToHead::default();
        for past in analysis
            .seasons
            .iter()
            .filter(|s| s.season >= first && s.season <= season)
        {
            let (Some(ra), Some(rb)) = (
                past.normalized.roster_of(owner_a),
                past.normalized.roster_of(owner_b),
            ) else {
                continue;
            };
            for game in past.normalized.played_games(ra) {
                if game.opponent != Some(rb) {
                    continue;
                }
                if past.season == season && game.week >= week.as_u16() {
                    continue;
                }
                h2h.games += 1;
                if game.is_win() {
                    h2h.wins_a += 1;
                } else if game.is_loss() {
                    h2h.wins_b += 1;
                }
            }
        }
        h2h
    }

    /// League average per team and game over the seasons before `season`.
    fn historical_team_average(analysis: &LeagueAnalysis, season: Season) -> Option<f64> {
        let first = Season::new(season.as_u16().saturating_sub(TOTALS_HISTORY_SEASONS));
        let (points, games) = analysis
            .seasons
            .iter()
            .filter(|s| s.season >= first && s.season < season)
            .flat_map(|s| s.metrics.iter())
            .fold((0.0, 0u32), |(p, g), m| (p + m.points_for, g + m.total_games));
        (games > 0).then(|| ratio(points, games as f64))
    }

    /// Price `a` against `b` for `week` of `season`.
    pub fn quote(
        &self,
        analysis: &LeagueAnalysis,
        season: Season,
        week: Week,
        a: RosterId,
        b: RosterId,
    ) -> Result<MatchupQuote> {
        let season_analysis = analysis.require(season)?;
        let profiles = self.profiles(analysis, season, week)?;
        let missing = |roster: RosterId| LeagueError::MissingData {
            season,
            what: format!("roster {}", roster),
        };
        let pa = profiles.get(&a).ok_or_else(|| missing(a))?;
        let pb = profiles.get(&b).ok_or_else(|| missing(b))?;

        let h2h = self.head_to_head(analysis, season, week, a, b);
        let inputs = MarketInputs {
            win_probability_a: win_probability(pa, pb, h2h),
            average_a: pa.average_score,
            average_b: pb.average_score,
            power_a: pa.power_score,
            power_b: pb.power_score,
            games_played: pa.games_played.min(pb.games_played),
            historical_team_average: Self::historical_team_average(analysis, season),
        };

        Ok(MatchupQuote {
            season,
            week,
            team_a: a,
            team_b: b,
            name_a: season_analysis.team_name(a),
            name_b: season_analysis.team_name(b),
            quote: generate_market(&inputs, &self.config.markets),
        })
    }

    /// Quotes for every pairing of `week`: the scheduled games, or the
    /// played ones when the week is already in the books.
    pub fn odds_board(
        &self,
        analysis: &LeagueAnalysis,
        season: Season,
        week: Week,
    ) -> Result<Vec<MatchupQuote>> {
        let normalized = &analysis.require(season)?.normalized;
        let w = week.as_u16();

        let mut pairs: Vec<(RosterId, RosterId)> = normalized
            .scheduled
            .iter()
            .filter(|g| g.week == w)
            .filter_map(|g| g.team2.map(|b| (g.team1, b)))
            .collect();
        if pairs.is_empty() {
            pairs = normalized
                .rosters
                .iter()
                .map(|r| normalized.record(r.roster_id, w))
                .zip(normalized.rosters.iter())
                .filter_map(|(rec, r)| rec.opponent.map(|opp| (r.roster_id, opp)))
                .filter(|(a, b)| a < b)
                .collect();
        }

        pairs
            .into_iter()
            .map(|(a, b)| self.quote(analysis, season, week, a, b))
            .collect()
    }

    /// Playoff and championship futures for `season` from its current state.
    pub fn futures(
        &self,
        analysis: &LeagueAnalysis,
        season: Season,
        trials: usize,
        seed: Option<u64>,
    ) -> Result<SimulationResult> {
        let input = self.simulation_input(analysis, season)?;
        Ok(simulate(
            &input,
            &self.config.simulation,
            trials,
            seed,
            self.config.markets.vig,
        ))
    }

    /// Standings and strength signals the simulator starts from.
    pub fn simulation_input(&self, analysis: &LeagueAnalysis, season: Season) -> Result<SimulationInput> {
        let s = analysis.require(season)?;
        let teams: Vec<SimTeam> = s
            .metrics
            .iter()
            .map(|m| {
                let power = s.power.get(&m.roster_id);
                let games = m.regular_season_wins + m.regular_season_losses + m.regular_season_ties;
                SimTeam {
                    roster_id: m.roster_id,
                    wins: m.regular_season_wins,
                    losses: m.regular_season_losses,
                    ties: m.regular_season_ties,
                    points_for: m.regular_season_points_for,
                    games_played: games,
                    power_score: power.map(|p| p.power_score).unwrap_or(50.0),
                    average_score: ratio(m.regular_season_points_for, games as f64),
                    recent_average: power.map(|p| p.recent_average).unwrap_or(0.0),
                    adjusted_dpr: (m.total_games > 0).then_some(m.adjusted_dpr),
                    momentum: power.map(|p| p.momentum).unwrap_or(0.0),
                }
            })
            .collect();

        let (points, games) = teams
            .iter()
            .fold((0.0, 0u32), |(p, g), t| (p + t.points_for, g + t.games_played));
        let max_weekly_score = s
            .normalized
            .weekly_scores_by_week
            .values()
            .flatten()
            .map(|(_, score)| *score)
            .fold(0.0, f64::max);

        Ok(SimulationInput {
            teams,
            remaining_weeks: s.normalized.remaining_regular_weeks(),
            league_average: ratio(points, games as f64),
            max_weekly_score,
        })
    }
}
