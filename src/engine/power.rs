//! Power rating and Elo model.
//!
//! Elo is season-scoped: every roster starts the season at the configured
//! initial rating. The power score is a weighted 0-100 composite that acts
//! as a strength signal independent of DPR.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    cli::types::RosterId,
    core::config::{EloConfig, MomentumConfig},
    engine::{
        normalize::{NormalizedSeason, WeeklyRecord},
        seasonal::{degenerate, ratio, SeasonalMetric},
    },
};

/// Games used for the "recent form" component.
pub const RECENT_FORM_GAMES: usize = 4;

const STREAK_CAP: f64 = 0.4;
const TREND_CAP: f64 = 0.15;

/// `(week, rating after that week)` per roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EloTimeline {
    pub initial_rating: f64,
    pub ratings: BTreeMap<RosterId, Vec<(u16, f64)>>,
}

impl EloTimeline {
    /// Latest rating, or the initial rating before any game.
    pub fn current(&self, roster: RosterId) -> f64 {
        self.ratings
            .get(&roster)
            .and_then(|points| points.last())
            .map(|(_, rating)| *rating)
            .unwrap_or(self.initial_rating)
    }
}

/// Logistic expectation of `rating` against `opponent`.
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Replay a season's completed games in week order.
///
/// Both sides of a game update from their pre-game ratings.
pub fn elo_timeline(season: &NormalizedSeason, config: &EloConfig) -> EloTimeline {
    let mut current: BTreeMap<RosterId, f64> = season
        .rosters
        .iter()
        .map(|r| (r.roster_id, config.initial_rating))
        .collect();
    let mut ratings: BTreeMap<RosterId, Vec<(u16, f64)>> = BTreeMap::new();

    for week in 1..=season.total_weeks {
        let pre = current.clone();
        for roster in season.rosters.iter().map(|r| r.roster_id) {
            let record = season.record(roster, week);
            let Some(opponent) = record.opponent.filter(|_| record.has_opponent) else {
                continue;
            };
            let own = pre.get(&roster).copied().unwrap_or(config.initial_rating);
            let opp = pre.get(&opponent).copied().unwrap_or(config.initial_rating);
            let updated = own + config.k_factor * (record.win_value() - expected_score(own, opp));
            current.insert(roster, updated);
            ratings.entry(roster).or_default().push((week, updated));
        }
    }

    EloTimeline {
        initial_rating: config.initial_rating,
        ratings,
    }
}

fn win_pct(played: &[WeeklyRecord]) -> f64 {
    ratio(played.iter().map(|g| g.win_value()).sum(), played.len() as f64)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    ratio(sum, n as f64)
}

/// Recency-weighted form over the last `window` games, in [-1, 1].
///
/// `games` must be the roster's played games in week order.
pub fn momentum(games: &[WeeklyRecord], config: &MomentumConfig) -> f64 {
    let window = config.window.max(1);
    let recent: Vec<&WeeklyRecord> = games.iter().rev().take(window).collect();
    if recent.is_empty() {
        return 0.0;
    }

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (back, game) in recent.iter().enumerate() {
        let diff = game.points_for - game.opponent_points_for;
        let mut term = (diff / 30.0).tanh();
        if diff.abs() > 30.0 {
            term *= 1.2;
        } else if diff.abs() < 10.0 {
            term *= 0.8;
        }
        let weight = config.decay.powi(back as i32);
        weighted += weight * term;
        total_weight += weight;
    }
    let base = ratio(weighted, total_weight);

    let mut streak_term = 0.0;
    let first_result = recent[0].win_value();
    let streak = recent
        .iter()
        .take_while(|g| g.win_value() == first_result && !g.is_tie())
        .count();
    if streak >= 3 {
        let size = (0.1 * (streak as f64 - 1.0)).min(0.3);
        streak_term += if first_result > 0.5 { size } else { -size };
    }
    let own_average = mean(games.iter().map(|g| g.points_for));
    let last_three = mean(recent.iter().take(3).map(|g| g.points_for));
    if own_average > 0.0 {
        let heat = last_three / own_average - 1.0;
        if heat > 0.1 {
            streak_term += 0.1;
        } else if heat < -0.1 {
            streak_term -= 0.1;
        }
    }
    let streak_term = streak_term.clamp(-STREAK_CAP, STREAK_CAP);

    // recent is newest first; the older half comes second.
    let half = recent.len() / 2;
    let trend = if half > 0 {
        let newer = mean(recent[..half].iter().map(|g| g.points_for - g.opponent_points_for));
        let older = mean(recent[half..].iter().map(|g| g.points_for - g.opponent_points_for));
        (((newer - older) / 40.0).tanh() * TREND_CAP).clamp(-TREND_CAP, TREND_CAP)
    } else {
        0.0
    };

    (base + streak_term + trend).clamp(-1.0, 1.0)
}

/// Everything the strength models know about one roster at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerRating {
    pub roster_id: RosterId,
    pub games_played: u32,
    pub win_percentage: f64,
    pub average_score: f64,
    pub recent_average: f64,
    pub point_differential_per_game: f64,
    pub momentum: f64,
    pub elo: f64,
    pub luck_rating: f64,
    pub strength_of_schedule: f64,
    pub power_score: f64,
}

/// Weights of the power-score components; they sum to 1.
const POWER_WEIGHTS: [f64; 8] = [0.25, 0.20, 0.15, 0.15, 0.10, 0.10, 0.03, 0.02];

fn scaled(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn power_score(r: &PowerRating, league_average: f64, initial_elo: f64) -> f64 {
    let components = [
        scaled(r.win_percentage * 100.0),
        scaled(ratio(r.average_score, league_average) * 50.0),
        scaled(ratio(r.recent_average, league_average) * 50.0),
        scaled(50.0 + r.point_differential_per_game),
        scaled((r.momentum + 1.0) * 50.0),
        scaled(50.0 + (r.elo - initial_elo) / 4.0),
        scaled(50.0 + r.luck_rating * 5.0),
        scaled(r.strength_of_schedule * 100.0),
    ];
    components
        .iter()
        .zip(POWER_WEIGHTS)
        .map(|(c, w)| c * w)
        .sum::<f64>()
        .max(0.0)
}

/// Power ratings for every roster of a season.
///
/// `metrics` supplies luck; everything else comes from the played games.
pub fn power_ratings(
    season: &NormalizedSeason,
    metrics: &[SeasonalMetric],
    elo: &EloTimeline,
    config: &MomentumConfig,
) -> BTreeMap<RosterId, PowerRating> {
    let games: BTreeMap<RosterId, Vec<WeeklyRecord>> = season
        .rosters
        .iter()
        .map(|r| (r.roster_id, season.played_games(r.roster_id)))
        .collect();

    let league_average = mean(games.values().flatten().map(|g| g.points_for));
    if league_average == 0.0 && games.values().any(|g| !g.is_empty()) {
        degenerate(format!("league average score of season {}", season.season));
    }

    let mut ratings: BTreeMap<RosterId, PowerRating> = BTreeMap::new();
    for (roster, played) in &games {
        let n = played.len() as f64;
        let opponents: Vec<f64> = played
            .iter()
            .filter_map(|g| g.opponent)
            .map(|opp| games.get(&opp).map(|og| win_pct(og)).unwrap_or(0.0))
            .collect();
        let luck_rating = metrics
            .iter()
            .find(|m| m.roster_id == *roster)
            .map(|m| m.luck_rating)
            .unwrap_or(0.0);

        let mut rating = PowerRating {
            roster_id: *roster,
            games_played: played.len() as u32,
            win_percentage: win_pct(played),
            average_score: mean(played.iter().map(|g| g.points_for)),
            recent_average: mean(played.iter().rev().take(RECENT_FORM_GAMES).map(|g| g.points_for)),
            point_differential_per_game: ratio(
                played.iter().map(|g| g.points_for - g.opponent_points_for).sum(),
                n,
            ),
            momentum: momentum(played, config),
            elo: elo.current(*roster),
            luck_rating,
            strength_of_schedule: mean(opponents.into_iter()),
            power_score: 0.0,
        };
        rating.power_score = power_score(&rating, league_average, elo.initial_rating);
        ratings.insert(*roster, rating);
    }
    ratings
}
