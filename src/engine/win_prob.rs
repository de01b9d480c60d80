//! Win-probability model.
//!
//! Five antisymmetric components in `[-1, 1]` are blended with weights that
//! shift from DPR/Elo toward form and head-to-head as the season matures:
//!
//! | stage          | DPR | Elo | momentum | h2h | all-play |
//! |----------------|-----|-----|----------|-----|----------|
//! | early (<= 4)   | .55 | .25 | .10      | .05 | .05      |
//! | mid            | .50 | .20 | .15      | .10 | .05      |
//! | late (>= 10)   | .45 | .15 | .20      | .13 | .07      |
//!
//! ```text
//! p = 0.5 + 0.45 * edge * confidence + perturbation, clamped to [0.05, 0.95]
//! ```

use serde::Serialize;

use crate::{
    cli::types::RosterId,
    engine::{
        hash::{pair_perturbation, PERTURBATION_MAGNITUDE},
        power::PowerRating,
        seasonal::{ratio, SeasonalMetric},
    },
};

pub const MIN_PROBABILITY: f64 = 0.05;
pub const MAX_PROBABILITY: f64 = 0.95;

/// DPR slot weight when either side has no DPR.
const FALLBACK_DPR_WEIGHT: f64 = 0.40;

/// The inputs the model needs for one roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub roster_id: RosterId,
    pub games_played: u32,
    pub adjusted_dpr: Option<f64>,
    pub elo: f64,
    pub momentum: f64,
    pub power_score: f64,
    pub all_play_win_percentage: f64,
    pub average_score: f64,
    pub win_percentage: f64,
    pub recent_average: f64,
}

impl TeamProfile {
    /// Build from a power rating and, when available, the seasonal row.
    pub fn from_parts(power: &PowerRating, metric: Option<&SeasonalMetric>) -> Self {
        let played = metric.filter(|m| m.total_games > 0);
        TeamProfile {
            roster_id: power.roster_id,
            games_played: power.games_played,
            adjusted_dpr: played.map(|m| m.adjusted_dpr),
            elo: power.elo,
            momentum: power.momentum,
            power_score: power.power_score,
            all_play_win_percentage: played.map(|m| m.all_play_win_percentage).unwrap_or(0.5),
            average_score: power.average_score,
            win_percentage: power.win_percentage,
            recent_average: power.recent_average,
        }
    }
}

/// Results of prior meetings, from team A's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub wins_a: u32,
    pub wins_b: u32,
    pub games: u32,
}

impl HeadToHead {
    pub fn swapped(self) -> Self {
        HeadToHead {
            wins_a: self.wins_b,
            wins_b: self.wins_a,
            games: self.games,
        }
    }

    fn edge(&self) -> f64 {
        ratio(self.wins_a as f64 - self.wins_b as f64, self.games as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeasonStage {
    Early,
    Mid,
    Late,
}

impl SeasonStage {
    pub fn from_games(games: u32) -> Self {
        match games {
            0..=4 => SeasonStage::Early,
            10.. => SeasonStage::Late,
            _ => SeasonStage::Mid,
        }
    }

    /// `[dpr, elo, momentum, h2h, all_play]`
    fn weights(&self) -> [f64; 5] {
        match self {
            SeasonStage::Early => [0.55, 0.25, 0.10, 0.05, 0.05],
            SeasonStage::Mid => [0.50, 0.20, 0.15, 0.10, 0.05],
            SeasonStage::Late => [0.45, 0.15, 0.20, 0.13, 0.07],
        }
    }
}

/// Shrinks the edge on small samples: 0.6 at <= 3 games up to 1.0 at 10+.
pub fn confidence(games: u32) -> f64 {
    match games {
        0..=3 => 0.6,
        10.. => 1.0,
        g => 0.6 + 0.4 * (g - 3) as f64 / 7.0,
    }
}

/// The blended edge of `a` over `b`, in `[-1, 1]`.
pub fn matchup_edge(a: &TeamProfile, b: &TeamProfile, h2h: HeadToHead) -> f64 {
    let games = a.games_played.min(b.games_played);
    let [mut w_dpr, w_elo, w_mom, w_h2h, w_all] = SeasonStage::from_games(games).weights();
    let mut rest_scale = 1.0;

    let elo = ((a.elo - b.elo) / 200.0).tanh();
    let dpr = match (a.adjusted_dpr, b.adjusted_dpr) {
        (Some(da), Some(db)) => ((da - db) * 2.0).tanh(),
        _ => {
            rest_scale = (1.0 - FALLBACK_DPR_WEIGHT) / (1.0 - w_dpr);
            w_dpr = FALLBACK_DPR_WEIGHT;
            let power = ((a.power_score - b.power_score) / 25.0).tanh();
            0.5 * elo + 0.5 * power
        }
    };
    let momentum = (a.momentum - b.momentum) / 2.0;
    let all_play = a.all_play_win_percentage - b.all_play_win_percentage;

    let edge = w_dpr * dpr
        + rest_scale
            * (w_elo * elo + w_mom * momentum + w_h2h * h2h.edge() + w_all * all_play);
    edge.clamp(-1.0, 1.0)
}

/// Probability that `a` beats `b`.
///
/// `P(a, b) + P(b, a) == 1` for any inputs, provided `h2h` is swapped with
/// the sides.
pub fn win_probability(a: &TeamProfile, b: &TeamProfile, h2h: HeadToHead) -> f64 {
    let games = a.games_played.min(b.games_played);
    let edge = matchup_edge(a, b, h2h);
    let perturbation = pair_perturbation(a.roster_id, b.roster_id, PERTURBATION_MAGNITUDE);
    let p = 0.5 + 0.45 * edge * confidence(games) + perturbation;
    if p.is_finite() {
        p.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
    } else {
        0.5
    }
}
