//! Monte Carlo playoff and championship simulator.
//!
//! Each trial replays the remaining regular-season weeks from a private copy
//! of the standings, then applies hybrid seeding: the top `division_seeds`
//! by record qualify outright and the best `wildcard_seeds` of the rest by
//! points fill the field. Championship odds are derived from playoff odds
//! rather than simulated bracket games.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{
    cli::types::RosterId,
    core::config::SimulationConfig,
    engine::{markets::american_odds, seasonal::ratio},
};


/// Trials handed to one rayon task.
pub const TRIALS_PER_CHUNK: usize = 250;

/// Title chance of an average qualifier in a six-team field.
const BASE_TITLE_SHARE: f64 = 1.0 / 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrialPreset {
    Preview,
    Standard,
    Precision,
}

impl TrialPreset {
    pub fn trials(&self, config: &SimulationConfig) -> usize {
        let n = match self {
            TrialPreset::Preview => config.preview_trials,
            TrialPreset::Standard => config.standard_trials,
            TrialPreset::Precision => config.precision_trials,
        };
        n.min(config.max_trials)
    }
}

/// Current standing and strength signals for one roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimTeam {
    pub roster_id: RosterId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub games_played: u32,
    /// 0-100 power score.
    pub power_score: f64,
    pub average_score: f64,
    pub recent_average: f64,
    pub adjusted_dpr: Option<f64>,
    pub momentum: f64,
}

impl SimTeam {
    pub fn win_rate(&self) -> f64 {
        ratio(
            self.wins as f64 + 0.5 * self.ties as f64,
            self.games_played as f64,
        )
    }

    /// Strength in `[0, 1]`, regressed toward 0.5 on small samples.
    pub fn strength(&self) -> f64 {
        let sample = match self.games_played {
            0..=2 => 0.25,
            g => (0.25 + (g - 2) as f64 * 0.1).min(1.0),
        };
        let signal = 0.6 * (self.power_score / 100.0).clamp(0.0, 1.0) + 0.4 * self.win_rate();
        0.5 * (1.0 - sample) + signal * sample
    }
}

/// League state the simulator starts from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationInput {
    pub teams: Vec<SimTeam>,
    pub remaining_weeks: u16,
    /// Mean score per team and game.
    pub league_average: f64,
    /// Highest single-week score so far; bounds anyone's best case.
    pub max_weekly_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamFutures {
    pub roster_id: RosterId,
    pub playoff_probability: f64,
    pub championship_probability: f64,
    pub eliminated: bool,
    /// `None` once eliminated.
    pub playoff_odds: Option<i32>,
    pub championship_odds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub trials: usize,
    pub remaining_weeks: u16,
    pub teams: Vec<TeamFutures>,
}

impl SimulationResult {
    pub fn team(&self, roster: RosterId) -> Option<&TeamFutures> {
        self.teams.iter().find(|t| t.roster_id == roster)
    }
}

#[derive(Clone)]
struct Standing {
    wins: f64,
    games: f64,
    points: f64,
    strength: f64,
}

/// Indices of the playoff field, division seeds first.
pub fn seed_playoffs(
    win_pct: &[f64],
    wins: &[f64],
    points: &[f64],
    config: &SimulationConfig,
) -> Vec<usize> {
    let mut by_record: Vec<usize> = (0..win_pct.len()).collect();
    by_record.sort_by(|&a, &b| {
        win_pct[b]
            .total_cmp(&win_pct[a])
            .then(wins[b].total_cmp(&wins[a]))
            .then(points[b].total_cmp(&points[a]))
            .then(a.cmp(&b))
    });
    let mut field: Vec<usize> = by_record.iter().copied().take(config.division_seeds).collect();

    let mut rest: Vec<usize> = by_record
        .into_iter()
        .skip(config.division_seeds)
        .collect();
    rest.sort_by(|&a, &b| points[b].total_cmp(&points[a]).then(a.cmp(&b)));
    field.extend(rest.into_iter().take(config.wildcard_seeds));
    field
}

fn score_for(team: &SimTeam, league_average: f64) -> f64 {
    if team.average_score > 0.0 {
        team.average_score
    } else {
        league_average
    }
}

/// Run `trials` trials on `rng`; returns playoff appearances per team index.
pub fn run_trials_with<R: Rng>(
    input: &SimulationInput,
    config: &SimulationConfig,
    trials: usize,
    rng: &mut R,
) -> Vec<u32> {
    let n = input.teams.len();
    let mut appearances = vec![0u32; n];
    let variance = config.weekly_variance.abs();
    let start: Vec<Standing> = input
        .teams
        .iter()
        .map(|t| Standing {
            wins: t.wins as f64 + 0.5 * t.ties as f64,
            games: (t.wins + t.losses + t.ties) as f64,
            points: t.points_for,
            strength: t.strength(),
        })
        .collect();
    let mut order: Vec<usize> = (0..n).collect();

    for _ in 0..trials {
        let mut table = start.clone();

        for _ in 0..input.remaining_weeks {
            order.shuffle(rng);
            let mut pairs = order.chunks_exact(2);
            for pair in pairs.by_ref() {
                let (a, b) = (pair[0], pair[1]);
                let swing_a = 1.0 + rng.random_range(-variance..=variance);
                let swing_b = 1.0 + rng.random_range(-variance..=variance);
                let perf_a = table[a].strength * swing_a;
                let perf_b = table[b].strength * swing_b;

                table[a].points += score_for(&input.teams[a], input.league_average) * swing_a;
                table[b].points += score_for(&input.teams[b], input.league_average) * swing_b;
                table[a].games += 1.0;
                table[b].games += 1.0;

                let (winner, loser) = if perf_a >= perf_b { (a, b) } else { (b, a) };
                table[winner].wins += 1.0;
                table[winner].strength = (table[winner].strength + config.strength_drift).min(1.0);
                table[loser].strength = (table[loser].strength - config.strength_drift).max(0.0);
            }
            if let [bye] = pairs.remainder() {
                table[*bye].games += 1.0;
                table[*bye].points += input.league_average;
                if rng.random_bool(0.5) {
                    table[*bye].wins += 1.0;
                }
            }
        }

        let win_pct: Vec<f64> = table.iter().map(|s| ratio(s.wins, s.games)).collect();
        let wins: Vec<f64> = table.iter().map(|s| s.wins).collect();
        let points: Vec<f64> = table.iter().map(|s| s.points).collect();
        for idx in seed_playoffs(&win_pct, &wins, &points, config) {
            appearances[idx] += 1;
        }
    }

    appearances
}

/// Whether `index` can no longer qualify by record nor by points.
pub fn is_eliminated(input: &SimulationInput, index: usize, config: &SimulationConfig) -> bool {
    let Some(team) = input.teams.get(index) else {
        return false;
    };
    let remaining = input.remaining_weeks as f64;
    let games = |t: &SimTeam| (t.wins + t.losses + t.ties) as f64;

    let best_win_pct = ratio(
        team.wins as f64 + 0.5 * team.ties as f64 + remaining,
        games(team) + remaining,
    );
    let best_points = team.points_for + remaining * input.max_weekly_score.max(0.0);

    let others = input
        .teams
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, t)| t);

    let locked_ahead_on_record = others
        .clone()
        .filter(|t| {
            let worst = ratio(t.wins as f64 + 0.5 * t.ties as f64, games(t) + remaining);
            worst > best_win_pct
        })
        .count();
    let locked_ahead_on_points = others.filter(|t| t.points_for > best_points).count();

    locked_ahead_on_record >= config.division_seeds
        && locked_ahead_on_points >= config.division_seeds + config.wildcard_seeds
}

/// Relative title strength; 1.0 for a league-average team.
fn title_multiplier(team: &SimTeam, league_average: f64) -> f64 {
    let relative_average = if league_average > 0.0 {
        team.average_score / league_average
    } else {
        1.0
    };
    let relative_recent = if league_average > 0.0 && team.recent_average > 0.0 {
        team.recent_average / league_average
    } else {
        relative_average
    };
    let dpr = team.adjusted_dpr.unwrap_or(relative_average);
    (0.4 * relative_average + 0.3 * dpr + 0.15 * (1.0 + team.momentum) + 0.15 * relative_recent)
        .max(0.0)
}

fn chunk_seed(base: u64, chunk: usize) -> u64 {
    base ^ (chunk as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Simulate the rest of the regular season.
///
/// `trials` is capped by `config.max_trials`. With `seed` set the result is
/// reproducible; otherwise the chunk seeds are drawn from entropy. `vig`
/// shades the quoted futures odds.
pub fn simulate(
    input: &SimulationInput,
    config: &SimulationConfig,
    trials: usize,
    seed: Option<u64>,
    vig: f64,
) -> SimulationResult {
    let trials = trials.min(config.max_trials);
    let n = input.teams.len();
    let base_seed = seed.unwrap_or_else(|| rand::rng().random());

    let chunks: Vec<(usize, usize)> = (0..trials)
        .step_by(TRIALS_PER_CHUNK)
        .enumerate()
        .map(|(i, start)| (i, TRIALS_PER_CHUNK.min(trials - start)))
        .collect();
    debug!(
        "Simulating {} trials in {} chunks over {} weeks",
        trials,
        chunks.len(),
        input.remaining_weeks
    );

    let appearances = chunks
        .into_par_iter()
        .map(|(chunk, size)| {
            let mut rng = StdRng::seed_from_u64(chunk_seed(base_seed, chunk));
            run_trials_with(input, config, size, &mut rng)
        })
        .reduce(
            || vec![0u32; n],
            |mut acc, part| {
                for (total, count) in acc.iter_mut().zip(part) {
                    *total += count;
                }
                acc
            },
        );

    let eliminated: Vec<bool> = (0..n).map(|i| is_eliminated(input, i, config)).collect();
    let playoff: Vec<f64> = appearances
        .iter()
        .zip(&eliminated)
        .map(|(count, out)| {
            if *out {
                0.0
            } else {
                ratio(*count as f64, trials as f64)
            }
        })
        .collect();

    let raw_title: Vec<f64> = input
        .teams
        .iter()
        .zip(&playoff)
        .map(|(team, p)| p * BASE_TITLE_SHARE * title_multiplier(team, input.league_average))
        .collect();
    let title_total: f64 = raw_title.iter().sum();

    let shaded = |p: f64| american_odds(if p >= 0.5 { p * (1.0 + vig) } else { p * (1.0 - vig) });

    let teams = input
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let championship = ratio(raw_title[i], title_total);
            let out = eliminated[i];
            TeamFutures {
                roster_id: team.roster_id,
                playoff_probability: playoff[i],
                championship_probability: championship,
                eliminated: out,
                playoff_odds: (!out).then(|| shaded(playoff[i])),
                championship_odds: (!out).then(|| shaded(championship)),
            }
        })
        .collect();

    SimulationResult {
        trials,
        remaining_weeks: input.remaining_weeks,
        teams,
    }
}
