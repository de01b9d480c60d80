//! Seasonal metrics engine: one [`SeasonalMetric`] per roster per season.
//!
//! ## DPR
//!
//! ```text
//! raw_dpr = (avg * 6 + (high + low) * 2 + (win_pct * 200) * 2) / 10
//! adjusted_dpr = raw_dpr / mean(raw_dpr of rosters that played)
//! ```
//!
//! ## Luck
//!
//! Every regular-season game week, a roster's "expected" win share is the
//! fraction of the league its score beat that week (ties count half).
//! Luck is actual regular-season wins minus the sum of those shares.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::{
    cli::types::{OwnerId, RosterId, Season},
    engine::{normalize::NormalizedSeason, status::SeasonStatus},
    error::LeagueError,
};

#[cfg(test)]
mod tests;

pub const BLOWOUT_WIN_RATIO: f64 = 1.40;
pub const BLOWOUT_LOSS_RATIO: f64 = 0.60;
pub const SLIM_MARGIN_RATIO: f64 = 0.025;

/// A finishing position, or `N/A` while a season is unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Rank {
    Placed(u32),
    #[default]
    NotAvailable,
}

impl Rank {
    pub fn placed(&self) -> Option<u32> {
        match self {
            Rank::Placed(n) => Some(*n),
            Rank::NotAvailable => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Placed(n) => write!(f, "{}", n),
            Rank::NotAvailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rank::Placed(n) => serializer.serialize_u32(*n),
            Rank::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// One roster's derived statistics for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SeasonalMetric {
    pub season: Season,
    pub roster_id: RosterId,
    pub owner_id: Option<OwnerId>,
    pub team_name: String,

    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub regular_season_wins: u32,
    pub regular_season_losses: u32,
    pub regular_season_ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub regular_season_points_for: f64,
    /// Games with a real opponent; byes are excluded.
    pub total_games: u32,
    pub average_score: f64,
    pub win_percentage: f64,
    pub high_score: f64,
    pub low_score: f64,

    pub raw_dpr: f64,
    pub adjusted_dpr: f64,

    pub all_play_wins: u32,
    pub all_play_losses: u32,
    pub all_play_ties: u32,
    pub all_play_win_percentage: f64,
    pub expected_wins: f64,
    pub luck_rating: f64,

    pub top_score_weeks_count: u32,
    pub weekly_top2_scores_count: u32,
    pub blowout_wins: u32,
    pub blowout_losses: u32,
    pub slim_wins: u32,
    pub slim_losses: u32,

    pub is_champion: bool,
    pub is_runner_up: bool,
    pub is_third_place: bool,
    pub is_points_champion: bool,
    pub is_points_runner_up: bool,
    pub is_third_place_points: bool,
    pub made_playoffs: bool,
    pub rank: Rank,
    pub points_rank: Rank,
}

/// `num / den`, or 0 when the denominator is zero.
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Log a zero denominator that the ratios over it will treat as 0.
pub(crate) fn degenerate(what: impl Into<String>) -> LeagueError {
    let err = LeagueError::DegenerateInput { what: what.into() };
    warn!("{}; ratios over it are 0", err);
    err
}

/// Mean raw DPR of the rosters that played; a zero mean is logged once.
pub(crate) fn dpr_mean(played: &[f64], scope: &str) -> f64 {
    let mean = ratio(played.iter().sum(), played.len() as f64);
    if !played.is_empty() && mean == 0.0 {
        degenerate(format!("mean raw DPR of {} is 0", scope));
    }
    mean
}

/// The DPR formula, shared by seasonal and career granularity.
pub fn raw_dpr(average_score: f64, high_score: f64, low_score: f64, win_percentage: f64) -> f64 {
    (average_score * 6.0 + (high_score + low_score) * 2.0 + (win_percentage * 200.0) * 2.0) / 10.0
}

/// Standard competition ranking ("1224"): equal values share a rank and
/// the next distinct value skips ahead by the size of the tie.
pub fn competition_ranks<K: Clone + Ord>(values: &[(K, f64)]) -> BTreeMap<K, u32> {
    let mut sorted: Vec<&(K, f64)> = values.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut ranks = BTreeMap::new();
    let mut previous: Option<f64> = None;
    let mut current_rank = 0;
    for (position, (key, value)) in sorted.into_iter().enumerate() {
        if previous != Some(*value) {
            current_rank = position as u32 + 1;
            previous = Some(*value);
        }
        ranks.insert(key.clone(), current_rank);
    }
    ranks
}

/// Compute raw seasonal metrics for every roster.
///
/// Award flags and ranks stay unset here; [`apply_awards`] fills them once
/// the playoff ranks are known. `team_name` resolves a display name for each
/// roster.
pub fn compute_season_metrics<F>(season: &NormalizedSeason, team_name: F) -> Vec<SeasonalMetric>
where
    F: Fn(RosterId, Option<&OwnerId>) -> String,
{
    let mut metrics: Vec<SeasonalMetric> = season
        .rosters
        .iter()
        .map(|roster| {
            let mut metric = roster_metrics(season, roster.roster_id);
            metric.owner_id = roster.owner_id.clone();
            metric.team_name = team_name(roster.roster_id, roster.owner_id.as_ref());
            metric
        })
        .collect();

    normalize_dpr(&mut metrics);
    metrics
}

/// Metrics as they stood before `week` kicked off.
///
/// Only weeks `< week` count, so the odds for a week never see its own
/// results.
pub fn metrics_through_week<F>(
    season: &NormalizedSeason,
    week: u16,
    team_name: F,
) -> Vec<SeasonalMetric>
where
    F: Fn(RosterId, Option<&OwnerId>) -> String,
{
    compute_season_metrics(&season.truncated(week.saturating_sub(1)), team_name)
}

fn roster_metrics(season: &NormalizedSeason, roster: RosterId) -> SeasonalMetric {
    let mut m = SeasonalMetric {
        season: season.season,
        roster_id: roster,
        ..Default::default()
    };
    let mut high: Option<f64> = None;
    let mut low: Option<f64> = None;

    for record in season.weekly_records(roster) {
        if record.is_placeholder {
            continue;
        }
        let score = record.points_for;
        m.points_for += score;
        if record.is_regular_season {
            m.regular_season_points_for += score;
        }
        high = Some(high.map_or(score, |h| h.max(score)));
        low = Some(low.map_or(score, |l| l.min(score)));

        if !record.has_opponent {
            continue;
        }

        m.total_games += 1;
        m.points_against += record.opponent_points_for;
        let opp = record.opponent_points_for;

        if record.is_win() {
            m.wins += 1;
        } else if record.is_loss() {
            m.losses += 1;
        } else {
            m.ties += 1;
        }

        if !record.is_regular_season {
            continue;
        }

        if record.is_win() {
            m.regular_season_wins += 1;
        } else if record.is_loss() {
            m.regular_season_losses += 1;
        } else {
            m.regular_season_ties += 1;
        }

        if opp > 0.0 {
            if score > BLOWOUT_WIN_RATIO * opp {
                m.blowout_wins += 1;
            }
            if score < BLOWOUT_LOSS_RATIO * opp {
                m.blowout_losses += 1;
            }
            if score > opp && score - opp < SLIM_MARGIN_RATIO * opp {
                m.slim_wins += 1;
            }
            if score < opp && opp - score < SLIM_MARGIN_RATIO * score {
                m.slim_losses += 1;
            }
        }

        let Some(week_scores) = season.weekly_scores_by_week.get(&record.week) else {
            continue;
        };

        let (mut ap_w, mut ap_l, mut ap_t) = (0u32, 0u32, 0u32);
        for (other, other_score) in week_scores {
            if *other == roster {
                continue;
            }
            if score > *other_score {
                ap_w += 1;
            } else if score < *other_score {
                ap_l += 1;
            } else {
                ap_t += 1;
            }
        }
        let opponents = ap_w + ap_l + ap_t;
        if opponents > 0 {
            m.expected_wins += (ap_w as f64 + 0.5 * ap_t as f64) / opponents as f64;
        }
        m.all_play_wins += ap_w;
        m.all_play_losses += ap_l;
        m.all_play_ties += ap_t;

        let mut scores: Vec<f64> = week_scores.iter().map(|(_, s)| *s).collect();
        scores.sort_by(|a, b| b.total_cmp(a));
        if scores.first() == Some(&score) {
            m.top_score_weeks_count += 1;
        }
        if scores.iter().take(2).any(|s| *s == score) {
            m.weekly_top2_scores_count += 1;
        }
    }

    m.high_score = high.unwrap_or(0.0);
    m.low_score = low.unwrap_or(0.0);
    let games = m.total_games as f64;
    m.average_score = ratio(m.points_for, games);
    m.win_percentage = ratio(m.wins as f64 + 0.5 * m.ties as f64, games);

    let all_play_games = (m.all_play_wins + m.all_play_losses + m.all_play_ties) as f64;
    m.all_play_win_percentage = ratio(
        m.all_play_wins as f64 + 0.5 * m.all_play_ties as f64,
        all_play_games,
    );

    let actual = m.regular_season_wins as f64 + 0.5 * m.regular_season_ties as f64;
    m.luck_rating = actual - m.expected_wins;

    if m.total_games > 0 {
        m.raw_dpr = raw_dpr(m.average_score, m.high_score, m.low_score, m.win_percentage);
    }
    m
}

/// Divide each raw DPR by the mean raw DPR of rosters that played a game.
fn normalize_dpr(metrics: &mut [SeasonalMetric]) {
    let played: Vec<f64> = metrics
        .iter()
        .filter(|m| m.total_games > 0)
        .map(|m| m.raw_dpr)
        .collect();
    let scope = metrics
        .first()
        .map(|m| format!("season {}", m.season))
        .unwrap_or_default();
    let mean = dpr_mean(&played, &scope);

    for m in metrics.iter_mut() {
        m.adjusted_dpr = if m.total_games > 0 {
            ratio(m.raw_dpr, mean)
        } else {
            0.0
        };
    }
}

/// Fill award flags and ranks for a season.
///
/// `playoff_ranks` comes from the bracket ranker. Nothing is filled unless
/// `status` is [`SeasonStatus::Complete`]; an in-progress season keeps every
/// flag false and both ranks `N/A`.
pub fn apply_awards(
    metrics: &mut [SeasonalMetric],
    status: SeasonStatus,
    playoff_ranks: &BTreeMap<RosterId, Rank>,
    playoff_participants: &[RosterId],
) {
    for m in metrics.iter_mut() {
        m.is_champion = false;
        m.is_runner_up = false;
        m.is_third_place = false;
        m.is_points_champion = false;
        m.is_points_runner_up = false;
        m.is_third_place_points = false;
        m.made_playoffs = false;
        m.rank = Rank::NotAvailable;
        m.points_rank = Rank::NotAvailable;
    }

    if !status.is_complete() {
        return;
    }

    let points: Vec<(RosterId, f64)> = metrics.iter().map(|m| (m.roster_id, m.points_for)).collect();
    let points_ranks = competition_ranks(&points);

    for m in metrics.iter_mut() {
        m.rank = playoff_ranks
            .get(&m.roster_id)
            .copied()
            .unwrap_or(Rank::NotAvailable);
        m.is_champion = m.rank == Rank::Placed(1);
        m.is_runner_up = m.rank == Rank::Placed(2);
        m.is_third_place = m.rank == Rank::Placed(3);
        m.made_playoffs = playoff_participants.contains(&m.roster_id);

        if let Some(rank) = points_ranks.get(&m.roster_id) {
            m.points_rank = Rank::Placed(*rank);
            m.is_points_champion = *rank == 1;
            m.is_points_runner_up = *rank == 2;
            m.is_third_place_points = *rank == 3;
        }
    }
}
