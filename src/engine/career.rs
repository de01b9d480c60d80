//! Career aggregation: every seasonal row folded per owner.
//!
//! Totals are only ever summed from [`SeasonalMetric`] rows, never
//! re-derived from matchups, so a career always equals the sum of its
//! seasons. DPR is recomputed once on the lifetime totals and normalized
//! across owners the same way a season is.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    cli::types::{OwnerId, RosterId, Season},
    core::config::MilestoneConfig,
    engine::{
        normalize::NormalizedSeason,
        seasonal::{dpr_mean, ratio, raw_dpr, Rank, SeasonalMetric},
    },
};

#[cfg(test)]
mod tests;

/// One owner's lifetime aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CareerMetric {
    pub owner_id: OwnerId,
    pub team_name: String,
    pub seasons_played: u32,

    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
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
    pub luck_rating: f64,

    pub top_score_weeks_count: u32,
    pub weekly_top2_scores_count: u32,
    pub blowout_wins: u32,
    pub blowout_losses: u32,
    pub slim_wins: u32,
    pub slim_losses: u32,

    pub championships: u32,
    pub runner_ups: u32,
    pub third_places: u32,
    pub points_championships: u32,
    pub points_runner_ups: u32,
    pub third_place_points: u32,
    pub playoff_appearances: u32,
    pub best_finish: Rank,

    pub highest_seasonal_points_avg: f64,
    pub lowest_seasonal_points_avg: f64,
}

/// Fold seasonal rows into one [`CareerMetric`] per owner.
///
/// Rows without an owner cannot be joined across seasons and are skipped.
/// `team_name` supplies each owner's current display name.
pub fn aggregate_careers<F>(rows: &[SeasonalMetric], team_name: F) -> BTreeMap<OwnerId, CareerMetric>
where
    F: Fn(&OwnerId) -> String,
{
    let mut careers: BTreeMap<OwnerId, CareerMetric> = BTreeMap::new();
    // (high, low) over seasons with at least one game.
    let mut extremes: BTreeMap<OwnerId, (Option<f64>, Option<f64>)> = BTreeMap::new();
    let mut averages: BTreeMap<OwnerId, Vec<f64>> = BTreeMap::new();

    for row in rows {
        let Some(owner) = row.owner_id.as_ref() else {
            continue;
        };
        let c = careers.entry(owner.clone()).or_insert_with(|| CareerMetric {
            owner_id: owner.clone(),
            team_name: team_name(owner),
            ..Default::default()
        });

        c.seasons_played += 1;
        c.wins += row.wins;
        c.losses += row.losses;
        c.ties += row.ties;
        c.points_for += row.points_for;
        c.points_against += row.points_against;
        c.total_games += row.total_games;
        c.all_play_wins += row.all_play_wins;
        c.all_play_losses += row.all_play_losses;
        c.all_play_ties += row.all_play_ties;
        c.luck_rating += row.luck_rating;
        c.top_score_weeks_count += row.top_score_weeks_count;
        c.weekly_top2_scores_count += row.weekly_top2_scores_count;
        c.blowout_wins += row.blowout_wins;
        c.blowout_losses += row.blowout_losses;
        c.slim_wins += row.slim_wins;
        c.slim_losses += row.slim_losses;

        c.championships += row.is_champion as u32;
        c.runner_ups += row.is_runner_up as u32;
        c.third_places += row.is_third_place as u32;
        c.points_championships += row.is_points_champion as u32;
        c.points_runner_ups += row.is_points_runner_up as u32;
        c.third_place_points += row.is_third_place_points as u32;
        c.playoff_appearances += row.made_playoffs as u32;
        if row.rank.placed().is_some() && row.rank < c.best_finish {
            c.best_finish = row.rank;
        }

        if row.total_games > 0 {
            let (high, low) = extremes.entry(owner.clone()).or_default();
            *high = Some(high.map_or(row.high_score, |h| h.max(row.high_score)));
            *low = Some(low.map_or(row.low_score, |l| l.min(row.low_score)));
            averages
                .entry(owner.clone())
                .or_default()
                .push(row.average_score);
        }
    }

    for (owner, c) in careers.iter_mut() {
        let games = c.total_games as f64;
        c.average_score = ratio(c.points_for, games);
        c.win_percentage = ratio(c.wins as f64 + 0.5 * c.ties as f64, games);
        let all_play = (c.all_play_wins + c.all_play_losses + c.all_play_ties) as f64;
        c.all_play_win_percentage =
            ratio(c.all_play_wins as f64 + 0.5 * c.all_play_ties as f64, all_play);

        if let Some((high, low)) = extremes.get(owner) {
            c.high_score = high.unwrap_or(0.0);
            c.low_score = low.unwrap_or(0.0);
        }
        if let Some(avgs) = averages.get(owner) {
            c.highest_seasonal_points_avg = avgs.iter().copied().fold(f64::MIN, f64::max);
            c.lowest_seasonal_points_avg = avgs.iter().copied().fold(f64::MAX, f64::min);
        }
        if c.total_games > 0 {
            c.raw_dpr = raw_dpr(c.average_score, c.high_score, c.low_score, c.win_percentage);
        }
    }

    let played: Vec<f64> = careers
        .values()
        .filter(|c| c.total_games > 0)
        .map(|c| c.raw_dpr)
        .collect();
    let mean = dpr_mean(&played, "all careers");
    for c in careers.values_mut() {
        c.adjusted_dpr = if c.total_games > 0 {
            ratio(c.raw_dpr, mean)
        } else {
            0.0
        };
    }

    careers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Wins,
    Points,
}

/// The moment an owner's career total first reached `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneEvent {
    pub owner_id: OwnerId,
    pub kind: MilestoneKind,
    pub threshold: u64,
    pub season: Season,
    pub week: u16,
}

/// Every milestone crossed, in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MilestoneTimeline {
    pub events: Vec<MilestoneEvent>,
}

impl MilestoneTimeline {
    /// Owners in the order they reached `threshold` of `kind`.
    pub fn achievement_order(&self, kind: MilestoneKind, threshold: u64) -> Vec<&OwnerId> {
        self.events
            .iter()
            .filter(|e| e.kind == kind && e.threshold == threshold)
            .map(|e| &e.owner_id)
            .collect()
    }

    pub fn for_owner<'a, 'b>(&'a self, owner: &'b OwnerId) -> impl Iterator<Item = &'a MilestoneEvent> + use<'a, 'b> {
        self.events.iter().filter(move |e| &e.owner_id == owner)
    }
}

#[derive(Default)]
struct Running {
    wins: u32,
    points: f64,
}

/// Walk every season week by week and record each threshold crossing.
///
/// `seasons` may be in any order; they are replayed oldest first. Owners
/// crossing in the same week are listed by owner id.
pub fn milestone_timeline(seasons: &[&NormalizedSeason], config: &MilestoneConfig) -> MilestoneTimeline {
    let mut ordered: Vec<&NormalizedSeason> = seasons.to_vec();
    ordered.sort_by_key(|s| s.season);

    let wins_step = config.wins_step.max(1);
    let points_step = if config.points_step > 0.0 {
        config.points_step
    } else {
        f64::INFINITY
    };

    let mut running: BTreeMap<OwnerId, Running> = BTreeMap::new();
    let mut events = Vec::new();

    for season in ordered {
        let owners: Vec<(RosterId, &OwnerId)> = season
            .rosters
            .iter()
            .filter_map(|r| r.owner_id.as_ref().map(|o| (r.roster_id, o)))
            .collect();

        for week in 1..=season.total_weeks {
            let mut crossed: Vec<MilestoneEvent> = Vec::new();
            for (roster, owner) in &owners {
                let record = season.record(*roster, week);
                if record.is_placeholder {
                    continue;
                }
                let totals = running.entry((*owner).clone()).or_default();

                let wins_before = totals.wins;
                if record.is_win() {
                    totals.wins += 1;
                }
                if totals.wins / wins_step > wins_before / wins_step {
                    crossed.push(MilestoneEvent {
                        owner_id: (*owner).clone(),
                        kind: MilestoneKind::Wins,
                        threshold: u64::from(totals.wins / wins_step * wins_step),
                        season: season.season,
                        week,
                    });
                }

                let steps_before = (totals.points / points_step).floor();
                totals.points += record.points_for;
                let steps_after = (totals.points / points_step).floor();
                let mut step = steps_before + 1.0;
                while step <= steps_after {
                    crossed.push(MilestoneEvent {
                        owner_id: (*owner).clone(),
                        kind: MilestoneKind::Points,
                        threshold: (step * points_step) as u64,
                        season: season.season,
                        week,
                    });
                    step += 1.0;
                }
            }
            crossed.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.owner_id.cmp(&b.owner_id)));
            events.extend(crossed);
        }
    }

    MilestoneTimeline { events }
}
