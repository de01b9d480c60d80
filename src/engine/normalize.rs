//! Record normalizer: raw per-season matchup rows → dense per-roster,
//! per-week tables.
//!
//! Every roster gets exactly one [`WeeklyRecord`] for each week
//! `1..=total_weeks`. Weeks without a row are synthesized as zero-score
//! placeholders so downstream sums and weekly ranks stay total.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::{
    cli::types::{OwnerId, RosterId, Season},
    error::{LeagueError, Result},
    sleeper::types::{RawMatchup, SeasonRecords},
};


/// One franchise within one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub roster_id: RosterId,
    pub owner_id: Option<OwnerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpponentContext {
    pub opponent_score: f64,
    pub opponent: Option<RosterId>,
    pub is_regular_season: bool,
    pub has_opponent: bool,
}

/// One roster's result for one week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyRecord {
    pub week: u16,
    pub points_for: f64,
    pub opponent_points_for: f64,
    pub opponent: Option<RosterId>,
    pub has_opponent: bool,
    pub is_regular_season: bool,
    /// No source row existed; the week was filled with zeros.
    pub is_placeholder: bool,
}

impl WeeklyRecord {
    pub fn is_win(&self) -> bool {
        self.has_opponent && self.points_for > self.opponent_points_for
    }

    pub fn is_loss(&self) -> bool {
        self.has_opponent && self.points_for < self.opponent_points_for
    }

    pub fn is_tie(&self) -> bool {
        self.has_opponent && self.points_for == self.opponent_points_for
    }

    /// 1 for a win, 0.5 for a tie, 0 otherwise.
    pub fn win_value(&self) -> f64 {
        if self.is_win() {
            1.0
        } else if self.is_tie() {
            0.5
        } else {
            0.0
        }
    }
}

/// A pairing whose week has not been played yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduledGame {
    pub week: u16,
    pub team1: RosterId,
    pub team2: Option<RosterId>,
}

/// One season in tabular form.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSeason {
    pub season: Season,
    /// First playoff week; weeks before it are regular season.
    pub playoff_start_week: u16,
    pub total_weeks: u16,
    /// Sorted by roster id.
    pub rosters: Vec<Roster>,
    pub score_by_roster_and_week: BTreeMap<RosterId, BTreeMap<u16, f64>>,
    pub opponent_context_by_roster_and_week: BTreeMap<RosterId, BTreeMap<u16, OpponentContext>>,
    /// Real-game scores per week, for within-week all-play comparisons.
    pub weekly_scores_by_week: BTreeMap<u16, Vec<(RosterId, f64)>>,
    pub scheduled: Vec<ScheduledGame>,
    pub dropped_rows: usize,
}

/// A parsed, validated matchup row.
struct CleanRow {
    week: u16,
    team1: RosterId,
    score1: f64,
    team2: Option<(RosterId, f64)>,
}

impl CleanRow {
    fn is_scored(&self) -> bool {
        self.score1 != 0.0 || self.team2.is_some_and(|(_, score)| score != 0.0)
    }
}

fn clean_row(season: Season, row: &RawMatchup) -> Result<CleanRow> {
    let malformed = |reason: &str| LeagueError::MalformedRecord {
        season,
        reason: reason.to_string(),
    };

    let week = row.week.ok_or_else(|| malformed("unparsable week"))?;
    let team1 = row
        .team1_roster_id
        .ok_or_else(|| malformed("missing first roster id"))?;
    let score1 = row
        .team1_score
        .ok_or_else(|| malformed("non-numeric score"))?;
    let team2 = match row.team2_roster_id {
        Some(id) if id == team1 => return Err(malformed("roster paired with itself")),
        Some(id) => Some((
            id,
            row.team2_score
                .ok_or_else(|| malformed("non-numeric opponent score"))?,
        )),
        None => None,
    };

    Ok(CleanRow {
        week,
        team1,
        score1,
        team2,
    })
}

/// Normalize one season's records.
///
/// `last_completed_week` is `None` for a finished season; otherwise rows
/// after it are kept as [`ScheduledGame`]s and do not count as played.
/// Rows after the last week with any nonzero score are scheduled either way.
/// Returns [`LeagueError::MissingData`] when the season lacks metadata,
/// rosters, users or matchups.
pub fn normalize_season(
    records: &SeasonRecords,
    last_completed_week: Option<u16>,
    default_playoff_start: u16,
) -> Result<NormalizedSeason> {
    let season = records.season;
    let missing = |what: &str| LeagueError::MissingData {
        season,
        what: what.to_string(),
    };

    let metadata = records.metadata.as_ref().ok_or_else(|| missing("metadata"))?;
    if records.rosters.is_empty() {
        return Err(missing("rosters"));
    }
    if records.users.is_empty() {
        return Err(missing("users"));
    }
    if records.matchups.is_empty() {
        return Err(missing("matchups"));
    }

    let playoff_start_week = metadata
        .settings
        .playoff_week_start
        .filter(|w| *w > 1)
        .unwrap_or(default_playoff_start);

    let mut rosters: BTreeMap<RosterId, Option<OwnerId>> = records
        .rosters
        .iter()
        .map(|r| (r.roster_id, r.owner_id.clone()))
        .collect();

    let mut rows = Vec::with_capacity(records.matchups.len());
    let mut dropped_rows = 0;
    for raw in &records.matchups {
        match clean_row(season, raw) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("Dropping matchup row: {}", e);
                dropped_rows += 1;
            }
        }
    }

    // Unplayed weeks arrive as 0-0 pairings, so nothing after the last
    // scored week counts as played.
    let last_scored_week = rows
        .iter()
        .filter(|r| r.is_scored())
        .map(|r| r.week)
        .max()
        .unwrap_or(0);
    let played_through =
        last_completed_week.map_or(last_scored_week, |last| last.min(last_scored_week));
    let max_observed_week = rows.iter().map(|r| r.week).max().unwrap_or(0);
    if played_through < max_observed_week {
        debug!(
            "Season {}: weeks after {} are not played yet",
            season, played_through
        );
    }

    let mut score_by_roster_and_week: BTreeMap<RosterId, BTreeMap<u16, f64>> = BTreeMap::new();
    let mut opponent_context: BTreeMap<RosterId, BTreeMap<u16, OpponentContext>> = BTreeMap::new();
    let mut scheduled = Vec::new();

    for row in &rows {
        rosters.entry(row.team1).or_insert(None);
        if let Some((team2, _)) = row.team2 {
            rosters.entry(team2).or_insert(None);
        }

        if row.week > played_through {
            scheduled.push(ScheduledGame {
                week: row.week,
                team1: row.team1,
                team2: row.team2.map(|(id, _)| id),
            });
            continue;
        }

        let is_regular_season = row.week < playoff_start_week;
        let duplicate = score_by_roster_and_week
            .get(&row.team1)
            .is_some_and(|weeks| weeks.contains_key(&row.week))
            || row.team2.is_some_and(|(id, _)| {
                score_by_roster_and_week
                    .get(&id)
                    .is_some_and(|weeks| weeks.contains_key(&row.week))
            });
        if duplicate {
            warn!(
                "Dropping duplicate matchup row for season {} week {}",
                season, row.week
            );
            dropped_rows += 1;
            continue;
        }

        let mut record_side = |roster: RosterId, own: f64, opponent: Option<(RosterId, f64)>| {
            score_by_roster_and_week
                .entry(roster)
                .or_default()
                .insert(row.week, own);
            opponent_context.entry(roster).or_default().insert(
                row.week,
                OpponentContext {
                    opponent_score: opponent.map(|(_, s)| s).unwrap_or(0.0),
                    opponent: opponent.map(|(id, _)| id),
                    is_regular_season,
                    has_opponent: opponent.is_some(),
                },
            );
        };

        record_side(row.team1, row.score1, row.team2);
        if let Some((team2, score2)) = row.team2 {
            record_side(team2, score2, Some((row.team1, row.score1)));
        }
    }

    let max_round = records
        .winners_bracket
        .iter()
        .chain(records.losers_bracket.iter())
        .map(|m| m.round as u16)
        .max()
        .unwrap_or(0);
    let regular_season_len = playoff_start_week.saturating_sub(1);
    let total_weeks = (regular_season_len + max_round).max(max_observed_week);

    let mut weekly_scores_by_week: BTreeMap<u16, Vec<(RosterId, f64)>> = BTreeMap::new();
    for (roster, weeks) in &opponent_context {
        for (week, ctx) in weeks {
            let score = score_by_roster_and_week
                .get(roster)
                .and_then(|scores| scores.get(week));
            if let (true, Some(&score)) = (ctx.has_opponent, score) {
                weekly_scores_by_week
                    .entry(*week)
                    .or_default()
                    .push((*roster, score));
            }
        }
    }

    Ok(NormalizedSeason {
        season,
        playoff_start_week,
        total_weeks,
        rosters: rosters
            .into_iter()
            .map(|(roster_id, owner_id)| Roster {
                roster_id,
                owner_id,
            })
            .collect(),
        score_by_roster_and_week,
        opponent_context_by_roster_and_week: opponent_context,
        weekly_scores_by_week,
        scheduled,
        dropped_rows,
    })
}

impl NormalizedSeason {
    pub fn regular_season_len(&self) -> u16 {
        self.playoff_start_week.saturating_sub(1)
    }

    pub fn owner_of(&self, roster: RosterId) -> Option<&OwnerId> {
        self.rosters
            .iter()
            .find(|r| r.roster_id == roster)
            .and_then(|r| r.owner_id.as_ref())
    }

    pub fn roster_of(&self, owner: &OwnerId) -> Option<RosterId> {
        self.rosters
            .iter()
            .find(|r| r.owner_id.as_ref() == Some(owner))
            .map(|r| r.roster_id)
    }

    /// The dense record for `roster` in `week`; a placeholder when absent.
    pub fn record(&self, roster: RosterId, week: u16) -> WeeklyRecord {
        let score = self
            .score_by_roster_and_week
            .get(&roster)
            .and_then(|weeks| weeks.get(&week))
            .copied();
        let ctx = self
            .opponent_context_by_roster_and_week
            .get(&roster)
            .and_then(|weeks| weeks.get(&week))
            .copied();

        match (score, ctx) {
            (Some(points_for), Some(ctx)) => WeeklyRecord {
                week,
                points_for,
                opponent_points_for: ctx.opponent_score,
                opponent: ctx.opponent,
                has_opponent: ctx.has_opponent,
                is_regular_season: ctx.is_regular_season,
                is_placeholder: false,
            },
            _ => WeeklyRecord {
                week,
                points_for: 0.0,
                opponent_points_for: 0.0,
                opponent: None,
                has_opponent: false,
                is_regular_season: week < self.playoff_start_week,
                is_placeholder: true,
            },
        }
    }

    /// Weeks `1..=total_weeks` for `roster`, one record each.
    pub fn weekly_records(&self, roster: RosterId) -> Vec<WeeklyRecord> {
        (1..=self.total_weeks)
            .map(|week| self.record(roster, week))
            .collect()
    }

    /// Games with a real opponent, in week order.
    pub fn played_games(&self, roster: RosterId) -> Vec<WeeklyRecord> {
        self.weekly_records(roster)
            .into_iter()
            .filter(|r| r.has_opponent)
            .collect()
    }

    /// Regular-season games with a real opponent, in week order.
    pub fn regular_season_games(&self, roster: RosterId) -> Vec<WeeklyRecord> {
        self.played_games(roster)
            .into_iter()
            .filter(|r| r.is_regular_season)
            .collect()
    }

    /// Last week with any played result, 0 when nothing has been played.
    pub fn last_played_week(&self) -> u16 {
        self.score_by_roster_and_week
            .values()
            .filter_map(|weeks| weeks.keys().next_back().copied())
            .max()
            .unwrap_or(0)
    }

    /// Regular-season weeks still to be played.
    pub fn remaining_regular_weeks(&self) -> u16 {
        let scheduled: BTreeSet<u16> = self
            .scheduled
            .iter()
            .map(|g| g.week)
            .filter(|w| *w < self.playoff_start_week)
            .collect();
        if !scheduled.is_empty() {
            return scheduled.len() as u16;
        }
        self.regular_season_len()
            .saturating_sub(self.last_played_week().min(self.regular_season_len()))
    }

    /// A copy holding only results from weeks `<= last_week`.
    ///
    /// Later weeks become placeholders; `total_weeks` is kept so the dense
    /// shape does not change.
    pub fn truncated(&self, last_week: u16) -> NormalizedSeason {
        let keep = |weeks: &BTreeMap<u16, f64>| -> BTreeMap<u16, f64> {
            weeks.range(..=last_week).map(|(w, s)| (*w, *s)).collect()
        };
        let mut copy = self.clone();
        copy.score_by_roster_and_week = self
            .score_by_roster_and_week
            .iter()
            .map(|(roster, weeks)| (*roster, keep(weeks)))
            .collect();
        copy.opponent_context_by_roster_and_week = self
            .opponent_context_by_roster_and_week
            .iter()
            .map(|(roster, weeks)| {
                (
                    *roster,
                    weeks.range(..=last_week).map(|(w, c)| (*w, *c)).collect(),
                )
            })
            .collect();
        copy.weekly_scores_by_week = self
            .weekly_scores_by_week
            .range(..=last_week)
            .map(|(w, s)| (*w, s.clone()))
            .collect();
        copy
    }
}
