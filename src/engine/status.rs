//! Season completeness, decided once from the winners bracket.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::{cli::types::RosterId, sleeper::types::BracketMatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeasonStatus {
    InProgress,
    Complete,
}

impl SeasonStatus {
    /// Complete once the championship match has both a winner and a loser.
    pub fn from_winners_bracket(winners: &[BracketMatch]) -> Self {
        match championship_match(winners) {
            Some(m) if m.is_resolved() => SeasonStatus::Complete,
            _ => SeasonStatus::InProgress,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SeasonStatus::Complete)
    }
}

fn max_round(matches: &[BracketMatch]) -> Option<u32> {
    matches.iter().map(|m| m.round).max()
}

/// Winners (or losers) of every resolved match in `round`.
fn round_results(matches: &[BracketMatch], round: u32, winners: bool) -> BTreeSet<RosterId> {
    matches
        .iter()
        .filter(|m| m.round == round && m.is_resolved())
        .filter_map(|m| if winners { m.winner } else { m.loser })
        .collect()
}

fn sides_subset_of(m: &BracketMatch, pool: &BTreeSet<RosterId>) -> bool {
    let sides: Vec<RosterId> = [m.team1, m.team2, m.winner, m.loser]
        .into_iter()
        .flatten()
        .collect();
    !sides.is_empty() && sides.iter().all(|id| pool.contains(id))
}

/// The title game of a bracket tree.
///
/// Uses the `p = 1` placement tag when the source provides one. Otherwise,
/// among final-round matches, the one fed by the previous round's winners
/// (or a bye team); failing that, the highest-slot match of the final round.
pub fn championship_match(matches: &[BracketMatch]) -> Option<&BracketMatch> {
    let last = max_round(matches)?;
    let final_round: Vec<&BracketMatch> = matches.iter().filter(|m| m.round == last).collect();

    if let Some(tagged) = final_round.iter().copied().find(|m| m.placement == Some(1)) {
        return Some(tagged);
    }
    if final_round.len() == 1 {
        return final_round.first().copied();
    }

    let mut feeders = round_results(matches, last.saturating_sub(1), true);
    feeders.extend(
        matches
            .iter()
            .filter(|m| m.round < last)
            .flat_map(|m| m.bye_teams.iter().copied()),
    );
    if let Some(fed) = final_round
        .iter()
        .copied()
        .find(|m| sides_subset_of(m, &feeders))
    {
        return Some(fed);
    }

    final_round.into_iter().max_by_key(|m| m.match_slot)
}

/// The third-place game of a bracket tree, if one was scheduled.
///
/// Uses the `p = 3` tag when present; otherwise the final-round match fed by
/// the previous round's losers; otherwise the match in a slot adjacent to the
/// title game.
pub fn third_place_match(matches: &[BracketMatch]) -> Option<&BracketMatch> {
    let title = championship_match(matches)?;
    let last = title.round;
    let others: Vec<&BracketMatch> = matches
        .iter()
        .filter(|m| m.round == last && !std::ptr::eq(*m, title))
        .collect();

    if let Some(tagged) = others.iter().copied().find(|m| m.placement == Some(3)) {
        return Some(tagged);
    }
    if others.iter().any(|m| m.placement.is_some()) {
        // Tagged bracket without a third-place tag: none was played.
        return None;
    }

    let semifinal_losers = round_results(matches, last.saturating_sub(1), false);
    if let Some(fed) = others
        .iter()
        .copied()
        .find(|m| sides_subset_of(m, &semifinal_losers))
    {
        return Some(fed);
    }

    others
        .into_iter()
        .find(|m| m.match_slot.abs_diff(title.match_slot) == 1)
}
