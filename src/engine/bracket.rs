//! Playoff bracket ranker.
//!
//! The winners tree places ranks `1..=n`; the losers tree continues from the
//! next free rank. Within a tree:
//!
//! 1. title game: winner 1, loser 2
//! 2. third-place game: winner 3, loser 4; without one, the semifinal losers
//!    ordered by regular-season points
//! 3. other tagged placement games (`p = 5`, `p = 7`, ...): winner `p`,
//!    loser `p + 1`
//! 4. everyone else who appears in the tree, in [`BracketFallback`] order
//!
//! Positions are then compacted so each participant gets a unique rank with
//! no gaps.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::{
    cli::types::RosterId,
    core::config::BracketFallback,
    engine::{
        seasonal::Rank,
        status::{championship_match, third_place_match},
    },
    sleeper::types::BracketMatch,
};

/// Final finishing positions for one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BracketRanking {
    pub ranks: BTreeMap<RosterId, Rank>,
    /// Rosters that appear in the winners tree.
    pub playoff_teams: Vec<RosterId>,
}

impl BracketRanking {
    pub fn rank_of(&self, roster: RosterId) -> Rank {
        self.ranks.get(&roster).copied().unwrap_or_default()
    }
}

fn tree_participants(matches: &[BracketMatch]) -> BTreeSet<RosterId> {
    matches.iter().flat_map(|m| m.participants()).collect()
}

/// Rosters in finishing order for a single tree, best first.
fn order_tree(
    matches: &[BracketMatch],
    fallback: BracketFallback,
    regular_season_points: &BTreeMap<RosterId, f64>,
) -> Vec<RosterId> {
    let points = |id: &RosterId| regular_season_points.get(id).copied().unwrap_or(0.0);
    let mut keyed: Vec<(u32, RosterId)> = Vec::new();
    let push_result = |key: u32, m: &BracketMatch, keyed: &mut Vec<(u32, RosterId)>| {
        if let (Some(w), Some(l)) = (m.winner, m.loser) {
            keyed.push((key, w));
            keyed.push((key + 1, l));
        }
    };

    let title = championship_match(matches).filter(|m| m.is_resolved());
    if let Some(title) = title {
        push_result(1, title, &mut keyed);

        match third_place_match(matches).filter(|m| m.is_resolved()) {
            Some(third) => push_result(3, third, &mut keyed),
            None => {
                let mut semifinal_losers: Vec<RosterId> = matches
                    .iter()
                    .filter(|m| {
                        m.round + 1 == title.round && m.placement.is_none() && m.is_resolved()
                    })
                    .filter_map(|m| m.loser)
                    .collect();
                semifinal_losers.sort_by(|a, b| points(b).total_cmp(&points(a)).then(a.cmp(b)));
                for (offset, id) in semifinal_losers.into_iter().enumerate() {
                    keyed.push((3 + offset as u32, id));
                }
            }
        }
    }

    for m in matches.iter().filter(|m| m.is_resolved()) {
        if let Some(p) = m.placement.filter(|p| *p >= 5) {
            push_result(p, m, &mut keyed);
        }
    }

    keyed.sort_by_key(|(key, _)| *key);
    let mut ordered: Vec<RosterId> = Vec::new();
    for (_, id) in keyed {
        if !ordered.contains(&id) {
            ordered.push(id);
        }
    }

    let mut rest: Vec<RosterId> = tree_participants(matches)
        .into_iter()
        .filter(|id| !ordered.contains(id))
        .collect();
    match fallback {
        BracketFallback::RosterIdAscending => rest.sort(),
        BracketFallback::PointsDescending => {
            rest.sort_by(|a, b| points(b).total_cmp(&points(a)).then(a.cmp(b)))
        }
    }
    ordered.extend(rest);
    ordered
}

/// Rank every roster that appears in either tree.
///
/// Until the winners tree's title game is resolved (or when nothing in
/// either tree is), every participant is [`Rank::NotAvailable`].
pub fn rank_brackets(
    winners: &[BracketMatch],
    losers: &[BracketMatch],
    fallback: BracketFallback,
    regular_season_points: &BTreeMap<RosterId, f64>,
) -> BracketRanking {
    let playoff_teams: Vec<RosterId> = tree_participants(winners).into_iter().collect();
    let any_resolved = winners.iter().chain(losers).any(|m| m.is_resolved());
    let title_pending =
        !winners.is_empty() && !championship_match(winners).is_some_and(|m| m.is_resolved());

    if !any_resolved || title_pending {
        debug!("Title game unresolved; ranks unavailable");
        let ranks = tree_participants(winners)
            .into_iter()
            .chain(tree_participants(losers))
            .map(|id| (id, Rank::NotAvailable))
            .collect();
        return BracketRanking {
            ranks,
            playoff_teams,
        };
    }

    let mut ranks = BTreeMap::new();
    let mut next = 1;
    for tree in [winners, losers] {
        for id in order_tree(tree, fallback, regular_season_points) {
            if ranks.contains_key(&id) {
                continue;
            }
            ranks.insert(id, Rank::Placed(next));
            next += 1;
        }
    }

    BracketRanking {
        ranks,
        playoff_teams,
    }
}
