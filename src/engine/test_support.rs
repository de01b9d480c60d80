//! Fixture builders shared by the engine's unit tests.

use crate::cli::types::{OwnerId, RosterId, Season};
use crate::sleeper::types::{
    BracketMatch, LeagueMetadata, LeagueSettings, RawMatchup, RawRoster, RawUser, SeasonRecords,
    UserMetadata,
};

pub fn matchup(week: u16, team1: u32, score1: f64, team2: Option<(u32, f64)>) -> RawMatchup {
    RawMatchup {
        week: Some(week),
        team1_roster_id: Some(RosterId::new(team1)),
        team1_score: Some(score1),
        team2_roster_id: team2.map(|(id, _)| RosterId::new(id)),
        team2_score: team2.map(|(_, s)| s),
    }
}

pub fn owner(roster: u32) -> OwnerId {
    OwnerId::new(format!("owner{}", roster))
}

/// Rosters `1..=roster_count`, each owned by `owner{n}` named `Team {n}`.
pub fn season_records(
    year: u16,
    roster_count: u32,
    playoff_week_start: u16,
    matchups: Vec<RawMatchup>,
) -> SeasonRecords {
    SeasonRecords {
        season: Season::new(year),
        metadata: Some(LeagueMetadata {
            league_id: format!("league{}", year),
            name: Some("Test League".to_string()),
            season: Season::new(year),
            previous_league_id: None,
            status: Some("complete".to_string()),
            settings: LeagueSettings {
                playoff_week_start: Some(playoff_week_start),
                playoff_teams: Some(6),
                num_teams: Some(roster_count as u16),
            },
        }),
        rosters: (1..=roster_count)
            .map(|n| RawRoster {
                roster_id: RosterId::new(n),
                owner_id: Some(owner(n)),
            })
            .collect(),
        users: (1..=roster_count)
            .map(|n| RawUser {
                user_id: owner(n),
                display_name: Some(format!("user{}", n)),
                metadata: Some(UserMetadata {
                    team_name: Some(format!("Team {}", n)),
                }),
            })
            .collect(),
        matchups,
        winners_bracket: Vec::new(),
        losers_bracket: Vec::new(),
    }
}

pub fn bracket_match(
    round: u32,
    slot: u32,
    winner: Option<u32>,
    loser: Option<u32>,
    placement: Option<u32>,
) -> BracketMatch {
    BracketMatch {
        round,
        match_slot: slot,
        team1: winner.map(RosterId::new),
        team2: loser.map(RosterId::new),
        winner: winner.map(RosterId::new),
        loser: loser.map(RosterId::new),
        placement,
        bye_teams: Vec::new(),
    }
}

/// Round-robin-ish schedule: every week pairs roster `i` with `i + week`
/// (mod n) and each roster scores `base[roster] + week`.
///
/// `roster_count` must be even.
pub fn rotating_schedule(weeks: u16, base: &[f64]) -> Vec<RawMatchup> {
    let n = base.len() as u32;
    let mut rows = Vec::new();
    for week in 1..=weeks {
        let mut paired = vec![false; n as usize];
        let shift = (week as u32 - 1) % (n - 1) + 1;
        for i in 0..n {
            if paired[i as usize] {
                continue;
            }
            let mut j = (i + shift) % n;
            while paired[j as usize] || j == i {
                j = (j + 1) % n;
            }
            paired[i as usize] = true;
            paired[j as usize] = true;
            rows.push(matchup(
                week,
                i + 1,
                base[i as usize] + week as f64,
                Some((j + 1, base[j as usize] + week as f64)),
            ));
        }
    }
    rows
}
