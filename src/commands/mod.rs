//! Command implementations for the league metrics CLI

pub mod career;
pub mod common;
pub mod fetch;
pub mod odds;
pub mod seasons;
pub mod simulate;

use crate::{error::LeagueError, LeagueId, Result, LEAGUE_ID_ENV_VAR};

#[cfg(test)]
mod tests;

/// The explicit league id, else the env var.
pub(crate) fn resolve_league_id(league_id: Option<LeagueId>) -> Result<LeagueId> {
    league_id
        .or_else(|| {
            std::env::var(LEAGUE_ID_ENV_VAR)
                .ok()
                .and_then(|s| s.parse::<LeagueId>().ok())
        })
        .ok_or_else(|| LeagueError::MissingLeagueId {
            env_var: LEAGUE_ID_ENV_VAR.to_string(),
        })
}
