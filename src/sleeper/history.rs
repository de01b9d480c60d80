// src/sleeper/history.rs
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::{history_path, try_read_to_string, write_string};
use crate::engine::names::{TeamNameResolver, UNKNOWN_TEAM};
use crate::sleeper::{http::SleeperClient, types::LeagueHistory};
use crate::{
    cli::types::{LeagueId, OwnerId, Season},
    Result,
};

/// Read a history file (the cached fetch or an exported feed).
pub fn load_history_file(path: &Path) -> Result<LeagueHistory> {
    let raw = std::fs::read_to_string(path)?;
    let mut history: LeagueHistory = serde_json::from_str(&raw)?;
    history.normalize_order();
    Ok(history)
}

/// Write `history` as pretty JSON, creating parent directories.
pub fn save_history(path: &Path, history: &LeagueHistory) -> Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    write_string(path, &json)?;
    Ok(())
}

/// Load the cached history for `league_id`, or fetch and cache it when the
/// cache is missing, unreadable or `refresh` is set.
pub async fn load_or_fetch_history(
    client: &SleeperClient,
    league_id: LeagueId,
    refresh: bool,
) -> Result<LeagueHistory> {
    load_or_fetch_history_at(client, league_id, &history_path(league_id), refresh).await
}

pub async fn load_or_fetch_history_at(
    client: &SleeperClient,
    league_id: LeagueId,
    path: &Path,
    refresh: bool,
) -> Result<LeagueHistory> {
    if !refresh {
        if let Some(raw) = try_read_to_string(path) {
            match serde_json::from_str::<LeagueHistory>(&raw) {
                Ok(mut history) => {
                    debug!("Loaded cached history from {}", path.display());
                    history.normalize_order();
                    return Ok(history);
                }
                Err(e) => warn!("Ignoring unreadable cache {}: {}", path.display(), e),
            }
        }
    }

    let history = client.fetch_history(&league_id.to_string()).await?;
    if let Err(e) = save_history(path, &history) {
        warn!("Could not write cache {}: {}", path.display(), e);
    } else {
        info!(
            "Cached {} seasons of league {} at {}",
            history.seasons.len(),
            league_id,
            path.display()
        );
    }
    Ok(history)
}

/// Team names from the users fetched with each season.
///
/// Custom `metadata.team_name` first, then `display_name`. An owner absent
/// from the asked season falls back to their most recent name.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_season: BTreeMap<Season, BTreeMap<OwnerId, String>>,
}

impl UserDirectory {
    pub fn from_history(history: &LeagueHistory) -> Self {
        let by_season = history
            .seasons
            .iter()
            .map(|records| {
                let names = records
                    .users
                    .iter()
                    .filter_map(|u| u.team_name().map(|n| (u.user_id.clone(), n.to_string())))
                    .collect();
                (records.season, names)
            })
            .collect();
        Self { by_season }
    }

    fn latest(&self, owner: &OwnerId) -> Option<&String> {
        self.by_season.values().rev().find_map(|names| names.get(owner))
    }
}

impl TeamNameResolver for UserDirectory {
    fn team_name(&self, owner: &OwnerId, season: Option<Season>) -> String {
        season
            .and_then(|s| self.by_season.get(&s))
            .and_then(|names| names.get(owner))
            .or_else(|| self.latest(owner))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
    }
}
