//! Sleeper public API client.
//!
//! Sleeper's read API needs no authentication. Every call is a plain GET
//! returning JSON; unknown leagues come back as `null`.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{
    error::{LeagueError, Result},
    sleeper::types::{
        pair_matchup_entries, BracketMatch, LeagueHistory, LeagueMetadata, NflState, RawRoster,
        RawUser, SeasonRecords, SleeperMatchupEntry,
    },
};

#[cfg(test)]
mod tests;

/// Base path for Sleeper v1 API.
pub const SLEEPER_BASE_URL: &str = "https://api.sleeper.app/v1";

/// Matchup weeks fetched when a league has no bracket yet.
const FALLBACK_SEASON_WEEKS: u16 = 17;

/// Upper bound on `previous_league_id` hops, guarding against cycles.
const MAX_LINEAGE_DEPTH: usize = 30;

#[derive(Debug, Clone)]
pub struct SleeperClient {
    client: Client,
    base_url: String,
}

impl Default for SleeperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SleeperClient {
    pub fn new() -> Self {
        Self::with_base_url(SLEEPER_BASE_URL)
    }

    /// Point the client at another host (tests use a mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let res = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;

        Ok(res)
    }

    pub async fn get_league(&self, league_id: &str) -> Result<LeagueMetadata> {
        self.get_json::<Option<LeagueMetadata>>(&format!("/league/{}", league_id))
            .await?
            .ok_or(LeagueError::NoData)
    }

    pub async fn get_rosters(&self, league_id: &str) -> Result<Vec<RawRoster>> {
        Ok(self
            .get_json::<Option<Vec<RawRoster>>>(&format!("/league/{}/rosters", league_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_users(&self, league_id: &str) -> Result<Vec<RawUser>> {
        Ok(self
            .get_json::<Option<Vec<RawUser>>>(&format!("/league/{}/users", league_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_matchups(&self, league_id: &str, week: u16) -> Result<Vec<SleeperMatchupEntry>> {
        Ok(self
            .get_json::<Option<Vec<SleeperMatchupEntry>>>(&format!(
                "/league/{}/matchups/{}",
                league_id, week
            ))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_winners_bracket(&self, league_id: &str) -> Result<Vec<BracketMatch>> {
        Ok(self
            .get_json::<Option<Vec<BracketMatch>>>(&format!("/league/{}/winners_bracket", league_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_losers_bracket(&self, league_id: &str) -> Result<Vec<BracketMatch>> {
        Ok(self
            .get_json::<Option<Vec<BracketMatch>>>(&format!("/league/{}/losers_bracket", league_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_nfl_state(&self) -> Result<NflState> {
        self.get_json("/state/nfl").await
    }

    /// Fetch every record set for one league-season.
    pub async fn fetch_season(&self, league_id: &str) -> Result<SeasonRecords> {
        let metadata = self.get_league(league_id).await?;
        let rosters = self.get_rosters(league_id).await?;
        let users = self.get_users(league_id).await?;
        let winners_bracket = self.get_winners_bracket(league_id).await?;
        let losers_bracket = self.get_losers_bracket(league_id).await?;

        let max_round = winners_bracket
            .iter()
            .chain(losers_bracket.iter())
            .map(|m| m.round as u16)
            .max();
        let last_week = match (metadata.settings.playoff_week_start, max_round) {
            (Some(start), Some(rounds)) => start.saturating_sub(1) + rounds,
            _ => FALLBACK_SEASON_WEEKS,
        };

        let mut matchups = Vec::new();
        for week in 1..=last_week {
            let entries = self.get_matchups(league_id, week).await?;
            matchups.extend(pair_matchup_entries(week, &entries));
        }

        info!(
            "Fetched season {} of league {} ({} weeks, {} rosters)",
            metadata.season,
            league_id,
            last_week,
            rosters.len()
        );

        Ok(SeasonRecords {
            season: metadata.season,
            metadata: Some(metadata),
            rosters,
            users,
            matchups,
            winners_bracket,
            losers_bracket,
        })
    }

    /// Fetch the league and every predecessor reachable via `previous_league_id`.
    pub async fn fetch_history(&self, league_id: &str) -> Result<LeagueHistory> {
        let mut history = LeagueHistory {
            league_id: Some(league_id.to_string()),
            seasons: Vec::new(),
        };

        let mut next = Some(league_id.to_string());
        let mut visited = Vec::new();
        while let Some(id) = next.take() {
            if visited.contains(&id) || visited.len() >= MAX_LINEAGE_DEPTH {
                break;
            }
            let records = self.fetch_season(&id).await?;
            next = records
                .metadata
                .as_ref()
                .and_then(|m| m.previous_league())
                .map(str::to_string);
            visited.push(id);
            history.seasons.push(records);
        }

        history.normalize_order();
        Ok(history)
    }
}
