//! Shared setup for commands: history loading, config and analysis.

use std::path::PathBuf;
use tracing::{debug, warn};

use crate::{
    cli::{types::CurrentPeriod, SourceArgs},
    core::config::EngineConfig,
    engine::{analyze_league, LeagueAnalysis},
    error::LeagueError,
    sleeper::{load_history_file, load_or_fetch_history, types::LeagueHistory, SleeperClient, UserDirectory},
    LeagueId, Result, Season, Week,
};

use super::resolve_league_id;

/// Where to read league history from.
#[derive(Debug, Clone, Default)]
pub struct HistorySource {
    pub league_id: Option<LeagueId>,
    pub history_file: Option<PathBuf>,
    pub refresh: bool,
}

impl From<&SourceArgs> for HistorySource {
    fn from(args: &SourceArgs) -> Self {
        Self {
            league_id: args.league_id,
            history_file: args.history_file.clone(),
            refresh: args.refresh,
        }
    }
}

/// Context containing common resources needed by most commands
pub struct CommandContext {
    pub history: LeagueHistory,
    pub config: EngineConfig,
    pub names: UserDirectory,
    /// `None` treats every season as fully played.
    pub current: Option<CurrentPeriod>,
    client: Option<SleeperClient>,
}

impl CommandContext {
    /// Load config and history from `source`.
    pub async fn load(source: &HistorySource, verbose: bool) -> Result<Self> {
        let config = EngineConfig::load()?;

        let (history, client) = match &source.history_file {
            Some(path) => {
                if verbose {
                    println!("Reading league history from {}...", path.display());
                }
                (load_history_file(path)?, None)
            }
            None => {
                let league_id = resolve_league_id(source.league_id)?;
                if verbose {
                    println!("Loading league history (cached if available)...");
                }
                let client = SleeperClient::new();
                let history = load_or_fetch_history(&client, league_id, source.refresh).await?;
                (history, Some(client))
            }
        };

        if history.seasons.is_empty() {
            return Err(LeagueError::NoData);
        }
        debug!("History holds {} seasons", history.seasons.len());

        Ok(Self::from_history(history, config, client))
    }

    pub fn from_history(
        history: LeagueHistory,
        config: EngineConfig,
        client: Option<SleeperClient>,
    ) -> Self {
        let names = UserDirectory::from_history(&history);
        Self {
            history,
            config,
            names,
            current: None,
            client,
        }
    }

    /// Resolve "now": the live NFL state when the history came from
    /// Sleeper, capped at `week` of `season` when a week is given.
    ///
    /// A failed lookup is logged; with no state and no week, unplayed weeks
    /// are told apart by their missing scores alone.
    pub async fn set_current(&mut self, season: Season, week: Option<Week>) {
        let live = match &self.client {
            Some(client) => match client.get_nfl_state().await {
                Ok(state) => Some(CurrentPeriod::new(state.season, Week::new(state.week))),
                Err(e) => {
                    warn!("Could not read the NFL state: {}", e);
                    None
                }
            },
            None => None,
        };
        let asked = week.map(|week| CurrentPeriod::new(season, week));

        self.current = match (live, asked) {
            (Some(live), Some(asked)) => Some(live.min(asked)),
            (live, asked) => asked.or(live),
        };
        if let Some(now) = self.current {
            debug!("Current period: {} week {}", now.season, now.week);
        }
    }

    /// Resolve "now" against the latest season in the history.
    pub async fn set_current_latest(&mut self) -> Result<()> {
        let latest = self.season_or_latest(None)?;
        self.set_current(latest, None).await;
        Ok(())
    }

    /// The requested season, else the latest one in the history.
    pub fn season_or_latest(&self, season: Option<Season>) -> Result<Season> {
        season
            .or_else(|| self.history.latest_season())
            .ok_or(LeagueError::NoData)
    }

    pub fn analyze(&self) -> LeagueAnalysis {
        let analysis = analyze_league(&self.history, self.current, &self.config, &self.names);
        for (season, reason) in &analysis.skipped {
            println!("⚠ Season {} skipped: {}", season, reason);
        }
        analysis
    }
}

/// Pretty JSON for `--json` output.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// `+150` / `-120` style odds.
pub fn format_odds(odds: i32) -> String {
    if odds > 0 {
        format!("+{}", odds)
    } else {
        odds.to_string()
    }
}

/// Team names longer than the column are cut with an ellipsis.
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let cut: String = name.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
