//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use types::{LeagueId, Season, Week};

use crate::engine::simulate::TrialPreset;

/// Where league history comes from; shared by every command.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// League ID (or set `LEAGUE_METRICS_LEAGUE_ID` env var).
    #[clap(long, short, global = true)]
    pub league_id: Option<LeagueId>,

    /// Read league history from a local JSON file instead of Sleeper.
    #[clap(long, global = true)]
    pub history_file: Option<PathBuf>,

    /// Force refresh from Sleeper, overwriting the cache.
    #[clap(long, global = true)]
    pub refresh: bool,
}

/// Simulation size presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    Preview,
    Standard,
    Precision,
}

impl From<PresetArg> for TrialPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Preview => TrialPreset::Preview,
            PresetArg::Standard => TrialPreset::Standard,
            PresetArg::Precision => TrialPreset::Precision,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(
    name = "league-metrics",
    about = "Fantasy league analytics, power ratings and odds from Sleeper history"
)]
pub struct LeagueMetrics {
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Debug logging on stderr (`RUST_LOG` overrides).
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch league history from Sleeper into the local cache
    Fetch,

    /// Seasonal metrics, awards and final ranks
    Seasons {
        /// Only this season (e.g. 2024).
        #[clap(long, short)]
        season: Option<Season>,

        /// Output as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Career metrics and milestones per owner
    Career {
        /// Output as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Moneyline, spread and total for every matchup of a week
    Odds {
        /// Season year; defaults to the latest in the history.
        #[clap(long, short)]
        season: Option<Season>,

        /// Week to price.
        #[clap(long, short)]
        week: Week,

        /// Output as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Playoff and championship futures by Monte Carlo simulation
    Simulate {
        /// Season year; defaults to the latest in the history.
        #[clap(long, short)]
        season: Option<Season>,

        /// Current week; results from this week on count as unplayed.
        #[clap(long, short)]
        week: Option<Week>,

        /// Explicit trial count (overrides `--preset`).
        #[clap(long, short)]
        trials: Option<usize>,

        /// Trial count preset.
        #[clap(long, value_enum, default_value = "standard")]
        preset: PresetArg,

        /// Seed for reproducible runs.
        #[clap(long)]
        seed: Option<u64>,

        /// Output as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },
}
