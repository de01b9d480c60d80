//! League Metrics Library
//!
//! Fantasy-football league analytics over the full history of a Sleeper
//! league: seasonal and career metrics, playoff ranks, power ratings, matchup
//! odds and Monte Carlo playoff futures.
//!
//! ## Features
//!
//! - **Record Normalization**: Dense per-week tables from raw matchups, byes included
//! - **Seasonal Metrics**: DPR, all-play records, luck, blowouts and awards
//! - **Playoff Ranks**: Final standings from winners and losers brackets
//! - **Career Aggregates**: Lifetime totals per owner plus milestone timelines
//! - **Power Ratings**: Elo, momentum and a composite 0-100 power score
//! - **Betting Markets**: Moneyline, spread and total with vig, kept consistent
//! - **Playoff Simulation**: Parallel, seedable Monte Carlo futures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use league_metrics::{
//!     core::config::EngineConfig,
//!     engine::{analyze_league, OddsEngine},
//!     sleeper::{load_history_file, UserDirectory},
//!     Season, Week,
//! };
//!
//! # fn example() -> league_metrics::Result<()> {
//! let history = load_history_file(std::path::Path::new("history.json"))?;
//! let config = EngineConfig::default();
//! let names = UserDirectory::from_history(&history);
//!
//! let analysis = analyze_league(&history, None, &config, &names);
//! let engine = OddsEngine::new(config);
//! for quote in engine.odds_board(&analysis, Season::new(2024), Week::new(5))? {
//!     println!("{} vs {}: {}", quote.name_a, quote.name_b, quote.quote.moneyline_a);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Set your Sleeper league ID to avoid passing it in every command:
//! ```bash
//! export LEAGUE_METRICS_LEAGUE_ID=1048227123456789504
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod engine;
pub mod error;
pub mod sleeper;

// Re-export commonly used types
pub use cli::types::{CurrentPeriod, LeagueId, OwnerId, RosterId, Season, Week};
pub use error::{LeagueError, Result};
pub use sleeper::types::LeagueHistory;

pub const LEAGUE_ID_ENV_VAR: &str = "LEAGUE_METRICS_LEAGUE_ID";
