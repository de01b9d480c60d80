//! Analytics engine.
//!
//! Pure, synchronous computations over a [`LeagueHistory`](crate::sleeper::types::LeagueHistory):
//! - `normalize`: raw records to dense per-week tables
//! - `status`: season completeness from the winners bracket
//! - `seasonal`: per-roster season metrics, DPR and awards
//! - `bracket`: final ranks from playoff brackets
//! - `career`: per-owner aggregates and milestones
//! - `power`: Elo, momentum and composite power scores
//! - `win_prob`: matchup win probability
//! - `markets`: moneyline, spread and total
//! - `simulate`: Monte Carlo playoff and title odds
//! - `league`: the pipeline tying them together, plus the odds engine

pub mod bracket;
pub mod career;
pub mod hash;
pub mod league;
pub mod markets;
pub mod names;
pub mod normalize;
pub mod power;
pub mod seasonal;
pub mod simulate;
pub mod status;
pub mod win_prob;

#[cfg(test)]
pub(crate) mod test_support;

pub use league::{analyze_league, LeagueAnalysis, MatchupQuote, OddsEngine, SeasonAnalysis};
pub use names::{TeamNameResolver, UNKNOWN_TEAM};
pub use status::SeasonStatus;
