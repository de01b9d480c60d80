//! Error types for the league metrics engine and CLI

use thiserror::Error;

use crate::cli::types::Season;


pub type Result<T> = std::result::Result<T, LeagueError>;

#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("League ID not provided and {env_var} environment variable not set")]
    MissingLeagueId { env_var: String },

    #[error("Failed to parse identifier: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// A season lacks one of its required record sets; the season is skipped.
    #[error("Season {season} is missing {what}")]
    MissingData { season: Season, what: String },

    /// A single matchup row could not be parsed; the row is dropped.
    #[error("Malformed record in season {season}: {reason}")]
    MalformedRecord { season: Season, reason: String },

    /// Spread- and probability-derived moneylines disagree beyond tolerance.
    #[error("Moneyline {from_probability} disagrees with spread-derived {from_spread}")]
    InconsistentOdds {
        from_probability: i32,
        from_spread: i32,
    },

    /// A ratio had a zero denominator and was defined as 0.
    #[error("Degenerate input: {what}")]
    DegenerateInput { what: String },

    #[error("Sleeper API returned no data")]
    NoData,
}
