//! Type-safe wrappers for league, roster, owner and calendar identifiers.

pub mod ids;
pub mod time;

pub use ids::{LeagueId, OwnerId, RosterId};
pub use time::{CurrentPeriod, Season, Week};
