//! Display names for owners.

use crate::cli::types::{OwnerId, Season};

pub const UNKNOWN_TEAM: &str = "Unknown Team";

/// Turns an owner into a display string, never a raw id.
///
/// `season = None` asks for the most recent name.
pub trait TeamNameResolver: Sync {
    fn team_name(&self, owner: &OwnerId, season: Option<Season>) -> String;
}

impl<F> TeamNameResolver for F
where
    F: Fn(&OwnerId, Option<Season>) -> String + Sync,
{
    fn team_name(&self, owner: &OwnerId, season: Option<Season>) -> String {
        self(owner, season)
    }
}
