//! Time-related types for fantasy seasons and weeks.

use crate::error::{LeagueError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for Season years
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Season(pub u16);

impl Season {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// The season before this one.
    pub fn previous(&self) -> Season {
        Season(self.0.saturating_sub(1))
    }
}

impl Default for Season {
    fn default() -> Self {
        Self(2025)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Season {
    type Err = LeagueError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Sleeper serves `"season": "2023"`, history files usually carry a number.
impl<'de> Deserialize<'de> for Season {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(Season(n)),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(Season)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Type-safe wrapper for Week numbers (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Week(pub u16);

impl Week {
    pub fn new(week: u16) -> Self {
        Self(week)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Week {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Week {
    type Err = LeagueError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The league's "now": used to tell played weeks from scheduled ones.
///
/// Ordered by season, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrentPeriod {
    pub season: Season,
    pub week: Week,
}

impl CurrentPeriod {
    pub fn new(season: Season, week: Week) -> Self {
        Self { season, week }
    }

    /// Last week of `season` whose results count as final.
    ///
    /// Past seasons are fully played; the current season is played through
    /// the week before the current one; future seasons have nothing played.
    pub fn last_completed_week(&self, season: Season) -> Option<u16> {
        if season < self.season {
            None
        } else if season == self.season {
            Some(self.week.as_u16().saturating_sub(1))
        } else {
            Some(0)
        }
    }
}
