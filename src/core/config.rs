//! Engine tuning knobs, loaded from an optional JSON file.
//!
//! Lookup order: `$LEAGUE_METRICS_CONFIG`, then
//! `<config_dir>/league-metrics/config.json`. A missing file means defaults;
//! every field is optional inside the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::cache::try_read_to_string;
use crate::error::{LeagueError, Result};

pub const CONFIG_PATH_ENV_VAR: &str = "LEAGUE_METRICS_CONFIG";

/// Ordering used for bracket participants no game or fallback rule placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BracketFallback {
    /// Ascending roster id. Arbitrary, but stable and deterministic.
    #[default]
    RosterIdAscending,
    /// Regular-season points for, highest first.
    PointsDescending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    pub initial_rating: f64,
    pub k_factor: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            k_factor: 32.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub window: usize,
    pub decay: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window: 6,
            decay: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Bookmaker margin applied to both sides of every market.
    pub vig: f64,
    /// Max distance, in American-odds cents, before the spread line overrides.
    pub moneyline_tolerance_cents: i32,
    /// Max implied-probability gap before the spread line overrides.
    pub moneyline_tolerance_probability: f64,
    /// Asymptote of the soft spread cap.
    pub spread_soft_cap: f64,
    pub total_min: f64,
    pub total_max: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            vig: 0.045,
            moneyline_tolerance_cents: 50,
            moneyline_tolerance_probability: 0.05,
            spread_soft_cap: 45.0,
            total_min: 150.0,
            total_max: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seeds awarded by record.
    pub division_seeds: usize,
    /// Seeds awarded by points among everyone else.
    pub wildcard_seeds: usize,
    pub preview_trials: usize,
    pub standard_trials: usize,
    pub precision_trials: usize,
    pub max_trials: usize,
    /// Per-week performance swing, as a fraction of team strength.
    pub weekly_variance: f64,
    /// Strength drift applied to each side after a simulated result.
    pub strength_drift: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            division_seeds: 4,
            wildcard_seeds: 2,
            preview_trials: 250,
            standard_trials: 1000,
            precision_trials: 3000,
            max_trials: 20_000,
            weekly_variance: 0.125,
            strength_drift: 0.02,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneConfig {
    pub wins_step: u32,
    pub points_step: f64,
}

impl Default for MilestoneConfig {
    fn default() -> Self {
        Self {
            wins_step: 25,
            points_step: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Used when league metadata omits `playoff_week_start`.
    pub default_playoff_week_start: u16,
    pub memo_ttl_secs: u64,
    pub memo_capacity: usize,
    pub bracket_fallback: BracketFallback,
    pub elo: EloConfig,
    pub momentum: MomentumConfig,
    pub markets: MarketConfig,
    pub simulation: SimulationConfig,
    pub milestones: MilestoneConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_playoff_week_start: 15,
            memo_ttl_secs: 30,
            memo_capacity: 64,
            bracket_fallback: BracketFallback::default(),
            elo: EloConfig::default(),
            momentum: MomentumConfig::default(),
            markets: MarketConfig::default(),
            simulation: SimulationConfig::default(),
            milestones: MilestoneConfig::default(),
        }
    }
}

/// Path: ~/.config/league-metrics/config.json
pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".config");
        home
    });
    base.join("league-metrics").join("config.json")
}

impl EngineConfig {
    /// Parse a config document; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(raw).map_err(|e| LeagueError::Config {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        match try_read_to_string(path) {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }

    /// Load from the env-var path or the default config location.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        Self::load_from(&path)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(LeagueError::Config {
                message: message.to_string(),
            })
        };

        if !(0.0..0.5).contains(&self.markets.vig) {
            return invalid("markets.vig must be in [0, 0.5)");
        }
        if self.markets.total_min >= self.markets.total_max {
            return invalid("markets.total_min must be below markets.total_max");
        }
        if self.markets.spread_soft_cap <= 0.0 {
            return invalid("markets.spread_soft_cap must be positive");
        }
        if self.momentum.window == 0 {
            return invalid("momentum.window must be at least 1");
        }
        if self.simulation.division_seeds == 0 {
            return invalid("simulation.division_seeds must be at least 1");
        }
        if self.milestones.wins_step == 0 || self.milestones.points_step <= 0.0 {
            return invalid("milestone steps must be positive");
        }
        Ok(())
    }
}
