use crate::cli::types::{OwnerId, RosterId, Season};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;


/// Number or numeric string → `Some(f64)`; anything else → `None`.
///
/// The normalizer drops rows carrying `None`, so a bad cell never turns into
/// a silent zero.
fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&raw))
}

fn de_lenient_week<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&raw)
        .filter(|w| *w >= 1.0 && w.fract() == 0.0 && *w <= u16::MAX as f64)
        .map(|w| w as u16))
}

/// Bracket sides arrive as a roster id, `null`, or a `{"w": 1}` reference to
/// an unplayed feeder match; only a concrete id resolves.
fn de_lenient_roster<'de, D>(deserializer: D) -> Result<Option<RosterId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&raw)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
        .map(|v| RosterId(v as u32)))
}

/// `null`-tolerant vector: Sleeper sends `null` for empty lists.
fn de_null_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeagueSettings {
    #[serde(default)]
    pub playoff_week_start: Option<u16>,
    #[serde(default)]
    pub playoff_teams: Option<u16>,
    #[serde(default)]
    pub num_teams: Option<u16>,
}

/// League object from `/league/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeagueMetadata {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub season: Season,
    #[serde(default)]
    pub previous_league_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub settings: LeagueSettings,
}

impl LeagueMetadata {
    /// Sleeper uses `"0"` as well as `null` for "no previous league".
    pub fn previous_league(&self) -> Option<&str> {
        self.previous_league_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != "0")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRoster {
    pub roster_id: RosterId,
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawUser {
    pub user_id: OwnerId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<UserMetadata>,
}

impl RawUser {
    /// Custom team name when set, else the account display name.
    pub fn team_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.team_name.as_deref())
            .or(self.display_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// One head-to-head pairing in the engine's input form.
///
/// `team2_roster_id == None` marks a bye for team 1. `week` and the scores
/// are `None` when the source cell could not be parsed as a number.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMatchup {
    #[serde(default, deserialize_with = "de_lenient_week")]
    pub week: Option<u16>,
    #[serde(default, deserialize_with = "de_lenient_roster")]
    pub team1_roster_id: Option<RosterId>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub team1_score: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_roster")]
    pub team2_roster_id: Option<RosterId>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub team2_score: Option<f64>,
}

/// Sleeper's per-roster matchup entry from `/league/{id}/matchups/{week}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SleeperMatchupEntry {
    pub roster_id: RosterId,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub points: Option<f64>,
}

/// Fold Sleeper's per-roster entries for one week into head-to-head pairs.
///
/// Entries sharing a `matchup_id` face each other; an entry without one (or
/// alone in its group) is a bye.
pub fn pair_matchup_entries(week: u16, entries: &[SleeperMatchupEntry]) -> Vec<RawMatchup> {
    let mut groups: BTreeMap<u32, Vec<&SleeperMatchupEntry>> = BTreeMap::new();
    let mut byes = Vec::new();

    for entry in entries {
        match entry.matchup_id {
            Some(id) => groups.entry(id).or_default().push(entry),
            None => byes.push(entry),
        }
    }

    let mut pairs = Vec::new();
    for (_, group) in groups {
        match group.as_slice() {
            [a, b] => pairs.push(RawMatchup {
                week: Some(week),
                team1_roster_id: Some(a.roster_id),
                team1_score: a.points,
                team2_roster_id: Some(b.roster_id),
                team2_score: b.points,
            }),
            others => byes.extend(others.iter().copied()),
        }
    }

    for entry in byes {
        pairs.push(RawMatchup {
            week: Some(week),
            team1_roster_id: Some(entry.roster_id),
            team1_score: entry.points,
            team2_roster_id: None,
            team2_score: None,
        });
    }

    pairs
}

/// A single playoff bracket node as served by `/winners_bracket`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BracketMatch {
    #[serde(rename = "r")]
    pub round: u32,
    #[serde(rename = "m")]
    pub match_slot: u32,
    #[serde(rename = "t1", default, deserialize_with = "de_lenient_roster")]
    pub team1: Option<RosterId>,
    #[serde(rename = "t2", default, deserialize_with = "de_lenient_roster")]
    pub team2: Option<RosterId>,
    #[serde(rename = "w", default, deserialize_with = "de_lenient_roster")]
    pub winner: Option<RosterId>,
    #[serde(rename = "l", default, deserialize_with = "de_lenient_roster")]
    pub loser: Option<RosterId>,
    /// Placement decided by this game: 1 = title, 3 = third place, …
    #[serde(rename = "p", default)]
    pub placement: Option<u32>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub bye_teams: Vec<RosterId>,
}

impl BracketMatch {
    /// Both the winner and the loser are recorded.
    pub fn is_resolved(&self) -> bool {
        matches!((self.winner, self.loser), (Some(w), Some(l)) if w != l)
    }

    /// Every roster this node mentions.
    pub fn participants(&self) -> impl Iterator<Item = RosterId> + '_ {
        [self.team1, self.team2, self.winner, self.loser]
            .into_iter()
            .flatten()
            .chain(self.bye_teams.iter().copied())
    }
}

/// Everything fetched for one season.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeasonRecords {
    pub season: Season,
    #[serde(default)]
    pub metadata: Option<LeagueMetadata>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub rosters: Vec<RawRoster>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub users: Vec<RawUser>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub matchups: Vec<RawMatchup>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub winners_bracket: Vec<BracketMatch>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub losers_bracket: Vec<BracketMatch>,
}

/// All seasons of one league lineage, oldest first.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeagueHistory {
    #[serde(default)]
    pub league_id: Option<String>,
    #[serde(default, deserialize_with = "de_null_vec")]
    pub seasons: Vec<SeasonRecords>,
}

impl LeagueHistory {
    pub fn season(&self, season: Season) -> Option<&SeasonRecords> {
        self.seasons.iter().find(|s| s.season == season)
    }

    /// Most recent season present in the history.
    pub fn latest_season(&self) -> Option<Season> {
        self.seasons.iter().map(|s| s.season).max()
    }

    /// Keep seasons sorted and unique (later entries win).
    pub fn normalize_order(&mut self) {
        let mut by_season: BTreeMap<Season, SeasonRecords> = BTreeMap::new();
        for records in self.seasons.drain(..) {
            by_season.insert(records.season, records);
        }
        self.seasons = by_season.into_values().collect();
    }
}

/// `/state/nfl`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NflState {
    pub season: Season,
    pub week: u16,
    #[serde(default)]
    pub season_type: Option<String>,
}
