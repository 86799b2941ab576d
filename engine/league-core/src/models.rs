use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// Supported league data providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Espn,
    Sleeper,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Espn => "espn",
            Provider::Sleeper => "sleeper",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the configured league list.
///
/// The `type` field is kept as the raw string so that an unknown provider
/// parses fine and only fails for the jobs that actually need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueDescriptor {
    pub id: String,

    #[serde(rename = "type")]
    pub league_type: String,

    /// Chat channel to notify, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl LeagueDescriptor {
    /// Resolve the provider for this league
    pub fn provider(&self) -> Result<Provider> {
        match self.league_type.as_str() {
            "espn" => Ok(Provider::Espn),
            "sleeper" => Ok(Provider::Sleeper),
            other => Err(CoreError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Raw per-category stat counts for one player in one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatLine {
    pub player_id: String,
    pub game_id: String,
    pub stats: HashMap<String, f64>,
}

/// Points awarded per unit of each stat category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringRules(pub HashMap<String, f64>);

impl ScoringRules {
    pub fn new(rules: HashMap<String, f64>) -> Self {
        Self(rules)
    }

    /// Weighted sum over categories present in both the stat line and the rules
    pub fn score(&self, stats: &HashMap<String, f64>) -> f64 {
        stats
            .iter()
            .filter_map(|(category, count)| self.0.get(category).map(|points| count * points))
            .sum()
    }
}

/// One point-in-time projection for a team in a matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProjection {
    /// Unix seconds
    pub timestamp: i64,

    /// ESPN team id or Sleeper roster id
    #[serde(alias = "roster_id")]
    pub team_id: u32,

    pub matchup_id: u32,

    pub projection: f64,
}

/// All projection snapshots recorded for one league week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekProjections {
    pub league_id: String,
    pub season: String,
    pub week: u32,
    #[serde(default)]
    pub projections: Vec<TeamProjection>,
}

impl WeekProjections {
    pub fn empty(league_id: impl Into<String>, season: impl Into<String>, week: u32) -> Self {
        Self { league_id: league_id.into(), season: season.into(), week, projections: Vec::new() }
    }

    /// Next version of the record with a fresh snapshot appended
    pub fn with_snapshot(mut self, snapshot: impl IntoIterator<Item = TeamProjection>) -> Self {
        self.projections.extend(snapshot);
        self
    }
}

/// Player referenced by an activity action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPlayer {
    pub name: String,

    /// Pro team abbreviation
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAction {
    /// Fantasy team name
    pub team: String,

    /// e.g. "FA ADDED", "DROPPED"
    pub action: String,

    pub player: ActivityPlayer,
}

/// A league transaction, ordered by its timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Epoch milliseconds
    #[serde(rename = "date")]
    pub timestamp: i64,

    pub actions: Vec<ActivityAction>,
}

/// Stored recent-activity blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDocument {
    /// Sorted newest first
    pub activity: Vec<ActivityEvent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// Published power rankings blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRankingDocument {
    pub power: Vec<PowerEntry>,
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerEntry {
    /// Two-decimal power score
    pub power: String,
    pub team: String,
}
