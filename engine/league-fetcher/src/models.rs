use league_core::{
    ActivityAction, ActivityEvent, ActivityPlayer, CompletedGame, GameClockState, PlayerStatLine,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Accept either a JSON string or number for id-like fields
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

// ---------------------------------------------------------------------------
// ESPN
// ---------------------------------------------------------------------------

/// League endpoint response. Which fields are present depends on the views requested.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnLeagueResponse {
    #[serde(default)]
    pub scoring_period_id: Option<u32>,

    #[serde(default)]
    pub status: Option<EspnLeagueStatus>,

    #[serde(default)]
    pub teams: Vec<EspnTeam>,

    #[serde(default)]
    pub schedule: Vec<EspnScheduleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnLeagueStatus {
    pub current_matchup_period: u32,

    #[serde(default)]
    pub final_scoring_period: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeam {
    pub id: u32,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub abbrev: Option<String>,
}

impl EspnTeam {
    /// Newer seasons carry `name`, older ones split it into location and nickname
    pub fn team_name(&self) -> String {
        if let Some(name) = self.name.as_ref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let joined = format!(
            "{} {}",
            self.location.as_deref().unwrap_or_default(),
            self.nickname.as_deref().unwrap_or_default()
        );
        let joined = joined.trim();
        if joined.is_empty() {
            self.abbrev.clone().unwrap_or_else(|| format!("Team {}", self.id))
        } else {
            joined.to_string()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnScheduleEntry {
    pub id: u32,

    pub matchup_period_id: u32,

    /// HOME, AWAY, TIE or UNDECIDED
    #[serde(default)]
    pub winner: Option<String>,

    #[serde(default)]
    pub home: Option<EspnMatchupSide>,

    /// Missing on bye weeks
    #[serde(default)]
    pub away: Option<EspnMatchupSide>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnMatchupSide {
    pub team_id: u32,

    #[serde(default)]
    pub total_points: f64,

    #[serde(default)]
    pub total_points_live: Option<f64>,

    #[serde(default)]
    pub total_projected_points_live: Option<f64>,
}

impl EspnMatchupSide {
    /// Live projected total, falling back to live then final points
    pub fn projected_total(&self) -> f64 {
        self.total_projected_points_live
            .or(self.total_points_live)
            .unwrap_or(self.total_points)
    }
}

impl EspnScheduleEntry {
    /// Convert to a finished game, if this entry has been decided and has two teams
    pub fn to_completed_game(&self) -> Option<CompletedGame> {
        let decided = matches!(self.winner.as_deref(), Some("HOME") | Some("AWAY") | Some("TIE"));
        match (decided, &self.home, &self.away) {
            (true, Some(home), Some(away)) => Some(CompletedGame {
                home_team: home.team_id,
                home_points: home.total_points,
                away_team: away.team_id,
                away_points: away.total_points,
            }),
            _ => None,
        }
    }

    /// Convert to a box score for the live projections job
    pub fn to_box_score(&self) -> Option<EspnBoxScore> {
        let home = self.home.as_ref()?;
        Some(EspnBoxScore {
            matchup_id: self.id,
            home_team: home.team_id,
            home_projected: home.projected_total(),
            away: self.away.as_ref().map(|away| (away.team_id, away.projected_total())),
        })
    }
}

/// Current-week projected totals for one ESPN matchup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EspnBoxScore {
    pub matchup_id: u32,
    pub home_team: u32,
    pub home_projected: f64,

    /// Away team id and projection, absent on a bye
    pub away: Option<(u32, f64)>,
}

/// Current position in the ESPN season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EspnLeagueState {
    pub current_week: u32,
    pub current_matchup_period: u32,
}

#[derive(Debug, Deserialize)]
pub struct EspnCommunicationResponse {
    #[serde(default)]
    pub topics: Vec<EspnTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnTopic {
    /// Epoch millis
    pub date: i64,

    #[serde(default)]
    pub messages: Vec<EspnMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnMessage {
    pub message_type_id: u32,

    #[serde(default)]
    pub target_id: Option<i64>,

    #[serde(default)]
    pub from: Option<i64>,

    #[serde(default)]
    pub to: Option<i64>,

    #[serde(rename = "for", default)]
    pub for_team: Option<i64>,
}

pub const MSG_FA_ADDED: u32 = 178;
pub const MSG_DROPPED: u32 = 179;
pub const MSG_WAIVER_ADDED: u32 = 180;
pub const MSG_DROPPED_OTHER: u32 = 181;
pub const MSG_DROPPED_FOR: u32 = 239;
pub const MSG_TRADED: u32 = 244;

/// Message types requested from the communication endpoint
pub const ACTIVITY_MESSAGE_TYPES: [u32; 6] =
    [MSG_FA_ADDED, MSG_WAIVER_ADDED, MSG_DROPPED, MSG_DROPPED_FOR, MSG_DROPPED_OTHER, MSG_TRADED];

impl EspnMessage {
    pub fn action_label(&self) -> &'static str {
        match self.message_type_id {
            MSG_FA_ADDED => "FA ADDED",
            MSG_WAIVER_ADDED => "WAIVER ADDED",
            MSG_DROPPED | MSG_DROPPED_OTHER | MSG_DROPPED_FOR => "DROPPED",
            MSG_TRADED => "TRADED",
            _ => "UNKNOWN",
        }
    }

    /// Team the action belongs to; which field holds it depends on the message type
    pub fn acting_team(&self) -> Option<i64> {
        match self.message_type_id {
            MSG_TRADED => self.from,
            MSG_DROPPED_FOR => self.for_team,
            _ => self.to,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnPlayer {
    pub id: i64,

    pub full_name: String,

    #[serde(default)]
    pub pro_team_id: u32,
}

/// ESPN pro team id to abbreviation
pub fn pro_team_abbrev(pro_team_id: u32) -> &'static str {
    match pro_team_id {
        1 => "ATL",
        2 => "BUF",
        3 => "CHI",
        4 => "CIN",
        5 => "CLE",
        6 => "DAL",
        7 => "DEN",
        8 => "DET",
        9 => "GB",
        10 => "TEN",
        11 => "IND",
        12 => "KC",
        13 => "LV",
        14 => "LAR",
        15 => "MIA",
        16 => "MIN",
        17 => "NE",
        18 => "NO",
        19 => "NYG",
        20 => "NYJ",
        21 => "PHI",
        22 => "ARI",
        23 => "PIT",
        24 => "LAC",
        25 => "SF",
        26 => "SEA",
        27 => "TB",
        28 => "WSH",
        29 => "CAR",
        30 => "JAX",
        33 => "BAL",
        34 => "HOU",
        _ => "None",
    }
}

impl EspnTopic {
    /// Convert to an activity event, resolving team and player names
    pub fn to_activity_event(
        &self,
        team_names: &HashMap<u32, String>,
        players: &HashMap<i64, EspnPlayer>,
    ) -> ActivityEvent {
        let actions = self
            .messages
            .iter()
            .map(|message| {
                let team = message
                    .acting_team()
                    .and_then(|id| u32::try_from(id).ok())
                    .and_then(|id| team_names.get(&id).cloned())
                    .unwrap_or_default();
                let player = match message.target_id.and_then(|id| players.get(&id)) {
                    Some(p) => ActivityPlayer {
                        name: p.full_name.clone(),
                        team: pro_team_abbrev(p.pro_team_id).to_string(),
                    },
                    None => ActivityPlayer { name: "Unknown".to_string(), team: "None".to_string() },
                };
                ActivityAction { team, action: message.action_label().to_string(), player }
            })
            .collect();

        ActivityEvent { timestamp: self.date, actions }
    }
}

// ---------------------------------------------------------------------------
// Sleeper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperNflState {
    pub week: u32,

    pub league_season: String,

    #[serde(default)]
    pub season_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperLeague {
    pub league_id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub season: Option<String>,

    #[serde(default)]
    pub scoring_settings: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperMatchup {
    pub roster_id: u32,

    /// Null for rosters without an opponent this week
    #[serde(default)]
    pub matchup_id: Option<u32>,

    #[serde(default)]
    pub starters: Vec<String>,

    #[serde(default)]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperUser {
    pub user_id: String,

    pub display_name: String,

    #[serde(default)]
    pub metadata: Option<SleeperUserMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleeperUserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

impl SleeperUser {
    /// Custom team name if the user set one, otherwise the display name
    pub fn team_name(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.team_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.display_name.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperRoster {
    pub roster_id: u32,

    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,

    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsBatch {
    #[serde(default)]
    pub actual: Vec<SleeperStatLine>,

    #[serde(default)]
    pub projected: Vec<SleeperStatLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperStatLine {
    #[serde(deserialize_with = "string_or_number")]
    pub player_id: String,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub game_id: Option<String>,

    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
}

impl SleeperStatLine {
    /// Keep numeric stat categories only
    pub fn to_stat_line(&self) -> PlayerStatLine {
        PlayerStatLine {
            player_id: self.player_id.clone(),
            game_id: self.game_id.clone().unwrap_or_default(),
            stats: self
                .stats
                .iter()
                .filter_map(|(category, value)| value.as_f64().map(|v| (category.clone(), v)))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoresBatch {
    #[serde(default)]
    pub scores: Vec<SleeperGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleeperGame {
    #[serde(deserialize_with = "string_or_number")]
    pub game_id: String,

    pub status: String,

    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl SleeperGame {
    /// Convert to a clock state. An in-game record without a usable quarter
    /// clock falls back to not started.
    pub fn to_clock(&self) -> GameClockState {
        match self.status.as_str() {
            "complete" => GameClockState::complete(self.game_id.clone()),
            "pre_game" => GameClockState::not_started(self.game_id.clone()),
            _ => {
                let metadata = self.metadata.as_ref();
                let quarter = metadata.and_then(|m| m.get("quarter_num")).and_then(|q| {
                    q.as_u64().or_else(|| q.as_str().and_then(|s| s.parse().ok()))
                });
                let remaining = metadata.and_then(|m| m.get("time_remaining")).and_then(|t| t.as_str());

                match (quarter, remaining) {
                    (Some(quarter), Some(remaining)) => {
                        GameClockState::from_quarter_clock(self.game_id.clone(), quarter as u32, remaining)
                            .unwrap_or_else(|e| {
                                warn!("Game {}: {}, using pre-game clock", self.game_id, e);
                                GameClockState::not_started(self.game_id.clone())
                            })
                    }
                    _ => {
                        warn!("Game {} is {} without a quarter clock, using pre-game clock", self.game_id, self.status);
                        GameClockState::not_started(self.game_id.clone())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::GameStatus;
    use serde_json::json;

    #[test]
    fn test_espn_team_name_fallbacks() {
        let named: EspnTeam = serde_json::from_value(json!({"id": 1, "name": "Taco Corp "})).unwrap();
        assert_eq!(named.team_name(), "Taco Corp");

        let split: EspnTeam =
            serde_json::from_value(json!({"id": 2, "location": "Team", "nickname": "Tacos"})).unwrap();
        assert_eq!(split.team_name(), "Team Tacos");

        let bare: EspnTeam = serde_json::from_value(json!({"id": 3, "abbrev": "TT"})).unwrap();
        assert_eq!(bare.team_name(), "TT");
    }

    #[test]
    fn test_schedule_entry_conversions() {
        let entry: EspnScheduleEntry = serde_json::from_value(json!({
            "id": 41,
            "matchupPeriodId": 5,
            "winner": "UNDECIDED",
            "home": {"teamId": 1, "totalPoints": 40.5, "totalPointsLive": 55.2, "totalProjectedPointsLive": 101.3},
            "away": {"teamId": 2, "totalPoints": 30.0}
        }))
        .unwrap();

        assert!(entry.to_completed_game().is_none());
        let box_score = entry.to_box_score().unwrap();
        assert_eq!(box_score.matchup_id, 41);
        assert_eq!(box_score.home_projected, 101.3);
        assert_eq!(box_score.away, Some((2, 30.0)));

        let decided: EspnScheduleEntry = serde_json::from_value(json!({
            "id": 1,
            "matchupPeriodId": 1,
            "winner": "AWAY",
            "home": {"teamId": 3, "totalPoints": 90.0},
            "away": {"teamId": 4, "totalPoints": 95.5}
        }))
        .unwrap();
        assert_eq!(
            decided.to_completed_game(),
            Some(CompletedGame { home_team: 3, home_points: 90.0, away_team: 4, away_points: 95.5 })
        );
    }

    #[test]
    fn test_topic_to_activity_event() {
        let topic: EspnTopic = serde_json::from_value(json!({
            "date": 1_633_024_800_000i64,
            "messages": [
                {"messageTypeId": 178, "targetId": 3116385, "to": 4, "from": -1},
                {"messageTypeId": 239, "targetId": 99, "for": 4},
                {"messageTypeId": 244, "targetId": 3116385, "from": 6, "to": 4}
            ]
        }))
        .unwrap();
        let teams = HashMap::from([(4, "Team Tacos".to_string()), (6, "Nacho Average Team".to_string())]);
        let players = HashMap::from([(
            3116385,
            EspnPlayer { id: 3116385, full_name: "Joe Mixon".to_string(), pro_team_id: 4 },
        )]);

        let event = topic.to_activity_event(&teams, &players);

        assert_eq!(event.timestamp, 1_633_024_800_000);
        assert_eq!(event.actions.len(), 3);
        assert_eq!(event.actions[0].team, "Team Tacos");
        assert_eq!(event.actions[0].action, "FA ADDED");
        assert_eq!(event.actions[0].player.name, "Joe Mixon");
        assert_eq!(event.actions[0].player.team, "CIN");
        assert_eq!(event.actions[1].action, "DROPPED");
        assert_eq!(event.actions[1].player.name, "Unknown");
        assert_eq!(event.actions[2].team, "Nacho Average Team");
        assert_eq!(event.actions[2].action, "TRADED");
    }

    #[test]
    fn test_sleeper_stat_line_keeps_numeric_stats() {
        let line: SleeperStatLine = serde_json::from_value(json!({
            "player_id": "4046",
            "game_id": 202110004,
            "stats": {"pass_yd": 212.0, "pass_td": 2, "pos_rank": null, "note": "x"}
        }))
        .unwrap();

        let stat_line = line.to_stat_line();
        assert_eq!(stat_line.game_id, "202110004");
        assert_eq!(stat_line.stats.len(), 2);
        assert_eq!(stat_line.stats["pass_td"], 2.0);
    }

    #[test]
    fn test_sleeper_game_clock() {
        let live: SleeperGame = serde_json::from_value(json!({
            "game_id": "g1",
            "status": "in_game",
            "metadata": {"quarter_num": 3, "time_remaining": "10:00"}
        }))
        .unwrap();
        let clock = live.to_clock();
        assert_eq!(clock.status, GameStatus::InProgress);
        assert_eq!(clock.seconds_remaining, 900 + 600);

        let string_quarter: SleeperGame = serde_json::from_value(json!({
            "game_id": "g2",
            "status": "in_game",
            "metadata": {"quarter_num": "4", "time_remaining": "1:30"}
        }))
        .unwrap();
        assert_eq!(string_quarter.to_clock().seconds_remaining, 90);

        let done: SleeperGame =
            serde_json::from_value(json!({"game_id": "g3", "status": "complete"})).unwrap();
        assert_eq!(done.to_clock().status, GameStatus::Complete);

        let broken: SleeperGame =
            serde_json::from_value(json!({"game_id": "g4", "status": "in_game", "metadata": {}})).unwrap();
        assert_eq!(broken.to_clock().status, GameStatus::NotStarted);
    }

    #[test]
    fn test_sleeper_user_team_name() {
        let user: SleeperUser = serde_json::from_value(json!({
            "user_id": "1", "display_name": "dan", "metadata": {"team_name": "Dan's Team"}
        }))
        .unwrap();
        assert_eq!(user.team_name(), "Dan's Team");

        let plain: SleeperUser =
            serde_json::from_value(json!({"user_id": "2", "display_name": "sam", "metadata": {}})).unwrap();
        assert_eq!(plain.team_name(), "sam");
    }
}
