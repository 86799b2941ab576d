//! Day-over-day player status diff
//!
//! The provider does not expose when a player entered a status, so the start
//! date is inferred from whether the player was already listed yesterday.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder start date when a player was already listed but nobody knows since when
pub const UNKNOWN_START_DATE: &str = "unknown";

const COVID_STATUS: &str = "COV";

/// Provider player record with the fields the differ looks at.
/// Everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    #[serde(default)]
    pub injury_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlayerStatus {
    /// Whether the provider flagged the record as new
    pub fn is_flagged_new(&self) -> bool {
        match self.extra.get("new") {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::Null) | None => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0),
            Some(serde_json::Value::Array(items)) => !items.is_empty(),
            Some(serde_json::Value::Object(fields)) => !fields.is_empty(),
        }
    }
}

/// Player id to status record
pub type StatusSnapshot = BTreeMap<String, PlayerStatus>;

/// Default status predicate
pub fn is_covid_status(status: &PlayerStatus) -> bool {
    status.injury_status.as_deref() == Some(COVID_STATUS)
}

/// Filter today's snapshot by `predicate` and annotate each kept player with
/// an inferred `start_date`.
pub fn diff_and_infer_start<F>(
    yesterday: &StatusSnapshot,
    today: &StatusSnapshot,
    today_date: NaiveDate,
    predicate: F,
) -> StatusSnapshot
where
    F: Fn(&PlayerStatus) -> bool,
{
    let yesterday_date = today_date - Duration::days(1);

    today
        .iter()
        .filter(|(_, status)| predicate(status))
        .map(|(player_id, status)| {
            let start_date = match yesterday.get(player_id) {
                Some(previous) => match previous.start_date.as_deref().filter(|start| !start.is_empty()) {
                    Some(start) => start.to_string(),
                    None if status.is_flagged_new() => yesterday_date.to_string(),
                    None => UNKNOWN_START_DATE.to_string(),
                },
                None => today_date.to_string(),
            };

            let mut annotated = status.clone();
            annotated.start_date = Some(start_date);
            (player_id.clone(), annotated)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn covid(extra: serde_json::Value) -> PlayerStatus {
        let mut status: PlayerStatus = serde_json::from_value(extra).unwrap();
        status.injury_status = Some("COV".to_string());
        status
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 12, 20).unwrap()
    }

    #[test]
    fn test_new_player_gets_today() {
        let today_snapshot = StatusSnapshot::from([("p1".to_string(), covid(json!({"full_name": "A"})))]);

        let annotated = diff_and_infer_start(&StatusSnapshot::new(), &today_snapshot, today(), is_covid_status);

        assert_eq!(annotated["p1"].start_date.as_deref(), Some("2021-12-20"));
        assert_eq!(annotated["p1"].extra["full_name"], json!("A"));
    }

    #[test]
    fn test_existing_start_date_propagates() {
        let mut previous = covid(json!({}));
        previous.start_date = Some("2024-01-01".to_string());
        let yesterday = StatusSnapshot::from([("p1".to_string(), previous)]);
        let today_snapshot = StatusSnapshot::from([("p1".to_string(), covid(json!({"new": true})))]);

        let annotated = diff_and_infer_start(&yesterday, &today_snapshot, today(), is_covid_status);

        assert_eq!(annotated["p1"].start_date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_missing_start_date_backdates_or_unknown() {
        let yesterday = StatusSnapshot::from([
            ("new".to_string(), covid(json!({}))),
            ("old".to_string(), covid(json!({}))),
        ]);
        let today_snapshot = StatusSnapshot::from([
            ("new".to_string(), covid(json!({"new": true}))),
            ("old".to_string(), covid(json!({"new": false}))),
        ]);

        let annotated = diff_and_infer_start(&yesterday, &today_snapshot, today(), is_covid_status);

        assert_eq!(annotated["new"].start_date.as_deref(), Some("2021-12-19"));
        assert_eq!(annotated["old"].start_date.as_deref(), Some(UNKNOWN_START_DATE));
    }

    #[test]
    fn test_empty_values_are_not_set() {
        let mut blank = covid(json!({}));
        blank.start_date = Some(String::new());
        let yesterday = StatusSnapshot::from([
            ("blank".to_string(), blank),
            ("empty_list".to_string(), covid(json!({}))),
            ("empty_map".to_string(), covid(json!({}))),
        ]);
        let today_snapshot = StatusSnapshot::from([
            ("blank".to_string(), covid(json!({"new": true}))),
            ("empty_list".to_string(), covid(json!({"new": []}))),
            ("empty_map".to_string(), covid(json!({"new": {}}))),
        ]);

        let annotated = diff_and_infer_start(&yesterday, &today_snapshot, today(), is_covid_status);

        assert_eq!(annotated["blank"].start_date.as_deref(), Some("2021-12-19"));
        assert_eq!(annotated["empty_list"].start_date.as_deref(), Some(UNKNOWN_START_DATE));
        assert_eq!(annotated["empty_map"].start_date.as_deref(), Some(UNKNOWN_START_DATE));
        assert!(covid(json!({"new": ["x"]})).is_flagged_new());
    }

    #[test]
    fn test_filters_by_predicate() {
        let healthy: PlayerStatus = serde_json::from_value(json!({"injury_status": null})).unwrap();
        let questionable: PlayerStatus =
            serde_json::from_value(json!({"injury_status": "Questionable"})).unwrap();
        let today_snapshot = StatusSnapshot::from([
            ("a".to_string(), healthy),
            ("b".to_string(), questionable),
            ("c".to_string(), covid(json!({}))),
        ]);

        let annotated = diff_and_infer_start(&StatusSnapshot::new(), &today_snapshot, today(), is_covid_status);

        assert_eq!(annotated.keys().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_status_record_round_trip() {
        let raw = json!({
            "player_id": "4034",
            "full_name": "Christian McCaffrey",
            "team": "CAR",
            "injury_status": "COV",
            "start_date": "2021-12-18",
            "search_rank": 3
        });

        let status: PlayerStatus = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&status).unwrap(), raw);
    }
}
