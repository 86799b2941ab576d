//! Object keys for published artifacts

use chrono::NaiveDate;
use league_core::Provider;

pub const SLEEPER_PLAYERS_KEY: &str = "sleeper_players.json";
pub const COVID_PLAYERS_KEY: &str = "covid_players.json";

pub fn power_key(provider: Provider, league_id: &str) -> String {
    format!("power_{}_{}.json", provider, league_id)
}

pub fn activity_key(provider: Provider, league_id: &str) -> String {
    format!("activity_{}_{}.json", provider, league_id)
}

/// Dated status snapshot, e.g. `covid_players_2021-10-04.json`
pub fn dated_covid_key(date: NaiveDate) -> String {
    format!("covid_players_{}.json", date.format("%Y-%m-%d"))
}

pub fn matchup_page_key(league_id: &str, season: &str, week: u32, matchup_id: u32) -> String {
    format!("{}/{}/{}/{}.html", league_id, season, week, matchup_id)
}

pub fn week_index_key(league_id: &str, season: &str, week: u32) -> String {
    format!("{}/{}/{}/index.html", league_id, season, week)
}
