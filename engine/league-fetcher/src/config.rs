use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Configuration for the league data provider clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// ESPN fantasy API configuration
    pub espn: EspnConfig,

    /// Sleeper API configuration
    pub sleeper: SleeperConfig,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspnConfig {
    /// Base URL up to and including the game segment
    pub api_base_url: String,

    /// `espn_s2` cookie for private leagues
    pub s2: String,

    /// `SWID` cookie for private leagues
    pub swid: String,

    /// Season year the leagues are read for
    pub season: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleeperConfig {
    /// REST base URL
    pub api_base_url: String,

    /// GraphQL endpoint used for stats and live scores
    pub graphql_url: String,

    /// Authorization token for the GraphQL endpoint
    pub token: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            espn: EspnConfig {
                api_base_url: "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl".to_string(),
                s2: String::new(),
                swid: String::new(),
                season: nfl_season_for(chrono::Utc::now().date_naive()),
            },
            sleeper: SleeperConfig {
                api_base_url: "https://api.sleeper.app/v1".to_string(),
                graphql_url: "https://sleeper.app/graphql".to_string(),
                token: String::new(),
            },
            request_timeout_secs: 30,
        }
    }
}

/// NFL season a date belongs to. January and February still count towards
/// the previous year's season.
pub fn nfl_season_for(date: NaiveDate) -> u32 {
    let year = date.year() as u32;
    if date.month() < 3 {
        year - 1
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfl_season_for() {
        assert_eq!(nfl_season_for(NaiveDate::from_ymd_opt(2022, 1, 9).unwrap()), 2021);
        assert_eq!(nfl_season_for(NaiveDate::from_ymd_opt(2021, 9, 12).unwrap()), 2021);
        assert_eq!(nfl_season_for(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()), 2021);
    }

    #[test]
    fn test_default_endpoints() {
        let config = ProviderConfig::default();
        assert!(config.sleeper.api_base_url.ends_with("/v1"));
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.espn.s2.is_empty());
    }
}
