use crate::config::SleeperConfig;
use crate::models::*;
use anyhow::{Context, Result};
use league_core::{GameClockState, PlayerStatLine, ScoringRules};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

/// Actual and projected stat lines for a week, keyed by player id
#[derive(Debug, Default)]
pub struct WeekStatLines {
    pub actual: HashMap<String, PlayerStatLine>,
    pub projected: HashMap<String, PlayerStatLine>,
}

/// Sleeper API client
pub struct SleeperClient {
    config: SleeperConfig,
    client: Client,
}

impl SleeperClient {
    /// Create a new Sleeper API client
    pub fn new(config: SleeperConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch Sleeper {}", what))?;

        if !response.status().is_success() {
            anyhow::bail!("Sleeper {} request failed with status: {}", what, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Sleeper {} JSON", what))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = format!("{}/{}", self.config.api_base_url, path);
        self.send_json(self.client.get(url), what).await
    }

    async fn graphql<T: DeserializeOwned>(&self, operation_name: &str, query: String) -> Result<T> {
        let body = serde_json::json!({
            "operationName": operation_name,
            "variables": {},
            "query": query,
        });
        let request = self
            .client
            .post(&self.config.graphql_url)
            .header(AUTHORIZATION, &self.config.token)
            .json(&body);

        let response: GraphqlResponse<T> = self.send_json(request, operation_name).await?;
        if !response.errors.is_empty() {
            anyhow::bail!("Sleeper GraphQL {} returned errors: {:?}", operation_name, response.errors);
        }
        response
            .data
            .with_context(|| format!("Sleeper GraphQL {} returned no data", operation_name))
    }

    /// Current NFL week and season
    pub async fn fetch_nfl_state(&self) -> Result<SleeperNflState> {
        self.get("state/nfl", "NFL state").await
    }

    /// League details, including scoring settings
    pub async fn fetch_league(&self, league_id: &str) -> Result<SleeperLeague> {
        self.get(&format!("league/{}", league_id), "league").await
    }

    pub async fn fetch_scoring_rules(&self, league_id: &str) -> Result<ScoringRules> {
        Ok(ScoringRules::new(self.fetch_league(league_id).await?.scoring_settings))
    }

    pub async fn fetch_matchups(&self, league_id: &str, week: u32) -> Result<Vec<SleeperMatchup>> {
        let matchups: Vec<SleeperMatchup> =
            self.get(&format!("league/{}/matchups/{}", league_id, week), "matchups").await?;
        info!("Fetched {} matchup rosters for Sleeper league {} week {}", matchups.len(), league_id, week);
        Ok(matchups)
    }

    pub async fn fetch_users(&self, league_id: &str) -> Result<Vec<SleeperUser>> {
        self.get(&format!("league/{}/users", league_id), "users").await
    }

    pub async fn fetch_rosters(&self, league_id: &str) -> Result<Vec<SleeperRoster>> {
        self.get(&format!("league/{}/rosters", league_id), "rosters").await
    }

    /// Roster id to the owning user's team name
    pub async fn fetch_team_names(&self, league_id: &str) -> Result<HashMap<u32, String>> {
        let users = self.fetch_users(league_id).await?;
        let rosters = self.fetch_rosters(league_id).await?;
        Ok(team_names_by_roster(&users, &rosters))
    }

    /// Actual and projected stat lines for `players` in `week`
    pub async fn fetch_stat_lines(&self, season: &str, week: u32, players: &[String]) -> Result<WeekStatLines> {
        let batch: StatsBatch =
            self.graphql("get_player_score_and_projections_batch", stats_query(season, week, players)).await?;

        let index = |lines: Vec<SleeperStatLine>| -> HashMap<String, PlayerStatLine> {
            lines.into_iter().map(|line| (line.player_id.clone(), line.to_stat_line())).collect()
        };

        let stat_lines = WeekStatLines { actual: index(batch.actual), projected: index(batch.projected) };
        info!(
            "Fetched {} actual and {} projected stat lines for week {}",
            stat_lines.actual.len(),
            stat_lines.projected.len(),
            week
        );
        Ok(stat_lines)
    }

    /// Game clocks for every game in `week`, keyed by game id
    pub async fn fetch_game_clocks(&self, season: &str, week: u32) -> Result<HashMap<String, GameClockState>> {
        let batch: ScoresBatch = self.graphql("batch_scores", scores_query(season, week)).await?;
        Ok(batch.scores.iter().map(|game| (game.game_id.clone(), game.to_clock())).collect())
    }

    /// Raw `/players/nfl` dump. Sleeper asks callers to hit this at most once a day.
    pub async fn fetch_players_raw(&self) -> Result<String> {
        let url = format!("{}/players/nfl", self.config.api_base_url);
        let response = self.client.get(url).send().await.context("Failed to fetch Sleeper players")?;

        if !response.status().is_success() {
            anyhow::bail!("Sleeper players request failed with status: {}", response.status());
        }

        response.text().await.context("Failed to read Sleeper players body")
    }
}

/// Join rosters to their owners' team names. Rosters without a known owner are skipped.
pub fn team_names_by_roster(users: &[SleeperUser], rosters: &[SleeperRoster]) -> HashMap<u32, String> {
    let names_by_user: HashMap<&str, String> =
        users.iter().map(|user| (user.user_id.as_str(), user.team_name())).collect();

    rosters
        .iter()
        .filter_map(|roster| {
            let owner = roster.owner_id.as_deref()?;
            match names_by_user.get(owner) {
                Some(name) => Some((roster.roster_id, name.clone())),
                None => {
                    warn!("Roster {} owner {} is not a league member", roster.roster_id, owner);
                    None
                }
            }
        })
        .collect()
}

fn stats_query(season: &str, week: u32, players: &[String]) -> String {
    let player_ids = serde_json::to_string(players).unwrap_or_else(|_| "[]".to_string());
    let fields = "{ game_id opponent player_id stats team week season }";
    let selection = |alias: &str, category: &str| {
        format!(
            "{}: stats_for_players_in_week(sport: \"nfl\",season: \"{}\",category: \"{}\",season_type: \"regular\",week: {},player_ids: {}){}",
            alias, season, category, week, player_ids, fields
        )
    };

    format!(
        "query get_player_score_and_projections_batch {{ {} {} }}",
        selection("actual", "stat"),
        selection("projected", "proj")
    )
}

fn scores_query(season: &str, week: u32) -> String {
    format!(
        "query batch_scores {{scores: scores(sport: \"nfl\",season_type: \"regular\",season: \"{}\",week: {}){{date game_id metadata season season_type sport status week start_time}}}}",
        season, week
    )
}
