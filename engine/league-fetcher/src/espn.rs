use crate::config::EspnConfig;
use crate::models::*;
use anyhow::{Context, Result};
use league_core::{ActivityEvent, CompletedGame};
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tracing::info;

const FANTASY_FILTER_HEADER: &str = "x-fantasy-filter";

/// Client for one ESPN fantasy league
pub struct EspnClient {
    config: EspnConfig,
    league_id: u64,
    client: Client,
}

impl EspnClient {
    /// Create a client for `league_id`
    pub fn new(config: EspnConfig, league_id: u64, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, league_id, client })
    }

    pub fn league_id(&self) -> u64 {
        self.league_id
    }

    fn league_url(&self) -> String {
        format!(
            "{}/seasons/{}/segments/0/leagues/{}",
            self.config.api_base_url, self.config.season, self.league_id
        )
    }

    /// Attach the private league cookies when configured
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.config.s2.is_empty() && self.config.swid.is_empty() {
            return request;
        }
        request.header(COOKIE, format!("SWID={}; espn_s2={}", self.config.swid, self.config.s2))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .with_context(|| format!("Failed to fetch ESPN {}", what))?;

        if !response.status().is_success() {
            anyhow::bail!("ESPN {} request failed with status: {}", what, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse ESPN {} JSON", what))
    }

    async fn fetch_league_views(&self, views: &[&str], scoring_period: Option<u32>) -> Result<EspnLeagueResponse> {
        let mut query: Vec<(&str, String)> = views.iter().map(|view| ("view", view.to_string())).collect();
        if let Some(period) = scoring_period {
            query.push(("scoringPeriodId", period.to_string()));
        }

        let request = self.client.get(self.league_url()).query(&query);
        self.send_json(request, &views.join(",")).await
    }

    /// All teams in the league
    pub async fn fetch_teams(&self) -> Result<Vec<EspnTeam>> {
        let league = self.fetch_league_views(&["mTeam"], None).await?;
        info!("Fetched {} teams for ESPN league {}", league.teams.len(), self.league_id);
        Ok(league.teams)
    }

    /// Team id to display name
    pub async fn fetch_team_names(&self) -> Result<HashMap<u32, String>> {
        Ok(self.fetch_teams().await?.into_iter().map(|team| (team.id, team.team_name())).collect())
    }

    /// Current scoring period and matchup period
    pub async fn fetch_league_state(&self) -> Result<EspnLeagueState> {
        let league = self.fetch_league_views(&["mSettings"], None).await?;
        let status = league.status.context("ESPN league response has no status")?;
        let scoring_period = league.scoring_period_id.context("ESPN league response has no scoringPeriodId")?;
        let current_week = match status.final_scoring_period {
            Some(last) if scoring_period > last => last,
            _ => scoring_period,
        };

        Ok(EspnLeagueState { current_week, current_matchup_period: status.current_matchup_period })
    }

    /// Full season schedule with points and results
    pub async fn fetch_schedule(&self) -> Result<Vec<EspnScheduleEntry>> {
        let league = self.fetch_league_views(&["mMatchup"], None).await?;
        info!("Fetched {} schedule entries for ESPN league {}", league.schedule.len(), self.league_id);
        Ok(league.schedule)
    }

    /// Decided games so far this season
    pub async fn fetch_completed_games(&self) -> Result<Vec<CompletedGame>> {
        Ok(self.fetch_schedule().await?.iter().filter_map(EspnScheduleEntry::to_completed_game).collect())
    }

    /// Live projected totals for the given matchup period
    pub async fn fetch_box_scores(&self, state: EspnLeagueState) -> Result<Vec<EspnBoxScore>> {
        let league = self
            .fetch_league_views(&["mMatchupScore", "mScoreboard"], Some(state.current_week))
            .await?;

        let box_scores: Vec<EspnBoxScore> = league
            .schedule
            .iter()
            .filter(|entry| entry.matchup_period_id == state.current_matchup_period)
            .filter_map(EspnScheduleEntry::to_box_score)
            .collect();

        info!(
            "Fetched {} box scores for ESPN league {} week {}",
            box_scores.len(),
            self.league_id,
            state.current_week
        );
        Ok(box_scores)
    }

    /// Player id to name and pro team
    pub async fn fetch_player_directory(&self) -> Result<HashMap<i64, EspnPlayer>> {
        let url = format!("{}/seasons/{}/players", self.config.api_base_url, self.config.season);
        let request = self
            .client
            .get(url)
            .query(&[("view", "players_wl")])
            .header(FANTASY_FILTER_HEADER, r#"{"filterActive":null}"#);

        let players: Vec<EspnPlayer> = self.send_json(request, "players").await?;
        Ok(players.into_iter().map(|player| (player.id, player)).collect())
    }

    /// Most recent `size` add/drop/waiver/trade transactions, newest first
    pub async fn fetch_recent_activity(&self, size: u32) -> Result<Vec<ActivityEvent>> {
        let filter = serde_json::json!({
            "topics": {
                "filterType": {"value": ["ACTIVITY_TRANSACTIONS"]},
                "limit": size,
                "limitPerMessageSet": {"value": 25},
                "offset": 0,
                "sortMessageDate": {"sortPriority": 1, "sortAsc": false},
                "sortFor": {"sortPriority": 2, "sortAsc": false},
                "filterIncludeMessageTypeIds": {"value": ACTIVITY_MESSAGE_TYPES}
            }
        });

        let request = self
            .client
            .get(format!("{}/communication/", self.league_url()))
            .query(&[("view", "kona_league_communication")])
            .header(FANTASY_FILTER_HEADER, filter.to_string());
        let communication: EspnCommunicationResponse = self.send_json(request, "recent activity").await?;

        let team_names = self.fetch_team_names().await?;
        let players = self.fetch_player_directory().await?;

        let events: Vec<ActivityEvent> = communication
            .topics
            .iter()
            .map(|topic| topic.to_activity_event(&team_names, &players))
            .collect();

        info!("Fetched {} recent activity events for ESPN league {}", events.len(), self.league_id);
        Ok(events)
    }
}
