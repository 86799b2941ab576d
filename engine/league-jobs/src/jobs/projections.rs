//! Live projections job
//!
//! Every run appends one snapshot per team to the week's record and
//! re-renders the per-matchup chart pages from the full history.

use anyhow::{Context, Result};
use chrono::Utc;
use league_core::{
    group_by_matchup, project_roster, GameClockState, LeagueDescriptor, Provider, ScoringRules, TeamProjection,
    WeekProjections,
};
use league_fetcher::{EspnBoxScore, SleeperClient, SleeperMatchup, WeekStatLines};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

use super::JobContext;
use crate::artifacts::{matchup_page_key, week_index_key};
use crate::config::StorageConfig;
use crate::html::{render_matchup_page, render_week_index, team_label, MatchupLink};
use crate::projection_store::ProjectionStore;
use crate::storage::{ArtifactStore, HTML_CONTENT_TYPE};

/// One run's worth of data for a league
#[derive(Debug, Clone)]
struct WeekSnapshot {
    season: String,
    week: u32,
    team_names: HashMap<u32, String>,
    projections: Vec<TeamProjection>,
}

pub async fn run_projections_job(ctx: &JobContext, store: &dyn ProjectionStore) -> Result<()> {
    let timestamp = Utc::now().timestamp();
    let sleeper = ctx.sleeper_client()?;

    for league in &ctx.config.leagues {
        let snapshot = match league.provider()? {
            Provider::Sleeper => sleeper_snapshot(&sleeper, &league.id, timestamp).await?,
            Provider::Espn => espn_snapshot(ctx, league, timestamp).await?,
        };

        let week = record_snapshot(store, &league.id, &snapshot.season, snapshot.week, snapshot.projections).await?;
        write_projection_pages(ctx.artifacts.as_ref(), &ctx.config.storage, &week, &snapshot.team_names).await?;
    }

    Ok(())
}

async fn sleeper_snapshot(client: &SleeperClient, league_id: &str, timestamp: i64) -> Result<WeekSnapshot> {
    let state = client.fetch_nfl_state().await?;
    let (season, week) = (state.league_season, state.week);
    info!("Sleeper league {}: season {} week {}", league_id, season, week);

    let matchups = client.fetch_matchups(league_id, week).await?;
    let starters = all_starters(&matchups);
    let stats = client.fetch_stat_lines(&season, week, &starters).await?;
    let rules = client.fetch_scoring_rules(league_id).await?;
    let clocks = client.fetch_game_clocks(&season, week).await?;
    let team_names = client.fetch_team_names(league_id).await?;

    let projections = sleeper_projections(&rules, &matchups, &stats, &clocks, timestamp);
    Ok(WeekSnapshot { season, week, team_names, projections })
}

async fn espn_snapshot(ctx: &JobContext, league: &LeagueDescriptor, timestamp: i64) -> Result<WeekSnapshot> {
    let client = ctx.espn_client(league)?;
    let state = client.fetch_league_state().await?;
    info!("ESPN league {}: week {}", league.id, state.current_week);

    let box_scores = client.fetch_box_scores(state).await?;
    let team_names = client.fetch_team_names().await?;

    Ok(WeekSnapshot {
        season: ctx.config.providers.espn.season.to_string(),
        week: state.current_week,
        team_names,
        projections: espn_projections(&box_scores, timestamp),
    })
}

/// Distinct starters across all rosters, empty slots dropped
fn all_starters(matchups: &[SleeperMatchup]) -> Vec<String> {
    let unique: BTreeSet<&String> =
        matchups.iter().flat_map(|m| m.starters.iter()).filter(|id| !id.is_empty() && *id != "0").collect();
    unique.into_iter().cloned().collect()
}

/// Live blended total for every roster that has an opponent this week
pub fn sleeper_projections(
    rules: &ScoringRules,
    matchups: &[SleeperMatchup],
    stats: &WeekStatLines,
    clocks: &HashMap<String, GameClockState>,
    timestamp: i64,
) -> Vec<TeamProjection> {
    matchups
        .iter()
        .filter_map(|matchup| {
            let Some(matchup_id) = matchup.matchup_id else {
                warn!("Roster {} has no matchup this week, skipping", matchup.roster_id);
                return None;
            };
            let projection = project_roster(rules, &matchup.starters, &stats.actual, &stats.projected, clocks);
            Some(TeamProjection { timestamp, team_id: matchup.roster_id, matchup_id, projection })
        })
        .collect()
}

/// Provider projected totals for both sides of every matchup
pub fn espn_projections(box_scores: &[EspnBoxScore], timestamp: i64) -> Vec<TeamProjection> {
    let mut projections = Vec::with_capacity(box_scores.len() * 2);
    for score in box_scores {
        let Some((away_team, away_projected)) = score.away else {
            warn!("Team {} is on a bye in matchup {}, skipping", score.home_team, score.matchup_id);
            continue;
        };
        projections.push(TeamProjection {
            timestamp,
            team_id: score.home_team,
            matchup_id: score.matchup_id,
            projection: score.home_projected,
        });
        projections.push(TeamProjection {
            timestamp,
            team_id: away_team,
            matchup_id: score.matchup_id,
            projection: away_projected,
        });
    }
    projections
}

/// Append a snapshot to the stored week record and save it
pub async fn record_snapshot(
    store: &dyn ProjectionStore,
    league_id: &str,
    season: &str,
    week: u32,
    snapshot: Vec<TeamProjection>,
) -> Result<WeekProjections> {
    let record = store
        .load_week(league_id, season, week)
        .await
        .with_context(|| format!("Failed to load projections for league {} week {}", league_id, week))?
        .with_snapshot(snapshot);

    store
        .save_week(&record)
        .await
        .with_context(|| format!("Failed to save projections for league {} week {}", league_id, week))?;
    Ok(record)
}

/// Render one chart page per matchup, and the week index if it is missing
pub async fn write_projection_pages(
    artifacts: &dyn ArtifactStore,
    storage: &StorageConfig,
    week: &WeekProjections,
    team_names: &HashMap<u32, String>,
) -> Result<()> {
    let grouped = group_by_matchup(&week.projections)
        .with_context(|| format!("Inconsistent projections for league {} week {}", week.league_id, week.week))?;
    let bucket = &storage.projections_bucket;

    let mut links = Vec::with_capacity(grouped.len());
    for (matchup_id, series) in &grouped {
        let key = matchup_page_key(&week.league_id, &week.season, week.week, *matchup_id);
        let page = render_matchup_page(series, team_names);
        artifacts.write_public(bucket, &key, page.into_bytes(), HTML_CONTENT_TYPE).await?;

        links.push(MatchupLink {
            name: format!(
                "{} vs. {}",
                team_label(team_names, series.teams[0]),
                team_label(team_names, series.teams[1])
            ),
            url: storage.projections_url(&key),
        });
    }

    let index_key = week_index_key(&week.league_id, &week.season, week.week);
    if artifacts.exists(bucket, &index_key).await? {
        info!("Index {} already exists, not regenerating", index_key);
        return Ok(());
    }

    let index = render_week_index(week.week, &links);
    artifacts.write_public(bucket, &index_key, index.into_bytes(), HTML_CONTENT_TYPE).await?;
    Ok(())
}
