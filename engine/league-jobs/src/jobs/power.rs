//! Power rankings job

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use league_core::{power_rankings, CompletedGame, LeagueDescriptor, PowerEntry, PowerRankingDocument, Provider};
use std::collections::HashMap;
use tracing::info;

use super::JobContext;
use crate::artifacts::power_key;
use crate::html::team_label;
use crate::storage::write_json_public;

/// Rank every configured league and publish `power_{type}_{id}.json`.
///
/// Only ESPN leagues are supported; anything else fails the job.
pub async fn run_power_job(ctx: &JobContext) -> Result<()> {
    let now = Utc::now();

    for league in &ctx.config.leagues {
        let provider = league.provider()?;
        let document = match provider {
            Provider::Espn => espn_power(ctx, league, now).await?,
            other => bail!("Power rankings are not supported for {} league {}", other, league.id),
        };

        let key = power_key(provider, &league.id);
        write_json_public(ctx.artifacts.as_ref(), &ctx.config.storage.artifact_bucket, &key, &document)
            .await
            .with_context(|| format!("Failed to publish {}", key))?;
        info!("Published power rankings for league {} ({} teams)", league.id, document.power.len());
    }

    Ok(())
}

async fn espn_power(ctx: &JobContext, league: &LeagueDescriptor, now: DateTime<Utc>) -> Result<PowerRankingDocument> {
    let client = ctx.espn_client(league)?;
    let team_names = client.fetch_team_names().await?;
    let games = client.fetch_completed_games().await?;
    info!("League {}: {} teams, {} completed games", league.id, team_names.len(), games.len());

    Ok(build_power_document(&team_names, &games, now))
}

/// Rankings document for a league's teams and completed games
pub fn build_power_document(
    team_names: &HashMap<u32, String>,
    games: &[CompletedGame],
    now: DateTime<Utc>,
) -> PowerRankingDocument {
    let teams: Vec<u32> = team_names.keys().copied().collect();
    let power = power_rankings(&teams, games)
        .into_iter()
        .map(|ranking| PowerEntry { power: ranking.formatted(), team: team_label(team_names, ranking.team_id) })
        .collect();

    PowerRankingDocument { power, updated: now.to_rfc3339() }
}
