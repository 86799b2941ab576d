//! Player dump and COVID list job

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use league_core::{diff_and_infer_start, is_covid_status, StatusSnapshot};
use tracing::info;

use super::JobContext;
use crate::artifacts::{dated_covid_key, COVID_PLAYERS_KEY, SLEEPER_PLAYERS_KEY};
use crate::storage::{read_json, write_json_public, ArtifactStore, JSON_CONTENT_TYPE};

pub async fn run_players_job(ctx: &JobContext) -> Result<()> {
    let sleeper = ctx.sleeper_client()?;
    let raw_players = sleeper.fetch_players_raw().await?;

    let today = local_date(Utc::now(), ctx.config.status_timezone);
    info!("Updating player status for {} ({})", today, ctx.config.status_timezone);

    let listed =
        publish_player_status(ctx.artifacts.as_ref(), &ctx.config.storage.artifact_bucket, raw_players, today).await?;
    info!("{} players on the COVID list", listed.len());
    Ok(())
}

/// Calendar date of `now` in `zone`, daylight saving included
pub fn local_date(now: DateTime<Utc>, zone: Tz) -> NaiveDate {
    now.with_timezone(&zone).date_naive()
}

/// Store the raw dump, then diff today's COVID list against yesterday's and
/// publish it under both the current and the dated key.
pub async fn publish_player_status(
    store: &dyn ArtifactStore,
    bucket: &str,
    raw_players: String,
    today: NaiveDate,
) -> Result<StatusSnapshot> {
    let today_snapshot: StatusSnapshot =
        serde_json::from_str(&raw_players).context("Player dump is not a map of player records")?;

    store
        .write_public(bucket, SLEEPER_PLAYERS_KEY, raw_players.into_bytes(), JSON_CONTENT_TYPE)
        .await
        .with_context(|| format!("Failed to write {}", SLEEPER_PLAYERS_KEY))?;

    let yesterday_key = dated_covid_key(today - Duration::days(1));
    let yesterday: StatusSnapshot = read_json(store, bucket, &yesterday_key)
        .await
        .with_context(|| format!("Failed to read {}", yesterday_key))?
        .unwrap_or_default();

    let listed = diff_and_infer_start(&yesterday, &today_snapshot, today, is_covid_status);

    for key in [COVID_PLAYERS_KEY.to_string(), dated_covid_key(today)] {
        write_json_public(store, bucket, &key, &listed)
            .await
            .with_context(|| format!("Failed to write {}", key))?;
    }

    Ok(listed)
}
