//! Recent activity job
//!
//! Keeps `activity_espn_{id}.json` up to date and announces the events that
//! are new to it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use league_core::{merge_activity, ActivityDocument, ActivityEvent, LeagueDescriptor, Provider};
use tracing::{error, info};

use super::JobContext;
use crate::artifacts::activity_key;
use crate::notifier::{chunk_lines, Notifier, MAX_MESSAGE_LENGTH};
use crate::storage::{read_json, write_json_public, ArtifactStore};

/// New events for a league that has a notification channel
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityNotice {
    pub league_id: String,
    pub channel_id: String,
    /// Newest first
    pub events: Vec<ActivityEvent>,
}

/// Where fresh activity batches come from
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Most recent `size` events for an ESPN league, newest first
    async fn recent_activity(&self, league: &LeagueDescriptor, size: u32) -> Result<Vec<ActivityEvent>>;
}

/// Live ESPN feed
pub struct EspnActivitySource<'a> {
    ctx: &'a JobContext,
}

#[async_trait]
impl ActivitySource for EspnActivitySource<'_> {
    async fn recent_activity(&self, league: &LeagueDescriptor, size: u32) -> Result<Vec<ActivityEvent>> {
        let client = self.ctx.espn_client(league)?;
        client
            .fetch_recent_activity(size)
            .await
            .with_context(|| format!("Failed to fetch activity for league {}", league.id))
    }
}

/// Refresh every ESPN league's activity feed and announce what is new.
///
/// Leagues of any other type are logged and skipped. Returns the notices
/// that were delivered.
pub async fn run_activity_job(ctx: &JobContext) -> Result<Vec<ActivityNotice>> {
    refresh_activity(ctx, &EspnActivitySource { ctx }).await
}

/// Each league is announced right after its feed is written.
pub async fn refresh_activity(ctx: &JobContext, source: &dyn ActivitySource) -> Result<Vec<ActivityNotice>> {
    let mut delivered = Vec::new();
    let now = Utc::now();

    for league in &ctx.config.leagues {
        match league.provider() {
            Ok(Provider::Espn) => {}
            Ok(other) => {
                error!("Can't handle league {} with type: {}", league.id, other);
                continue;
            }
            Err(e) => {
                error!("Skipping league {}: {}", league.id, e);
                continue;
            }
        }

        let fresh = source.recent_activity(league, ctx.config.recent_activity_size).await?;

        let new_events = publish_league_activity(
            ctx.artifacts.as_ref(),
            &ctx.config.storage.artifact_bucket,
            league,
            Provider::Espn,
            fresh,
            now,
        )
        .await?;

        if let Some(notice) = notice_for(league, new_events) {
            let sent = notify_new_activity(ctx.notifier.as_ref(), std::slice::from_ref(&notice)).await?;
            info!("Sent {} activity messages to channel {}", sent, notice.channel_id);
            delivered.push(notice);
        }
    }

    Ok(delivered)
}

/// Read the stored feed, merge `fresh` into it and write it back.
/// Returns the newly added events.
pub async fn publish_league_activity(
    store: &dyn ArtifactStore,
    bucket: &str,
    league: &LeagueDescriptor,
    provider: Provider,
    fresh: Vec<ActivityEvent>,
    now: DateTime<Utc>,
) -> Result<Vec<ActivityEvent>> {
    let key = activity_key(provider, &league.id);
    let previous: Option<ActivityDocument> =
        read_json(store, bucket, &key).await.with_context(|| format!("Failed to read {}", key))?;

    let (document, new_events) = next_activity_document(previous, fresh, now);
    write_json_public(store, bucket, &key, &document)
        .await
        .with_context(|| format!("Failed to write {}", key))?;

    info!("League {}: {} new activity events", league.id, new_events.len());
    Ok(new_events)
}

/// Next stored document plus the events it gained
pub fn next_activity_document(
    previous: Option<ActivityDocument>,
    fresh: Vec<ActivityEvent>,
    now: DateTime<Utc>,
) -> (ActivityDocument, Vec<ActivityEvent>) {
    let existing = previous.map(|doc| doc.activity).unwrap_or_default();
    let outcome = merge_activity(existing, fresh);

    let document = ActivityDocument { activity: outcome.updated, updated: Some(now.to_rfc3339()) };
    (document, outcome.newly_added)
}

fn notice_for(league: &LeagueDescriptor, events: Vec<ActivityEvent>) -> Option<ActivityNotice> {
    let channel_id = league.channel.as_ref().filter(|c| !c.is_empty())?;
    if events.is_empty() {
        return None;
    }
    Some(ActivityNotice { league_id: league.id.clone(), channel_id: channel_id.clone(), events })
}

/// Post one announcement per notice. Returns the number of messages sent.
pub async fn notify_new_activity(notifier: &dyn Notifier, notices: &[ActivityNotice]) -> Result<usize> {
    let mut sent = 0;
    for notice in notices {
        for message in format_activity_messages(&notice.events) {
            notifier
                .send(&notice.channel_id, &message)
                .await
                .with_context(|| format!("Failed to notify league {}", notice.league_id))?;
            sent += 1;
        }
    }
    Ok(sent)
}

/// Render events as chat lines, split to fit the message limit.
/// Oldest first so the channel reads chronologically.
pub fn format_activity_messages(events: &[ActivityEvent]) -> Vec<String> {
    let mut lines = Vec::new();
    for event in events.iter().rev() {
        let when = DateTime::from_timestamp_millis(event.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| event.timestamp.to_string());
        lines.push(format!("__{}__", when));
        for action in &event.actions {
            lines.push(format!(
                "**{}** {} {} ({})",
                action.team, action.action, action.player.name, action.player.team
            ));
        }
    }

    chunk_lines(lines.iter().map(String::as_str), MAX_MESSAGE_LENGTH)
}
