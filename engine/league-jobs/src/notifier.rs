//! Outbound chat notifications

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::info;

/// Discord rejects messages longer than this
pub const MAX_MESSAGE_LENGTH: usize = 2000;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `content` to a channel
    async fn send(&self, channel_id: &str, content: &str) -> Result<()>;
}

/// Posts through the Discord REST API as a bot
pub struct DiscordNotifier {
    bot_token: String,
    api_base_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { bot_token: bot_token.into(), api_base_url: DISCORD_API_BASE.to_string(), client })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: &str, content: &str) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.api_base_url, channel_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "content": content }))
            .send()
            .await
            .with_context(|| format!("Failed to post to channel {}", channel_id))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Discord returned {} for channel {}: {}", status, channel_id, body);
        }

        info!("Posted {} chars to channel {}", content.len(), channel_id);
        Ok(())
    }
}

/// Used when no bot token is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, channel_id: &str, content: &str) -> Result<()> {
        info!("Notifications disabled, would post to channel {}:\n{}", channel_id, content);
        Ok(())
    }
}

/// Pack lines into messages no longer than `limit` characters.
///
/// A single line over the limit is split on character boundaries.
pub fn chunk_lines<'a>(lines: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = String::new();

    for line in lines {
        for piece in split_long_line(line, limit) {
            let needed = if current.is_empty() { piece.chars().count() } else { piece.chars().count() + 1 };
            if !current.is_empty() && current.chars().count() + needed > limit {
                messages.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&piece);
        }
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

fn split_long_line(line: &str, limit: usize) -> Vec<String> {
    if line.chars().count() <= limit {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(limit.max(1)).map(|chunk| chunk.iter().collect()).collect()
}
