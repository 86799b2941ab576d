//! Job configuration
//!
//! Everything is read from the environment once at startup and passed into
//! the jobs explicitly.

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment};
use league_core::LeagueDescriptor;
use league_fetcher::{nfl_season_for, ProviderConfig};
use serde::Deserialize;

const DEFAULT_PUBLIC_URL: &str = "https://storage.googleapis.com";

/// Raw settings as they appear in the environment
#[derive(Debug, Clone, Deserialize)]
pub struct JobsSettings {
    /// JSON list of `{id, type, channel?}`
    pub league_config: String,

    #[serde(default)]
    pub espn_s2: String,

    #[serde(default)]
    pub espn_swid: String,

    #[serde(default)]
    pub espn_season: Option<u32>,

    #[serde(default)]
    pub sleeper_token: String,

    pub artifact_bucket: String,

    #[serde(default)]
    pub projections_bucket: Option<String>,

    #[serde(default)]
    pub artifact_endpoint: Option<String>,

    #[serde(default)]
    pub artifact_public_url: Option<String>,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub discord_bot_token: Option<String>,

    /// IANA zone name
    #[serde(default = "default_status_timezone")]
    pub status_timezone: String,

    #[serde(default = "default_recent_activity_size")]
    pub recent_activity_size: u32,

    #[serde(default)]
    pub rust_log: Option<String>,

    #[serde(default)]
    pub log_format: Option<String>,
}

fn default_status_timezone() -> String {
    "America/New_York".to_string()
}

fn default_recent_activity_size() -> u32 {
    100
}

/// Object storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket for JSON artifacts
    pub artifact_bucket: String,

    /// Bucket for projection chart pages
    pub projections_bucket: String,

    /// Custom S3-compatible endpoint
    pub endpoint: Option<String>,

    /// Base URL objects are publicly reachable under, without the bucket
    pub public_url_base: String,
}

impl StorageConfig {
    /// Public URL of an object in the projections bucket
    pub fn projections_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url_base.trim_end_matches('/'), self.projections_bucket, key)
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error or a full EnvFilter string)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

/// Configuration handed to every job
#[derive(Debug, Clone)]
pub struct JobsConfig {
    pub leagues: Vec<LeagueDescriptor>,
    pub providers: ProviderConfig,
    pub storage: StorageConfig,
    pub database_url: Option<String>,
    pub discord_bot_token: Option<String>,

    /// Zone "today" is evaluated in for the player status job
    pub status_timezone: Tz,

    pub recent_activity_size: u32,
    pub logging: LoggingConfig,
}

impl JobsConfig {
    /// Load configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let source = Config::builder()
            .add_source(Environment::default())
            .build()
            .context("Failed to read environment configuration")?;

        Self::from_source(source)
    }

    /// Build from an already assembled `config` source
    pub fn from_source(source: Config) -> Result<Self> {
        let settings: JobsSettings = source
            .try_deserialize()
            .context("Missing or invalid job settings (LEAGUE_CONFIG and ARTIFACT_BUCKET are required)")?;
        Self::from_settings(settings)
    }

    pub fn from_settings(settings: JobsSettings) -> Result<Self> {
        let leagues: Vec<LeagueDescriptor> =
            serde_json::from_str(&settings.league_config).context("LEAGUE_CONFIG is not a valid league list")?;

        let mut providers = ProviderConfig::default();
        providers.espn.s2 = settings.espn_s2;
        providers.espn.swid = settings.espn_swid;
        providers.espn.season = settings
            .espn_season
            .unwrap_or_else(|| nfl_season_for(chrono::Utc::now().date_naive()));
        providers.sleeper.token = settings.sleeper_token;

        let status_timezone: Tz = settings
            .status_timezone
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid STATUS_TIMEZONE {:?}: {}", settings.status_timezone, e))?;

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let storage = StorageConfig {
            projections_bucket: non_empty(settings.projections_bucket)
                .unwrap_or_else(|| settings.artifact_bucket.clone()),
            artifact_bucket: settings.artifact_bucket,
            endpoint: non_empty(settings.artifact_endpoint),
            public_url_base: non_empty(settings.artifact_public_url)
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
        };

        Ok(Self {
            leagues,
            providers,
            storage,
            database_url: non_empty(settings.database_url),
            discord_bot_token: non_empty(settings.discord_bot_token),
            status_timezone,
            recent_activity_size: settings.recent_activity_size,
            logging: LoggingConfig {
                level: non_empty(settings.rust_log).unwrap_or_else(|| "info".to_string()),
                format: non_empty(settings.log_format).unwrap_or_else(|| "compact".to_string()),
            },
        })
    }
}
