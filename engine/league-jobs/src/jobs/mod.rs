//! Scheduled jobs
//!
//! Each job reads its previous state, computes the next document with a pure
//! function and writes it back. Adapters live on [`JobContext`].

pub mod activity;
pub mod players;
pub mod power;
pub mod projections;

use anyhow::{Context, Result};
use league_core::LeagueDescriptor;
use league_fetcher::{EspnClient, SleeperClient};
use std::sync::Arc;

use crate::config::JobsConfig;
use crate::notifier::Notifier;
use crate::storage::ArtifactStore;

pub use activity::{notify_new_activity, run_activity_job, ActivityNotice, ActivitySource};
pub use players::run_players_job;
pub use power::run_power_job;
pub use projections::run_projections_job;

/// Configuration and adapters shared by every job
#[derive(Clone)]
pub struct JobContext {
    pub config: JobsConfig,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl JobContext {
    pub fn new(config: JobsConfig, artifacts: Arc<dyn ArtifactStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { config, artifacts, notifier }
    }

    pub fn espn_client(&self, league: &LeagueDescriptor) -> Result<EspnClient> {
        let league_id: u64 = league
            .id
            .parse()
            .with_context(|| format!("ESPN league id {:?} is not numeric", league.id))?;
        EspnClient::new(self.config.providers.espn.clone(), league_id, self.config.providers.request_timeout_secs)
    }

    pub fn sleeper_client(&self) -> Result<SleeperClient> {
        SleeperClient::new(self.config.providers.sleeper.clone(), self.config.providers.request_timeout_secs)
    }
}
