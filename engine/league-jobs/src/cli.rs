//! # Command Line Interface
//!
//! One subcommand per scheduled job, plus `all` to run them back to back.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::jobs::{run_activity_job, run_players_job, run_power_job, run_projections_job, JobContext};
use crate::projection_store::PgProjectionStore;

#[derive(Parser)]
#[command(name = "league-jobs")]
#[command(about = "Scheduled fantasy football league jobs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Publish power rankings
    Power,
    /// Merge recent transactions and announce new ones
    Activity,
    /// Record live projections and render chart pages
    Projections,
    /// Refresh the player dump and COVID list
    Players,
    /// Run every job in turn
    All,
}

/// Runs jobs against a prepared context
pub struct CliHandler {
    ctx: JobContext,
}

impl CliHandler {
    pub fn new(ctx: JobContext) -> Self {
        Self { ctx }
    }

    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Power => self.power().await,
            Commands::Activity => self.activity().await,
            Commands::Projections => self.projections().await,
            Commands::Players => self.players().await,
            Commands::All => {
                self.power().await?;
                self.activity().await?;
                self.projections().await?;
                self.players().await
            }
        }
    }

    async fn power(&self) -> Result<()> {
        info!("Running power rankings job");
        run_power_job(&self.ctx).await
    }

    async fn activity(&self) -> Result<()> {
        info!("Running recent activity job");
        let notices = run_activity_job(&self.ctx).await?;
        info!("Announced new activity for {} leagues", notices.len());
        Ok(())
    }

    async fn projections(&self) -> Result<()> {
        info!("Running projections job");
        let database_url =
            self.ctx.config.database_url.as_deref().context("DATABASE_URL is required for the projections job")?;
        let store = PgProjectionStore::connect(database_url)
            .await
            .context("Failed to connect to the projections database")?;
        run_projections_job(&self.ctx, &store).await
    }

    async fn players(&self) -> Result<()> {
        info!("Running player status job");
        run_players_job(&self.ctx).await
    }
}
