use anyhow::{Context, Result};
use clap::Parser;
use league_jobs::cli::{Cli, CliHandler};
use league_jobs::logging::initialize_logging;
use league_jobs::{ArtifactStore, DiscordNotifier, JobContext, JobsConfig, LogNotifier, Notifier, S3ArtifactStore};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = JobsConfig::from_env().context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("Starting league-jobs v{} ({:?})", env!("CARGO_PKG_VERSION"), cli.command);
    info!("Configured leagues: {}", config.leagues.len());

    let artifacts: Arc<dyn ArtifactStore> = Arc::new(S3ArtifactStore::new(&config.storage).await);
    let notifier: Arc<dyn Notifier> = match &config.discord_bot_token {
        Some(token) => Arc::new(DiscordNotifier::new(token.clone())?),
        None => {
            warn!("DISCORD_BOT_TOKEN not set, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let handler = CliHandler::new(JobContext::new(config, artifacts, notifier));
    if let Err(e) = handler.handle_command(cli.command).await {
        error!("Job failed: {:#}", e);
        return Err(e);
    }

    info!("Done");
    Ok(())
}
