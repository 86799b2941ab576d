//! Logging and tracing setup

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging from the job configuration.
///
/// `RUST_LOG` syntax is accepted for the level; the format is one of
/// `json`, `pretty` or anything else for the compact default.
pub fn initialize_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .boxed(),
        _ => fmt::layer()
            .compact()
            .with_target(false)
            .with_ansi(true)
            .boxed(),
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    Ok(())
}
