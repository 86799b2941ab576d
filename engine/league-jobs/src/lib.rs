//! League Jobs
//!
//! Scheduled jobs that pull league data from the providers, run it through
//! `league-core`, and publish JSON/HTML artifacts to object storage.
//!
//! - `power`: power rankings per ESPN league
//! - `activity`: recent transactions feed plus chat notifications
//! - `projections`: live matchup projections and chart pages
//! - `players`: Sleeper player dump and COVID list with inferred start dates

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod html;
pub mod jobs;
pub mod logging;
pub mod notifier;
pub mod projection_store;
pub mod storage;

pub use config::{JobsConfig, LoggingConfig, StorageConfig};
pub use error::{Result, StorageError};
pub use jobs::JobContext;
pub use notifier::{DiscordNotifier, LogNotifier, Notifier};
pub use projection_store::{InMemoryProjectionStore, PgProjectionStore, ProjectionStore};
pub use storage::{ArtifactStore, InMemoryArtifactStore, S3ArtifactStore};
