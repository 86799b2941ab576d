//! League Fetcher
//!
//! HTTP clients for the ESPN fantasy API and the Sleeper REST/GraphQL APIs.
//! Raw responses are modelled in [`models`] and converted into `league-core`
//! types before they leave this crate.

pub mod config;
pub mod espn;
pub mod models;
pub mod sleeper;

pub use config::{nfl_season_for, EspnConfig, ProviderConfig, SleeperConfig};
pub use espn::EspnClient;
pub use models::*;
pub use sleeper::{team_names_by_roster, SleeperClient, WeekStatLines};
