//! # League Core
//!
//! Domain types and the pure computations shared by the league jobs:
//!
//! - **projection**: live blended score estimate for a player in an in-progress game
//! - **activity**: incremental merge of the recent-activity feed
//! - **status**: day-over-day injury status diff with start date inference
//! - **matchup**: grouping of weekly projection snapshots into two-team series
//! - **power**: two-step dominance power rankings
//!
//! Nothing in this crate performs I/O. Callers load documents, hand them to
//! these functions and write back whatever comes out.

pub mod activity;
pub mod clock;
pub mod error;
pub mod matchup;
pub mod models;
pub mod power;
pub mod projection;
pub mod status;

pub use activity::{merge_activity, MergeOutcome};
pub use clock::{GameClockState, GameStatus, FULL_GAME_SECONDS};
pub use error::{CoreError, Result};
pub use matchup::{group_by_matchup, MatchupSeries};
pub use models::*;
pub use power::{power_rankings, CompletedGame, PowerRanking};
pub use projection::{estimate_live_score, project_roster};
pub use status::{diff_and_infer_start, is_covid_status, PlayerStatus, StatusSnapshot, UNKNOWN_START_DATE};
