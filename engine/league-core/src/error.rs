//! Error types for the league core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the pure league computations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// League type other than the supported providers
    #[error("Unsupported league type: {0}")]
    UnsupportedProvider(String),

    /// A matchup did not resolve to exactly two teams
    #[error("Matchup {matchup_id} has {team_count} distinct teams, expected 2")]
    MatchupTeamCount { matchup_id: u32, team_count: usize },

    /// Game clock string could not be parsed
    #[error("Invalid game clock '{0}'")]
    InvalidClock(String),
}
