//! Game clock state used by the live projection blend

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Regulation length assumed by the blend. Overtime is not modelled.
pub const FULL_GAME_SECONDS: u32 = 3600;

const QUARTER_SECONDS: u32 = 15 * 60;
const REGULATION_QUARTERS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClockState {
    pub game_id: String,
    pub status: GameStatus,
    pub seconds_remaining: u32,
}

impl GameClockState {
    pub fn not_started(game_id: impl Into<String>) -> Self {
        Self { game_id: game_id.into(), status: GameStatus::NotStarted, seconds_remaining: FULL_GAME_SECONDS }
    }

    pub fn complete(game_id: impl Into<String>) -> Self {
        Self { game_id: game_id.into(), status: GameStatus::Complete, seconds_remaining: 0 }
    }

    pub fn in_progress(game_id: impl Into<String>, seconds_remaining: u32) -> Self {
        Self {
            game_id: game_id.into(),
            status: GameStatus::InProgress,
            seconds_remaining: seconds_remaining.min(FULL_GAME_SECONDS),
        }
    }

    /// Build an in-progress clock from the quarter number and the `MM:SS`
    /// left in that quarter. Overtime periods count as zero full quarters left.
    pub fn from_quarter_clock(game_id: impl Into<String>, quarter: u32, time_remaining: &str) -> Result<Self> {
        let (minutes, seconds) = time_remaining
            .trim()
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidClock(time_remaining.to_string()))?;
        let minutes: u32 =
            minutes.parse().map_err(|_| CoreError::InvalidClock(time_remaining.to_string()))?;
        let seconds: u32 =
            seconds.parse().map_err(|_| CoreError::InvalidClock(time_remaining.to_string()))?;

        let quarters_left = REGULATION_QUARTERS.saturating_sub(quarter);
        Ok(Self::in_progress(game_id, quarters_left * QUARTER_SECONDS + minutes * 60 + seconds))
    }

    /// Fraction of regulation still to play, in `[0, 1]`
    pub fn fraction_remaining(&self) -> f64 {
        self.seconds_remaining as f64 / FULL_GAME_SECONDS as f64
    }
}
