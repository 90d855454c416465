//! Persisted tracker state.
//!
//! # Invariants
//! - `step_count` and `step_goal` are independent; the goal may be exceeded.
//! - `last_reset_date == None` means no rollover has happened yet.
//! - `sensor_baseline` and `last_cumulative` are only meaningful in
//!   `SensorMode::DailyBaseline`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How cumulative sensor readings map onto the daily step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    /// Step count is overwritten with the lifetime sensor value.
    ///
    /// A rollover zeroes the count but the next reading restores the
    /// lifetime value.
    #[default]
    Raw,
    /// Step count is the lifetime value minus the last reading seen before
    /// the most recent rollover (or the first reading ever, on a fresh store).
    DailyBaseline,
}

impl SensorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::DailyBaseline => "daily_baseline",
        }
    }

    /// Parses `raw` or `daily_baseline` (dash form accepted), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "daily_baseline" | "daily-baseline" => Some(Self::DailyBaseline),
            _ => None,
        }
    }
}

/// Mutable tracker state flushed to the preference store on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackerState {
    pub step_count: u32,
    pub step_goal: u32,
    pub last_reset_date: Option<NaiveDate>,
    /// Lifetime sensor value that counts as zero for the current day. May be
    /// negative after a device reboot so the daily count stays continuous.
    pub sensor_baseline: Option<i64>,
    /// Most recent lifetime sensor value. A lower reading means the counter
    /// restarted.
    pub last_cumulative: Option<u32>,
}

impl TrackerState {
    pub fn new(step_count: u32, step_goal: u32) -> Self {
        Self {
            step_count,
            step_goal,
            ..Self::default()
        }
    }
}
