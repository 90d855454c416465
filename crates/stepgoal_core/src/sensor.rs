//! Step-counter sensor contract.
//!
//! # Responsibility
//! - Convert raw platform readings into step counts.
//! - Classify accuracy notifications (logged only, never acted upon).
//!
//! # Invariants
//! - Readings are cumulative since device boot, not deltas.
//! - Non-finite or negative raw values never reach the tracker.

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

/// One cumulative step-counter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub cumulative_steps: u32,
}

impl SensorReading {
    /// Converts the float value delivered by the platform, truncating any
    /// fractional part.
    ///
    /// Returns `None` for NaN, infinite, or negative values.
    pub fn from_raw(value: f32) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            warn!("event=sensor_reading module=sensor status=rejected raw_value={value}");
            return None;
        }
        // `as` saturates at u32::MAX for out-of-range floats.
        Some(Self {
            cumulative_steps: value as u32,
        })
    }
}

/// Accuracy levels reported alongside step-counter readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorAccuracy {
    Unreliable,
    Low,
    Medium,
    High,
}

impl SensorAccuracy {
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Unreliable),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreliable => "UNRELIABLE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Logs an accuracy notification and returns the parsed level.
pub fn log_accuracy_change(ordinal: i32) -> Option<SensorAccuracy> {
    match SensorAccuracy::from_ordinal(ordinal) {
        Some(accuracy) => {
            debug!(
                "event=sensor_accuracy module=sensor status=ok accuracy={}",
                accuracy.as_str()
            );
            Some(accuracy)
        }
        None => {
            debug!("event=sensor_accuracy module=sensor status=ignored ordinal={ordinal}");
            None
        }
    }
}

/// Whether the device exposes a step-counter sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorAvailability {
    Available,
    Missing,
}

impl SensorAvailability {
    /// Logs a missing sensor; tracking then stays inactive.
    pub fn check(self) -> bool {
        match self {
            Self::Available => true,
            Self::Missing => {
                error!(
                    "event=sensor_lookup module=sensor status=error error_code=step_counter_missing"
                );
                false
            }
        }
    }
}
