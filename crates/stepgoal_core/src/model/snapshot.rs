//! Derived display state.

use super::tracker_state::TrackerState;
use serde::{Deserialize, Serialize};

/// Progress bucket shown next to the step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalBadge {
    Far,
    #[serde(rename = "far_25")]
    Far25,
    #[serde(rename = "far_50")]
    Far50,
    #[serde(rename = "far_75")]
    Far75,
    Done,
}

impl GoalBadge {
    /// Buckets a progress percentage; `None` (no goal set) counts as done.
    pub fn from_progress(progress_percent: Option<f64>) -> Self {
        let Some(percent) = progress_percent else {
            return Self::Done;
        };
        if percent >= 100.0 {
            Self::Done
        } else if percent >= 75.0 {
            Self::Far75
        } else if percent >= 50.0 {
            Self::Far50
        } else if percent >= 25.0 {
            Self::Far25
        } else {
            Self::Far
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Far => "far",
            Self::Far25 => "far_25",
            Self::Far50 => "far_50",
            Self::Far75 => "far_75",
            Self::Done => "done",
        }
    }
}

/// Snapshot handed to the presentation layer after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub step_count: u32,
    pub step_goal: u32,
    /// `None` when `step_goal == 0`.
    pub progress_percent: Option<f64>,
    pub reached_goal: bool,
    pub badge: GoalBadge,
}

impl DisplaySnapshot {
    pub fn from_state(state: &TrackerState) -> Self {
        let progress_percent = if state.step_goal == 0 {
            None
        } else {
            Some(f64::from(state.step_count) / f64::from(state.step_goal) * 100.0)
        };

        Self {
            step_count: state.step_count,
            step_goal: state.step_goal,
            progress_percent,
            reached_goal: state.step_count >= state.step_goal,
            badge: GoalBadge::from_progress(progress_percent),
        }
    }

    /// Count line, e.g. `Steps: 5000 / 10000 steps (goal)`.
    pub fn step_line(&self) -> String {
        format!("Steps: {} / {} steps (goal)", self.step_count, self.step_goal)
    }

    /// Progress line, e.g. `Progress: 50.00%`.
    pub fn progress_line(&self) -> String {
        match self.progress_percent {
            Some(percent) => format!("Progress: {percent:.2}%"),
            None => "Progress: --".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplaySnapshot, GoalBadge};
    use crate::model::tracker_state::TrackerState;

    #[test]
    fn half_way_snapshot() {
        let snapshot = DisplaySnapshot::from_state(&TrackerState::new(5_000, 10_000));
        assert_eq!(snapshot.progress_percent, Some(50.0));
        assert!(!snapshot.reached_goal);
        assert_eq!(snapshot.badge, GoalBadge::Far50);
        assert_eq!(snapshot.step_line(), "Steps: 5000 / 10000 steps (goal)");
        assert_eq!(snapshot.progress_line(), "Progress: 50.00%");
    }

    #[test]
    fn goal_reached_exactly() {
        let snapshot = DisplaySnapshot::from_state(&TrackerState::new(10_000, 10_000));
        assert!(snapshot.reached_goal);
        assert_eq!(snapshot.badge, GoalBadge::Done);
    }

    #[test]
    fn zero_goal_has_no_progress_percent() {
        let snapshot = DisplaySnapshot::from_state(&TrackerState::new(42, 0));
        assert_eq!(snapshot.progress_percent, None);
        assert!(snapshot.reached_goal);
        assert_eq!(snapshot.progress_line(), "Progress: --");
    }

    #[test]
    fn badge_thresholds() {
        assert_eq!(GoalBadge::from_progress(Some(0.0)), GoalBadge::Far);
        assert_eq!(GoalBadge::from_progress(Some(24.99)), GoalBadge::Far);
        assert_eq!(GoalBadge::from_progress(Some(25.0)), GoalBadge::Far25);
        assert_eq!(GoalBadge::from_progress(Some(75.0)), GoalBadge::Far75);
        assert_eq!(GoalBadge::from_progress(Some(140.0)), GoalBadge::Done);
    }

    #[test]
    fn badge_wire_names_match_as_str() {
        for badge in [
            GoalBadge::Far,
            GoalBadge::Far25,
            GoalBadge::Far50,
            GoalBadge::Far75,
            GoalBadge::Done,
        ] {
            assert_eq!(serde_json::to_value(badge).unwrap(), badge.as_str());
        }
        assert_eq!(serde_json::to_value(GoalBadge::Far25).unwrap(), "far_25");
        let decoded: GoalBadge = serde_json::from_value(serde_json::json!("far_75")).unwrap();
        assert_eq!(decoded, GoalBadge::Far75);
    }
}
