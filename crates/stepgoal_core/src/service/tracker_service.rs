//! Step count and goal tracking.
//!
//! # Responsibility
//! - Own the in-memory `TrackerState` and flush it on every mutation.
//! - Apply sensor readings, goal edits and daily rollover.
//! - Derive `DisplaySnapshot` on demand.
//!
//! # Invariants
//! - Loading never fails: missing or unreadable keys resolve to defaults.
//! - Store writes are fire-and-forget. A failed write is logged and the
//!   in-memory state still changes.
//! - `on_daily_rollover` is a no-op when called again with the same date.
//! - In `SensorMode::Raw` a reading overwrites the step count with the
//!   lifetime value, so a rollover reset only lasts until the next reading.
//! - In `SensorMode::DailyBaseline` a reading lower than the previous one is
//!   a counter restart; today's count keeps growing from where it was.

use crate::model::snapshot::DisplaySnapshot;
use crate::model::tracker_state::{SensorMode, TrackerState};
use crate::store::{KeyValueStore, DEFAULT_NAMESPACE};
use chrono::NaiveDate;
use log::{debug, error, info, warn};

pub const STEP_COUNT_KEY: &str = "step_count";
pub const STEP_GOAL_KEY: &str = "step_goal";
pub const LAST_RESET_DATE_KEY: &str = "last_reset_date";
pub const SENSOR_BASELINE_KEY: &str = "sensor_baseline";
pub const SENSOR_LAST_CUMULATIVE_KEY: &str = "sensor_last_cumulative";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Options shared by every tracker surface (CLI, FFI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Preference namespace the tracker keys live under.
    pub namespace: String,
    pub sensor_mode: SensorMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            sensor_mode: SensorMode::default(),
        }
    }
}

/// Stateful step/goal tracker over a key-value store.
pub struct StepGoalTracker<S: KeyValueStore> {
    store: S,
    state: TrackerState,
    mode: SensorMode,
}

impl<S: KeyValueStore> StepGoalTracker<S> {
    /// Loads persisted state in the default `Raw` sensor mode.
    pub fn load(store: S) -> Self {
        Self::load_with_mode(store, SensorMode::Raw)
    }

    /// Loads persisted state; defaults are 0 steps, 0 goal, no reset date.
    pub fn load_with_mode(store: S, mode: SensorMode) -> Self {
        let state = TrackerState {
            step_count: read_count(&store, STEP_COUNT_KEY),
            step_goal: read_count(&store, STEP_GOAL_KEY),
            last_reset_date: read_date(&store, LAST_RESET_DATE_KEY),
            sensor_baseline: read_sensor_int(&store, mode, SENSOR_BASELINE_KEY),
            last_cumulative: read_sensor_int(&store, mode, SENSOR_LAST_CUMULATIVE_KEY)
                .and_then(|value| u32::try_from(value).ok()),
        };

        info!(
            "event=tracker_load module=tracker status=ok mode={} step_count={} step_goal={} has_reset_date={}",
            mode.as_str(),
            state.step_count,
            state.step_goal,
            state.last_reset_date.is_some()
        );

        Self { store, state, mode }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn sensor_mode(&self) -> SensorMode {
        self.mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot::from_state(&self.state)
    }

    /// Zeroes the daily count when `today` differs from the last reset date.
    ///
    /// Returns `true` when a reset happened.
    pub fn on_daily_rollover(&mut self, today: NaiveDate) -> bool {
        if self.state.last_reset_date == Some(today) {
            return false;
        }

        self.state.step_count = 0;
        self.persist_count(STEP_COUNT_KEY, 0);
        self.state.last_reset_date = Some(today);
        self.persist_date(today);

        if self.mode == SensorMode::DailyBaseline {
            self.rebase_on_last_reading();
        }

        info!(
            "event=daily_rollover module=tracker status=ok date={}",
            today.format(DATE_FORMAT)
        );
        true
    }

    /// Applies a cumulative step-counter reading.
    pub fn on_sensor_reading(&mut self, cumulative_steps: u32) -> DisplaySnapshot {
        let step_count = match self.mode {
            SensorMode::Raw => cumulative_steps,
            SensorMode::DailyBaseline => self.steps_since_baseline(cumulative_steps),
        };

        self.state.step_count = step_count;
        self.persist_count(STEP_COUNT_KEY, step_count);
        debug!(
            "event=sensor_reading module=tracker status=ok cumulative={} step_count={}",
            cumulative_steps, step_count
        );
        self.snapshot()
    }

    /// Sets the goal from raw text input.
    ///
    /// Input that is not a non-negative integer is ignored and `None` is
    /// returned; the previous goal stays in effect.
    pub fn set_goal(&mut self, input: &str) -> Option<DisplaySnapshot> {
        match input.parse::<u32>() {
            Ok(goal) => Some(self.set_goal_value(goal)),
            Err(_) => {
                debug!(
                    "event=goal_edit module=tracker status=ignored input_len={}",
                    input.len()
                );
                None
            }
        }
    }

    pub fn set_goal_value(&mut self, goal: u32) -> DisplaySnapshot {
        self.state.step_goal = goal;
        self.persist_count(STEP_GOAL_KEY, goal);
        info!("event=goal_edit module=tracker status=ok step_goal={goal}");
        self.snapshot()
    }

    /// Zeroes the step count without touching the rollover date.
    pub fn clear_step_count(&mut self) -> DisplaySnapshot {
        self.state.step_count = 0;
        self.persist_count(STEP_COUNT_KEY, 0);
        if self.mode == SensorMode::DailyBaseline {
            self.rebase_on_last_reading();
        }
        info!("event=step_count_clear module=tracker status=ok");
        self.snapshot()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn steps_since_baseline(&mut self, cumulative_steps: u32) -> u32 {
        let cumulative = i64::from(cumulative_steps);
        let previous = self
            .state
            .last_cumulative
            .map(i64::from)
            .or(self.state.sensor_baseline);

        let baseline = match (self.state.sensor_baseline, previous) {
            (_, Some(previous)) if cumulative < previous => {
                // Counter restarted from zero: everything it counted since
                // the restart is added on top of today's count.
                let rebased = -i64::from(self.state.step_count);
                info!(
                    "event=sensor_rebase module=tracker status=ok reason=counter_reset baseline={rebased}"
                );
                self.store_baseline(Some(rebased));
                rebased
            }
            (Some(baseline), _) => baseline,
            (None, _) => {
                self.store_baseline(Some(cumulative));
                cumulative
            }
        };

        self.store_last_cumulative(cumulative_steps);
        u32::try_from((cumulative - baseline).max(0)).unwrap_or(u32::MAX)
    }

    /// Today's zero becomes the last lifetime value seen, so steps taken
    /// before the next reading still count.
    fn rebase_on_last_reading(&mut self) {
        let baseline = self.state.last_cumulative.map(i64::from);
        self.store_baseline(baseline);
    }

    fn store_baseline(&mut self, baseline: Option<i64>) {
        self.state.sensor_baseline = baseline;
        let result = match baseline {
            Some(value) => self.store.put_int(SENSOR_BASELINE_KEY, value),
            None => self.store.remove(SENSOR_BASELINE_KEY),
        };
        if let Err(err) = result {
            log_write_error(SENSOR_BASELINE_KEY, &err);
        }
    }

    fn store_last_cumulative(&mut self, cumulative_steps: u32) {
        self.state.last_cumulative = Some(cumulative_steps);
        if let Err(err) = self
            .store
            .put_int(SENSOR_LAST_CUMULATIVE_KEY, i64::from(cumulative_steps))
        {
            log_write_error(SENSOR_LAST_CUMULATIVE_KEY, &err);
        }
    }

    fn persist_count(&self, key: &str, value: u32) {
        if let Err(err) = self.store.put_int(key, i64::from(value)) {
            log_write_error(key, &err);
        }
    }

    fn persist_date(&self, date: NaiveDate) {
        let value = date.format(DATE_FORMAT).to_string();
        if let Err(err) = self.store.put_string(LAST_RESET_DATE_KEY, &value) {
            log_write_error(LAST_RESET_DATE_KEY, &err);
        }
    }
}

fn log_write_error(key: &str, err: &dyn std::error::Error) {
    error!(
        "event=store_write module=tracker status=error key={} error_code=store_write_failed error={}",
        key, err
    );
}

fn read_count(store: &impl KeyValueStore, key: &str) -> u32 {
    match store.get_int(key) {
        Ok(None) => 0,
        Ok(Some(value)) => u32::try_from(value).unwrap_or_else(|_| {
            warn!(
                "event=tracker_load module=tracker status=defaulted key={} reason=out_of_range value={}",
                key, value
            );
            0
        }),
        Err(err) => {
            warn!(
                "event=tracker_load module=tracker status=defaulted key={} reason=read_failed error={}",
                key, err
            );
            0
        }
    }
}

fn read_date(store: &impl KeyValueStore, key: &str) -> Option<NaiveDate> {
    let raw = match store.get_string(key) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(
                "event=tracker_load module=tracker status=defaulted key={} reason=read_failed error={}",
                key, err
            );
            return None;
        }
    };

    match NaiveDate::parse_from_str(raw.as_str(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(
                "event=tracker_load module=tracker status=defaulted key={} reason=unparseable_date",
                key
            );
            None
        }
    }
}

fn read_sensor_int(store: &impl KeyValueStore, mode: SensorMode, key: &str) -> Option<i64> {
    if mode != SensorMode::DailyBaseline {
        return None;
    }
    match store.get_int(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=tracker_load module=tracker status=defaulted key={} reason=read_failed error={}",
                key, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        StepGoalTracker, TrackerConfig, LAST_RESET_DATE_KEY, SENSOR_BASELINE_KEY,
        SENSOR_LAST_CUMULATIVE_KEY, STEP_COUNT_KEY, STEP_GOAL_KEY,
    };
    use crate::model::tracker_state::SensorMode;
    use crate::store::{KeyValueStore, MemoryStore, StoreError, StoreResult};
    use chrono::NaiveDate;

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get_int(&self, _key: &str) -> StoreResult<Option<i64>> {
            Ok(None)
        }

        fn put_int(&self, key: &str, _value: i64) -> StoreResult<()> {
            Err(StoreError::InvalidData(format!("read-only: {key}")))
        }

        fn get_string(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn put_string(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::InvalidData(format!("read-only: {key}")))
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            Err(StoreError::InvalidData(format!("read-only: {key}")))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
    }

    #[test]
    fn load_defaults_when_store_is_empty() {
        let tracker = StepGoalTracker::load(MemoryStore::new());
        let state = tracker.state();
        assert_eq!(state.step_count, 0);
        assert_eq!(state.step_goal, 0);
        assert_eq!(state.last_reset_date, None);
        assert_eq!(tracker.sensor_mode(), SensorMode::Raw);
    }

    #[test]
    fn load_defaults_out_of_range_and_mistyped_values() {
        let store = MemoryStore::new();
        store.put_int(STEP_COUNT_KEY, -5).unwrap();
        store.put_string(STEP_GOAL_KEY, "ten thousand").unwrap();
        store.put_string(LAST_RESET_DATE_KEY, "not-a-date").unwrap();

        let tracker = StepGoalTracker::load(&store);
        assert_eq!(tracker.state().step_count, 0);
        assert_eq!(tracker.state().step_goal, 0);
        assert_eq!(tracker.state().last_reset_date, None);
    }

    #[test]
    fn sensor_reading_overwrites_and_persists() {
        let store = MemoryStore::new();
        let mut tracker = StepGoalTracker::load(&store);

        tracker.on_sensor_reading(120);
        tracker.on_sensor_reading(150);

        assert_eq!(tracker.state().step_count, 150);
        assert_eq!(store.get_int(STEP_COUNT_KEY).unwrap(), Some(150));
    }

    #[test]
    fn raw_mode_reading_after_rollover_restores_lifetime_value() {
        let mut tracker = StepGoalTracker::load(MemoryStore::new());
        tracker.on_sensor_reading(8_000);

        assert!(tracker.on_daily_rollover(date(2026, 3, 2)));
        assert_eq!(tracker.state().step_count, 0);

        tracker.on_sensor_reading(8_010);
        assert_eq!(tracker.state().step_count, 8_010);
    }

    #[test]
    fn set_goal_ignores_invalid_input() {
        let mut tracker = StepGoalTracker::load(MemoryStore::new());
        tracker.set_goal("500").expect("numeric goal should apply");

        for input in ["", "abc", "-10", "12.5", " 40", "99999999999"] {
            assert!(tracker.set_goal(input).is_none(), "input {input:?}");
            assert_eq!(tracker.state().step_goal, 500);
        }
    }

    #[test]
    fn write_failures_still_update_memory() {
        let mut tracker = StepGoalTracker::load(ReadOnlyStore);
        tracker.on_sensor_reading(42);
        tracker.set_goal_value(100);
        assert!(tracker.on_daily_rollover(date(2026, 1, 1)));

        assert_eq!(tracker.state().step_count, 0);
        assert_eq!(tracker.state().step_goal, 100);
        assert_eq!(tracker.state().last_reset_date, Some(date(2026, 1, 1)));
    }

    #[test]
    fn clear_keeps_reset_date() {
        let store = MemoryStore::new();
        let mut tracker = StepGoalTracker::load(&store);
        tracker.on_daily_rollover(date(2026, 5, 5));
        tracker.on_sensor_reading(77);

        let snapshot = tracker.clear_step_count();
        assert_eq!(snapshot.step_count, 0);
        assert_eq!(store.get_int(STEP_COUNT_KEY).unwrap(), Some(0));
        assert_eq!(tracker.state().last_reset_date, Some(date(2026, 5, 5)));
    }

    #[test]
    fn daily_baseline_counts_from_first_reading_on_fresh_store() {
        let store = MemoryStore::new();
        let mut tracker = StepGoalTracker::load_with_mode(&store, SensorMode::DailyBaseline);
        tracker.on_daily_rollover(date(2026, 4, 1));

        assert_eq!(tracker.on_sensor_reading(10_000).step_count, 0);
        assert_eq!(tracker.on_sensor_reading(10_250).step_count, 250);
        assert_eq!(store.get_int(SENSOR_BASELINE_KEY).unwrap(), Some(10_000));
        assert_eq!(
            store.get_int(SENSOR_LAST_CUMULATIVE_KEY).unwrap(),
            Some(10_250)
        );

        tracker.on_daily_rollover(date(2026, 4, 2));
        assert_eq!(store.get_int(SENSOR_BASELINE_KEY).unwrap(), Some(10_250));
        assert_eq!(tracker.on_sensor_reading(10_300).step_count, 50);
        assert_eq!(tracker.on_sensor_reading(10_400).step_count, 150);
    }

    #[test]
    fn daily_baseline_rollover_keeps_steps_before_first_reading() {
        let mut tracker =
            StepGoalTracker::load_with_mode(MemoryStore::new(), SensorMode::DailyBaseline);
        tracker.on_sensor_reading(1_000);
        assert_eq!(tracker.on_sensor_reading(1_200).step_count, 200);

        assert!(tracker.on_daily_rollover(date(2026, 4, 2)));
        assert_eq!(tracker.state().step_count, 0);

        // 300 steps walked after midnight, delivered in one reading.
        assert_eq!(tracker.on_sensor_reading(1_500).step_count, 300);
    }

    #[test]
    fn daily_baseline_clear_counts_from_last_reading() {
        let mut tracker =
            StepGoalTracker::load_with_mode(MemoryStore::new(), SensorMode::DailyBaseline);
        tracker.on_sensor_reading(400);
        tracker.on_sensor_reading(900);

        assert_eq!(tracker.clear_step_count().step_count, 0);
        assert_eq!(tracker.on_sensor_reading(950).step_count, 50);
    }

    #[test]
    fn daily_baseline_survives_reboot() {
        let mut tracker =
            StepGoalTracker::load_with_mode(MemoryStore::new(), SensorMode::DailyBaseline);
        tracker.on_sensor_reading(5_000);
        tracker.on_sensor_reading(5_300);

        // Counter restarted from zero after reboot.
        assert_eq!(tracker.on_sensor_reading(20).step_count, 320);
        assert_eq!(tracker.on_sensor_reading(70).step_count, 370);
    }

    #[test]
    fn daily_baseline_reboot_above_old_baseline_keeps_count() {
        let mut tracker =
            StepGoalTracker::load_with_mode(MemoryStore::new(), SensorMode::DailyBaseline);
        tracker.on_sensor_reading(100);
        assert_eq!(tracker.on_sensor_reading(5_000).step_count, 4_900);

        // After the restart the counter is back above the old baseline (100)
        // but below the last reading.
        assert_eq!(tracker.on_sensor_reading(300).step_count, 5_200);
        assert_eq!(tracker.on_sensor_reading(400).step_count, 5_300);
    }

    #[test]
    fn daily_baseline_is_reloaded() {
        let store = MemoryStore::new();
        {
            let mut tracker = StepGoalTracker::load_with_mode(&store, SensorMode::DailyBaseline);
            tracker.on_sensor_reading(1_000);
            tracker.on_sensor_reading(1_040);
        }

        let mut reloaded = StepGoalTracker::load_with_mode(&store, SensorMode::DailyBaseline);
        assert_eq!(reloaded.state().sensor_baseline, Some(1_000));
        assert_eq!(reloaded.state().last_cumulative, Some(1_040));
        assert_eq!(reloaded.on_sensor_reading(1_100).step_count, 100);
        // A reload must still spot the restart.
        assert_eq!(reloaded.on_sensor_reading(10).step_count, 110);
    }

    #[test]
    fn default_config_uses_step_tracker_namespace() {
        let config = TrackerConfig::default();
        assert_eq!(config.namespace, "step_tracker");
        assert_eq!(config.sensor_mode, SensorMode::Raw);
    }
}
