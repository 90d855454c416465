//! FFI use-case API for the Flutter step tracker screens.
//!
//! # Responsibility
//! - Expose stable, use-case-level tracker and scan functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every tracker call opens the preference DB, applies one mutation and
//!   returns the resulting snapshot.

use chrono::NaiveDate;
use log::warn;
use stepgoal_core::db::open_db;
use stepgoal_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    route_scan_results, ContactInfo, DisplaySnapshot, OpenError, ScannedCode, SensorMode,
    SensorReading, SqlitePreferenceStore, StepGoalTracker, TrackerConfig, UrlOpener,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const TRACKER_DB_FILE_NAME: &str = "step_tracker.sqlite3";
static TRACKER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static TRACKER_CONFIG: OnceLock<TrackerConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Tracker display state returned by every tracker call.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshotResponse {
    /// Whether the call was applied. `false` for ignored input or DB failure.
    pub ok: bool,
    pub message: String,
    pub step_count: u32,
    pub step_goal: u32,
    /// `None` while no goal is set.
    pub progress_percent: Option<f64>,
    pub reached_goal: bool,
    /// One of `far|far_25|far_50|far_75|done`.
    pub badge: String,
    /// Preformatted `Steps: N / G steps (goal)` line.
    pub step_line: String,
    /// Preformatted `Progress: P%` line.
    pub progress_line: String,
}

impl StepSnapshotResponse {
    fn from_snapshot(ok: bool, message: impl Into<String>, snapshot: &DisplaySnapshot) -> Self {
        Self {
            ok,
            message: message.into(),
            step_count: snapshot.step_count,
            step_goal: snapshot.step_goal,
            progress_percent: snapshot.progress_percent,
            reached_goal: snapshot.reached_goal,
            badge: snapshot.badge.as_str().to_string(),
            step_line: snapshot.step_line(),
            progress_line: snapshot.progress_line(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self::from_snapshot(false, message, &DisplaySnapshot::from_state(&Default::default()))
    }
}

/// Scan display envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDisplayResponse {
    /// `false` when the code had nothing to display (blank URL).
    pub ok: bool,
    pub type_label: String,
    pub content: String,
    /// URL the host should open in the browser, if any.
    pub open_url: Option<String>,
}

/// Returns the current snapshot without mutating state.
#[flutter_rust_bridge::frb(sync)]
pub fn tracker_snapshot() -> StepSnapshotResponse {
    run_tracker("tracker_snapshot", |tracker| {
        (true, "Loaded.", tracker.snapshot())
    })
}

/// Applies one raw step-counter reading from the platform sensor.
#[flutter_rust_bridge::frb(sync)]
pub fn tracker_on_sensor_reading(raw_value: f32) -> StepSnapshotResponse {
    run_tracker("tracker_on_sensor_reading", |tracker| {
        match SensorReading::from_raw(raw_value) {
            Some(reading) => (
                true,
                "Reading applied.",
                tracker.on_sensor_reading(reading.cumulative_steps),
            ),
            None => (false, "Reading rejected.", tracker.snapshot()),
        }
    })
}

/// Applies goal text from the goal input field.
#[flutter_rust_bridge::frb(sync)]
pub fn tracker_set_goal(text: String) -> StepSnapshotResponse {
    run_tracker("tracker_set_goal", |tracker| match tracker.set_goal(text.as_str()) {
        Some(snapshot) => (true, "Goal updated.", snapshot),
        None => (false, "Goal unchanged.", tracker.snapshot()),
    })
}

/// Runs the daily rollover for `today` (`YYYY-MM-DD`).
///
/// An unparseable date leaves state untouched and returns `ok = false` with
/// the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn tracker_daily_rollover(today: String) -> StepSnapshotResponse {
    run_tracker("tracker_daily_rollover", |tracker| {
        let Ok(today) = NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d") else {
            warn!("event=daily_rollover module=ffi status=rejected reason=invalid_date");
            return (false, "Invalid date.", tracker.snapshot());
        };
        let message = if tracker.on_daily_rollover(today) {
            "Step count reset."
        } else {
            "Already reset today."
        };
        (true, message, tracker.snapshot())
    })
}

/// Clears the step count.
#[flutter_rust_bridge::frb(sync)]
pub fn tracker_clear() -> StepSnapshotResponse {
    run_tracker("tracker_clear", |tracker| {
        (true, "Step count cleared.", tracker.clear_step_count())
    })
}

/// Classifies one scanned code.
///
/// `value_type` is `url|contact_info|other`; unknown types fall back to
/// `other`. Contact payloads are passed pre-rendered in `payload`.
#[flutter_rust_bridge::frb(sync)]
pub fn scan_classify(value_type: String, payload: Option<String>) -> ScanDisplayResponse {
    let code = match value_type.trim().to_ascii_lowercase().as_str() {
        "url" => ScannedCode::Url { url: payload },
        "contact_info" | "contact" => ScannedCode::ContactInfo {
            contact: payload.map(|name| ContactInfo {
                name: Some(name),
                ..ContactInfo::default()
            }),
        },
        _ => ScannedCode::Other { raw_value: payload },
    };

    let mut opener = DeferredOpener::default();
    let report = route_scan_results(&[code], &mut opener);
    match report.display {
        Some(display) => ScanDisplayResponse {
            ok: true,
            type_label: display.type_label,
            content: display.content,
            open_url: opener.requested.pop(),
        },
        None => ScanDisplayResponse {
            ok: false,
            type_label: String::new(),
            content: String::new(),
            open_url: None,
        },
    }
}

/// Hands URLs back to Dart, which owns the platform browser intent.
#[derive(Default)]
struct DeferredOpener {
    requested: Vec<String>,
}

impl UrlOpener for DeferredOpener {
    fn open(&mut self, url: &str) -> Result<(), OpenError> {
        self.requested.push(url.to_string());
        Ok(())
    }
}

fn run_tracker(
    operation: &str,
    f: impl FnOnce(&mut StepGoalTracker<SqlitePreferenceStore<'_>>) -> (bool, &'static str, DisplaySnapshot),
) -> StepSnapshotResponse {
    let db_path = resolve_tracker_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return StepSnapshotResponse::failure(format!("{operation} failed: {err}"));
        }
    };
    let config = resolve_tracker_config();
    let store = SqlitePreferenceStore::new(&conn, config.namespace.as_str());
    let mut tracker = StepGoalTracker::load_with_mode(store, config.sensor_mode);
    let (ok, message, snapshot) = f(&mut tracker);
    StepSnapshotResponse::from_snapshot(ok, message, &snapshot)
}

fn resolve_tracker_db_path() -> PathBuf {
    TRACKER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("STEPGOAL_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TRACKER_DB_FILE_NAME)
        })
        .clone()
}

fn resolve_tracker_config() -> &'static TrackerConfig {
    TRACKER_CONFIG.get_or_init(|| {
        let mut config = TrackerConfig::default();
        if let Ok(raw) = std::env::var("STEPGOAL_SENSOR_MODE") {
            match SensorMode::parse(raw.as_str()) {
                Some(mode) => config.sensor_mode = mode,
                None => warn!(
                    "event=config_load module=ffi status=defaulted key=STEPGOAL_SENSOR_MODE value={}",
                    raw.trim()
                ),
            }
        }
        config
    })
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, scan_classify, tracker_clear, tracker_daily_rollover,
        tracker_on_sensor_reading, tracker_set_goal, tracker_snapshot, TRACKER_CONFIG,
        TRACKER_DB_PATH,
    };
    use stepgoal_core::TrackerConfig;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_dir_and_unknown_level() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    // One test drives all tracker calls: they share the process-wide DB file.
    #[test]
    fn tracker_calls_share_persisted_state() {
        let dir = tempfile::tempdir().expect("create temp db dir");
        TRACKER_DB_PATH
            .set(dir.path().join("step_tracker.sqlite3"))
            .expect("db path set before first tracker call");
        TRACKER_CONFIG
            .set(TrackerConfig::default())
            .expect("config set before first tracker call");

        let cleared = tracker_clear();
        assert!(cleared.ok, "{}", cleared.message);

        let goal = tracker_set_goal("10000".to_string());
        assert!(goal.ok, "{}", goal.message);
        assert_eq!(goal.step_goal, 10_000);

        let ignored = tracker_set_goal("ten".to_string());
        assert!(!ignored.ok);
        assert_eq!(ignored.step_goal, 10_000);

        let reading = tracker_on_sensor_reading(5_000.0);
        assert!(reading.ok, "{}", reading.message);
        assert_eq!(reading.progress_percent, Some(50.0));
        assert_eq!(reading.badge, "far_50");
        assert_eq!(reading.progress_line, "Progress: 50.00%");

        let rejected = tracker_on_sensor_reading(f32::NAN);
        assert!(!rejected.ok);
        assert_eq!(rejected.step_count, 5_000);

        let snapshot = tracker_snapshot();
        assert_eq!(snapshot.step_count, 5_000);
        assert_eq!(snapshot.step_line, "Steps: 5000 / 10000 steps (goal)");

        let bad_date = tracker_daily_rollover("tomorrow".to_string());
        assert!(!bad_date.ok);
        assert_eq!(bad_date.message, "Invalid date.");
        assert_eq!(bad_date.step_count, 5_000);
        assert_eq!(bad_date.step_goal, 10_000);
        assert_eq!(bad_date.badge, "far_50");

        let rollover = tracker_daily_rollover("2099-01-01".to_string());
        assert!(rollover.ok, "{}", rollover.message);
        let again = tracker_daily_rollover("2099-01-01".to_string());
        assert_eq!(again.message, "Already reset today.");
        assert_eq!(again.step_count, 0);
    }

    #[test]
    fn scan_classify_routes_by_value_type() {
        let url = scan_classify("URL".to_string(), Some("https://example.com".to_string()));
        assert!(url.ok);
        assert_eq!(url.type_label, "URL");
        assert_eq!(url.open_url.as_deref(), Some("https://example.com"));

        let blank = scan_classify("url".to_string(), Some(" ".to_string()));
        assert!(!blank.ok);
        assert_eq!(blank.open_url, None);

        let contact = scan_classify("contact_info".to_string(), Some("Ada".to_string()));
        assert_eq!(contact.type_label, "Contact");
        assert_eq!(contact.content, "Ada");

        let other = scan_classify("isbn".to_string(), None);
        assert_eq!(other.type_label, "Other");
        assert_eq!(other.content, "");
        assert_eq!(other.open_url, None);
    }
}
