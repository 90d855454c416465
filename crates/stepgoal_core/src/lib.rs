//! Core domain logic for StepGoal.
//! This crate is the single source of truth for step tracking invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod permission;
pub mod sensor;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::scan::{ContactInfo, ScanDisplay, ScannedCode};
pub use model::snapshot::{DisplaySnapshot, GoalBadge};
pub use model::tracker_state::{SensorMode, TrackerState};
pub use permission::{Permission, PermissionGate, PermissionStatus};
pub use sensor::{SensorAccuracy, SensorAvailability, SensorReading};
pub use service::scan_service::{
    classify, route_scan_results, NoBrowser, OpenError, ScanReport, UrlOpener,
};
pub use service::session::{EventReply, ScannerOutcome, ScreenEvent, ScreenSession};
pub use service::tracker_service::{StepGoalTracker, TrackerConfig};
pub use store::{
    KeyValueStore, MemoryStore, SqlitePreferenceStore, StoreError, StoreResult,
    DEFAULT_NAMESPACE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
