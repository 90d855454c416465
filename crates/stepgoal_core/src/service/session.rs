//! Main-screen event dispatch.
//!
//! # Responsibility
//! - Route host events (sensor, goal edit, permission result, lifecycle,
//!   scanner) to the tracker and scan routing.
//! - Own sensor registration state for the foreground/background lifecycle.
//!
//! # Invariants
//! - The sensor is registered only while resumed, with the sensor available
//!   and activity recognition granted.
//! - Readings delivered while unregistered are dropped.
//! - A denied camera permission finishes the scanner flow; it is not retried.

use crate::model::scan::{ScanDisplay, ScannedCode};
use crate::model::snapshot::DisplaySnapshot;
use crate::permission::{Permission, PermissionGate};
use crate::sensor::{log_accuracy_change, SensorAvailability, SensorReading};
use crate::service::scan_service::{route_scan_results, ScanReport, UrlOpener};
use crate::service::tracker_service::StepGoalTracker;
use crate::store::KeyValueStore;
use chrono::NaiveDate;
use log::{debug, error, info};

/// What the host should do next with the scanner sub-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerOutcome {
    Launch,
    RequestPermission(Permission),
    /// Permission denied; close the screen.
    Finish,
    /// Nothing to do.
    Idle,
}

/// Host events accepted by `ScreenSession::handle`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    Resumed { today: NaiveDate },
    Paused,
    SensorChanged { raw_value: f32 },
    AccuracyChanged { ordinal: i32 },
    GoalEdited { text: String },
    PermissionResult { permission: Permission, granted: bool },
    ScannerRequested,
    ClearRequested,
}

/// Reply to one dispatched event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventReply {
    pub snapshot: DisplaySnapshot,
    pub scanner: ScannerOutcome,
}

/// State for one main screen: tracker, permissions and sensor lifecycle.
pub struct ScreenSession<S: KeyValueStore> {
    tracker: StepGoalTracker<S>,
    permissions: PermissionGate,
    sensor: SensorAvailability,
    resumed: bool,
    registered: bool,
    last_scan: Option<ScanDisplay>,
}

impl<S: KeyValueStore> ScreenSession<S> {
    pub fn new(tracker: StepGoalTracker<S>, sensor: SensorAvailability) -> Self {
        // Logged once per screen, like the platform lookup it stands for.
        sensor.check();
        Self {
            tracker,
            permissions: PermissionGate::new(),
            sensor,
            resumed: false,
            registered: false,
            last_scan: None,
        }
    }

    pub fn tracker(&self) -> &StepGoalTracker<S> {
        &self.tracker
    }

    pub fn permissions(&self) -> &PermissionGate {
        &self.permissions
    }

    pub fn is_sensor_registered(&self) -> bool {
        self.registered
    }

    pub fn last_scan(&self) -> Option<&ScanDisplay> {
        self.last_scan.as_ref()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.tracker.snapshot()
    }

    /// Single dispatch entry for host events.
    pub fn handle(&mut self, event: ScreenEvent) -> EventReply {
        let scanner = match event {
            ScreenEvent::Resumed { today } => {
                self.on_resume(today);
                ScannerOutcome::Idle
            }
            ScreenEvent::Paused => {
                self.on_pause();
                ScannerOutcome::Idle
            }
            ScreenEvent::SensorChanged { raw_value } => {
                self.on_sensor_reading(raw_value);
                ScannerOutcome::Idle
            }
            ScreenEvent::AccuracyChanged { ordinal } => {
                log_accuracy_change(ordinal);
                ScannerOutcome::Idle
            }
            ScreenEvent::GoalEdited { text } => {
                self.on_goal_edited(text.as_str());
                ScannerOutcome::Idle
            }
            ScreenEvent::PermissionResult {
                permission,
                granted,
            } => self.on_permission_result(permission, granted),
            ScreenEvent::ScannerRequested => self.request_scanner(),
            ScreenEvent::ClearRequested => {
                self.on_clear_requested();
                ScannerOutcome::Idle
            }
        };

        EventReply {
            snapshot: self.snapshot(),
            scanner,
        }
    }

    /// Runs the daily rollover and registers the sensor when allowed.
    pub fn on_resume(&mut self, today: NaiveDate) {
        self.resumed = true;
        self.tracker.on_daily_rollover(today);
        self.try_register();
    }

    pub fn on_pause(&mut self) {
        self.resumed = false;
        if self.registered {
            self.registered = false;
            info!("event=sensor_unregister module=session status=ok");
        }
    }

    /// Forwards a raw reading; returns `None` when it was dropped.
    pub fn on_sensor_reading(&mut self, raw_value: f32) -> Option<DisplaySnapshot> {
        if !self.registered {
            debug!("event=sensor_reading module=session status=dropped reason=not_registered");
            return None;
        }
        let reading = SensorReading::from_raw(raw_value)?;
        Some(self.tracker.on_sensor_reading(reading.cumulative_steps))
    }

    pub fn on_goal_edited(&mut self, text: &str) -> Option<DisplaySnapshot> {
        self.tracker.set_goal(text)
    }

    pub fn on_clear_requested(&mut self) -> DisplaySnapshot {
        self.tracker.clear_step_count()
    }

    pub fn on_permission_result(&mut self, permission: Permission, granted: bool) -> ScannerOutcome {
        self.permissions.record(permission, granted);
        match (permission, granted) {
            (Permission::ActivityRecognition, true) => {
                self.try_register();
                ScannerOutcome::Idle
            }
            (Permission::ActivityRecognition, false) => ScannerOutcome::Idle,
            (Permission::Camera, true) => ScannerOutcome::Launch,
            (Permission::Camera, false) => ScannerOutcome::Finish,
        }
    }

    pub fn request_scanner(&mut self) -> ScannerOutcome {
        if self.permissions.is_granted(Permission::Camera) {
            ScannerOutcome::Launch
        } else {
            ScannerOutcome::RequestPermission(Permission::Camera)
        }
    }

    pub fn on_scan_results(
        &mut self,
        codes: &[ScannedCode],
        opener: &mut dyn UrlOpener,
    ) -> ScanReport {
        let report = route_scan_results(codes, opener);
        if let Some(display) = &report.display {
            self.last_scan = Some(display.clone());
        }
        report
    }

    fn try_register(&mut self) {
        if !self.resumed || self.registered {
            return;
        }
        if self.sensor != SensorAvailability::Available {
            return;
        }
        if !self.permissions.is_granted(Permission::ActivityRecognition) {
            error!(
                "event=sensor_register module=session status=skipped reason=permission_not_granted"
            );
            return;
        }
        self.registered = true;
        info!("event=sensor_register module=session status=ok");
    }
}
