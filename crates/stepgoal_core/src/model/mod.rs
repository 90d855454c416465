//! Domain model for step tracking and scan display.
//!
//! # Responsibility
//! - Define the persisted tracker state and its derived display snapshot.
//! - Define scanner result shapes consumed by scan routing.
//!
//! # Invariants
//! - `DisplaySnapshot` is always derived from `TrackerState`, never stored.

pub mod scan;
pub mod snapshot;
pub mod tracker_state;
