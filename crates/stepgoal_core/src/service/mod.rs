//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate tracker state, scan routing and screen events into
//!   host-facing APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod scan_service;
pub mod session;
pub mod tracker_service;
