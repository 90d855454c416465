//! Flutter-facing bindings for the StepGoal core.

pub mod api;
