//! CLI-facing reconciliation layer
//!
//! The `reconcile` crate does the work; this module wires it to the
//! terminal: colored diff rendering, interactive confirmation, progress
//! bars and post-apply actions.

pub mod differ;
pub mod executor;
pub mod planner;
