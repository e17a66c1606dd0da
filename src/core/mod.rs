//! Core data types for crash triage.
//!
//! Reports, crash records and decisions are built fresh for each run and
//! never persisted.

pub mod crash;
pub mod decision;
pub mod report;
