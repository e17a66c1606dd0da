//! Crash report analysis and deduplication for bug tracker triage.

/// Core data types module
pub mod core;
#[cfg(feature = "builtin-parser")]
pub mod crash;
pub mod error;
pub mod io;
pub mod logging;
pub mod triage;

pub use error::{CrashsortError, Result};
pub use triage::{CrashTriage, TriageConfig, TriageDecision, TriageRun};
