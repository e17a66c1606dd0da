//! Crash triage runtime for bug reports.
//!
//! Collects crash texts from a report, classifies them through a pluggable
//! parser, decides on a single outcome and applies it through the tracker.

pub mod actions;
pub mod api;
pub mod classify;
pub mod collect;
pub mod config;
pub mod deobfuscation;
pub mod engine;
pub mod fallback;

pub use crate::core::crash::{
    ClassifiedCrash, CrashCategory, CrashOrigin, CrashSignatureRule, CrashSource, ModdedConfidence,
};
pub use crate::core::decision::{DeobfuscationJob, TriageDecision};
pub use actions::{ActionExecutor, ActionOutcome, ActionStep, StepFailure};
pub use api::{CrashTriage, TriageRun};
pub use classify::{ClassifierAdapter, CrashParser, Deobfuscator, ParsedCrash};
pub use config::TriageConfig;
pub use deobfuscation::{ArtifactOutcome, ArtifactWriter, JobResult};
pub use engine::{decide, ReportGuards};
