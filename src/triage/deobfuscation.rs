//! Deobfuscated trace attachments and crash blocks in the description.
//!
//! Each deobfuscated trace is written to a fresh temporary directory and
//! uploaded from there. The directory is owned by a `TempDir` that moves
//! into the upload callback, so it is removed after the upload completes,
//! when the tracker drops the callback after a failure, or right away when
//! the file name is rejected by the sandbox.

use crate::core::crash::{ClassifiedCrash, CrashCategory};
use crate::core::decision::{deobfuscated_name, DeobfuscationJob, DEOBFUSCATED_SUFFIX};
use crate::core::report::{BugReport, ReportMutator};
use crate::io::sandbox;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Deobfuscated traces that still need to be attached to the report.
pub fn plan_jobs(report: &BugReport, crashes: &[ClassifiedCrash]) -> Vec<DeobfuscationJob> {
    if report
        .attachments
        .iter()
        .any(|a| a.name.ends_with(DEOBFUSCATED_SUFFIX))
    {
        debug!(report = %report.key, "deobfuscated attachment already present");
        return Vec::new();
    }

    let mut seen = HashSet::new();
    crashes
        .iter()
        .filter(|crash| crash.category == CrashCategory::EngineCrash)
        .filter_map(|crash| {
            let name = crash.file_name()?;
            let content = crash.deobfuscated.as_ref()?;
            let target = deobfuscated_name(name);
            if report.has_attachment_named(&target) || !seen.insert(target) {
                return None;
            }
            Some(DeobfuscationJob::new(name, content.clone()))
        })
        .collect()
}

/// Marker that identifies the crash block of an attachment.
pub fn block_marker(file_name: &str) -> String {
    format!("{{code:title=({})}}", file_name)
}

/// Formats the description block for one engine crash.
pub fn format_block(file_name: &str, crash: &ClassifiedCrash) -> String {
    let version = crash.engine_version.as_deref().unwrap_or("unknown version");
    let first_line = crash.exception.lines().next().unwrap_or_default();
    let mut block = format!(
        "*Crash in {}* (Minecraft {}): {}\n{}\n{}\n{{code}}",
        file_name,
        version,
        first_line,
        block_marker(file_name),
        crash.exception
    );
    if let Some(deobfuscated) = &crash.deobfuscated {
        block.push_str(&format!(
            "\n{{code:title=({} deobfuscated)}}\n{}\n{{code}}",
            file_name, deobfuscated
        ));
    }
    block
}

/// The description with blocks appended for engine crashes attached since
/// `last_run`, or `None` when nothing needs to be added.
pub fn updated_description(
    report: &BugReport,
    crashes: &[ClassifiedCrash],
    last_run: DateTime<Utc>,
) -> Option<String> {
    let current = report.description.clone().unwrap_or_default();
    let mut seen = HashSet::new();
    let blocks: Vec<String> = crashes
        .iter()
        .filter(|crash| crash.category == CrashCategory::EngineCrash && crash.created_at() > last_run)
        .filter_map(|crash| {
            let name = crash.file_name()?;
            if current.contains(&block_marker(name)) || !seen.insert(name) {
                return None;
            }
            Some(format_block(name, crash))
        })
        .collect();

    if blocks.is_empty() {
        return None;
    }
    let mut description = current;
    for block in blocks {
        if !description.is_empty() {
            description.push_str("\n\n");
        }
        description.push_str(&block);
    }
    Some(description)
}

/// What happened to one deobfuscation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Uploaded(String),
    /// The derived file name escaped the sandbox; nothing was written.
    Rejected(String),
}

/// A job or description update the tracker or filesystem rejected.
#[derive(Debug)]
pub struct ArtifactFailure {
    pub target: String,
    pub error: anyhow::Error,
}

impl fmt::Display for ArtifactFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.target, self.error)
    }
}

/// Summary of one writer run.
#[derive(Debug, Default)]
pub struct ArtifactOutcome {
    pub jobs: Vec<JobResult>,
    pub description_updated: bool,
    pub failures: Vec<ArtifactFailure>,
}

impl ArtifactOutcome {
    pub fn uploaded(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().filter_map(|job| match job {
            JobResult::Uploaded(name) => Some(name.as_str()),
            JobResult::Rejected(_) => None,
        })
    }
}

/// Writes deobfuscated traces and crash blocks to a report.
#[derive(Debug, Clone, Default)]
pub struct ArtifactWriter {
    temp_root: Option<PathBuf>,
}

impl ArtifactWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates temporary directories under `root` instead of the system default.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn run(
        &self,
        report: &BugReport,
        crashes: &[ClassifiedCrash],
        last_run: DateTime<Utc>,
        mutator: &mut dyn ReportMutator,
    ) -> ArtifactOutcome {
        let mut outcome = ArtifactOutcome::default();

        for job in plan_jobs(report, crashes) {
            let target = job.attachment_name();
            match self.upload(&job, mutator) {
                Ok(result) => outcome.jobs.push(result),
                Err(error) => {
                    warn!(report = %report.key, %target, error = %format!("{:#}", error), "deobfuscated upload failed");
                    outcome.failures.push(ArtifactFailure { target, error });
                }
            }
        }

        if let Some(description) = updated_description(report, crashes, last_run) {
            match mutator.update_description(&description) {
                Ok(()) => {
                    info!(report = %report.key, "added crash details to description");
                    outcome.description_updated = true;
                }
                Err(error) => {
                    warn!(report = %report.key, error = %format!("{:#}", error), "description update failed");
                    outcome.failures.push(ArtifactFailure {
                        target: "description".into(),
                        error,
                    });
                }
            }
        }

        outcome
    }

    fn upload(
        &self,
        job: &DeobfuscationJob,
        mutator: &mut dyn ReportMutator,
    ) -> anyhow::Result<JobResult> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("crashsort-");
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("creating temporary directory")?;

        let name = job.attachment_name();
        let Some(path) = sandbox::resolve(dir.path(), &name) else {
            warn!(source = %job.source_name, "refusing to write deobfuscated trace outside sandbox");
            return Ok(JobResult::Rejected(name));
        };

        std::fs::write(&path, &job.content)
            .with_context(|| format!("writing {}", path.display()))?;
        mutator
            .add_attachment(&path, Box::new(move || drop(dir)))
            .with_context(|| format!("uploading {}", name))?;

        info!(source = %job.source_name, attachment = %name, "uploaded deobfuscated trace");
        Ok(JobResult::Uploaded(name))
    }
}
