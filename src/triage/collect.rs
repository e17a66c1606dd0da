//! Gathers candidate crash texts from a report.

use crate::core::crash::CrashSource;
use crate::core::report::{Attachment, BugReport};
use crate::error::AnalysisBudget;
use crate::io::read_text;
use crate::triage::config::CrashConfig;
use tracing::{debug, warn};

/// Collects the description and allow-listed attachments of a report.
#[derive(Debug, Clone)]
pub struct SourceCollector {
    extensions: Vec<String>,
    budget: AnalysisBudget,
}

impl SourceCollector {
    pub fn new(extensions: Vec<String>, budget: AnalysisBudget) -> Self {
        Self { extensions, budget }
    }

    pub fn from_config(config: &CrashConfig) -> Self {
        Self::new(config.crash_extensions.clone(), config.budget())
    }

    /// Case-sensitive match of the literal extension against the allow-list.
    pub fn is_crash_attachment(&self, attachment: &Attachment) -> bool {
        attachment
            .extension()
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }

    /// Description (when present) plus every readable allow-listed attachment.
    pub fn collect(&self, report: &BugReport) -> Vec<CrashSource> {
        let mut sources = Vec::with_capacity(report.attachments.len() + 1);
        if let Some(description) = &report.description {
            sources.push(CrashSource::description(
                description.clone(),
                report.created_at,
            ));
        }
        sources.extend(self.collect_attachments(report));
        sources
    }

    /// Allow-listed attachments only. Unreadable or oversized attachments are
    /// dropped.
    pub fn collect_attachments(&self, report: &BugReport) -> Vec<CrashSource> {
        let candidates: Vec<&Attachment> = report
            .attachments
            .iter()
            .filter(|a| self.is_crash_attachment(a))
            .collect();

        if candidates.len() > self.budget.max_attachments {
            warn!(
                report = %report.key,
                candidates = candidates.len(),
                limit = self.budget.max_attachments,
                "Too many crash attachments, ignoring the oldest"
            );
        }

        // Prefer the newest attachments when over budget.
        let skip = candidates.len().saturating_sub(self.budget.max_attachments);
        let mut ordered = candidates;
        ordered.sort_by_key(|a| a.created_at);

        ordered
            .into_iter()
            .skip(skip)
            .filter_map(|attachment| {
                match read_text(attachment.open(), self.budget.max_attachment_bytes) {
                    Ok(text) => Some(CrashSource::attachment(
                        attachment.name.clone(),
                        text,
                        attachment.created_at,
                    )),
                    Err(err) => {
                        warn!(
                            report = %report.key,
                            attachment = %attachment.name,
                            error = %err,
                            "Dropping unreadable attachment"
                        );
                        None
                    }
                }
            })
            .inspect(|source| debug!(source = source.origin.label(), "collected crash source"))
            .collect()
    }
}
