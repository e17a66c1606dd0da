//! Requests a crash report when the reporter mentions a crash but attached none.

use crate::core::crash::ClassifiedCrash;
use crate::core::decision::TriageDecision;
use crate::core::report::{BugReport, STATUS_OPEN};
use tracing::debug;

/// True when the report is a fresh, untriaged report that mentions a crash.
pub fn applies_to(report: &BugReport) -> bool {
    report.is_unconfirmed()
        && report.status == STATUS_OPEN
        && report.priority.is_none()
        && report
            .description
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains("crash"))
}

/// Decides the fallback from the classified attachments of a report.
///
/// Callers classify attachments only; the description is not a source here.
pub fn decide_missing_crash(report: &BugReport, attachments: &[ClassifiedCrash]) -> TriageDecision {
    if !applies_to(report) {
        return TriageDecision::NoAction;
    }
    if !attachments.is_empty() {
        debug!(report = %report.key, crashes = attachments.len(), "crash attached");
        return TriageDecision::NoAction;
    }
    TriageDecision::RequestMoreInfo
}
