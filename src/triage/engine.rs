//! Duplicate and modded decision engine.
//!
//! A pure function from classified crashes, ordered signature rules and
//! report guards to exactly one `TriageDecision`. Signature matches always
//! take priority over the modded heuristic.

use crate::core::crash::{ClassifiedCrash, CrashSignatureRule};
use crate::core::decision::TriageDecision;
use crate::core::report::BugReport;
use std::cmp::Reverse;
use tracing::{debug, info};

/// Report-level conditions under which automated crash triage is skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportGuards {
    pub confirmation_set: bool,
    pub priority_set: bool,
    pub resolved: bool,
}

impl ReportGuards {
    pub fn from_report(report: &BugReport) -> Self {
        Self {
            confirmation_set: !report.is_unconfirmed(),
            priority_set: report.priority.is_some(),
            resolved: report.resolution.is_some(),
        }
    }

    /// True when the report is already past automated triage.
    pub fn blocks(&self) -> bool {
        self.confirmation_set || self.priority_set || self.resolved
    }
}

/// A classified crash together with the first rule it matched.
#[derive(Debug, Clone, Copy)]
pub struct SignatureMatch<'a> {
    pub crash: &'a ClassifiedCrash,
    pub rule: &'a CrashSignatureRule,
}

/// First rule, in configured order, matching the crash.
pub fn first_matching_rule<'a>(
    crash: &ClassifiedCrash,
    rules: &'a [CrashSignatureRule],
) -> Option<&'a CrashSignatureRule> {
    rules.iter().find(|rule| rule.matches(crash))
}

/// Every crash that matched a rule, in discovery order.
pub fn signature_matches<'a>(
    crashes: &'a [ClassifiedCrash],
    rules: &'a [CrashSignatureRule],
) -> Vec<SignatureMatch<'a>> {
    crashes
        .iter()
        .filter_map(|crash| first_matching_rule(crash, rules).map(|rule| SignatureMatch { crash, rule }))
        .collect()
}

/// True when at least one crash is modded and none is explicitly vanilla.
pub fn modded_consensus(crashes: &[ClassifiedCrash]) -> bool {
    crashes.iter().any(|c| c.modded.is_modded()) && !crashes.iter().any(|c| c.modded.is_vanilla())
}

/// Decides how to triage a report from its classified crashes.
pub fn decide(
    crashes: &[ClassifiedCrash],
    rules: &[CrashSignatureRule],
    guards: &ReportGuards,
) -> TriageDecision {
    if guards.blocks() {
        debug!(?guards, "report already triaged");
        return TriageDecision::NoAction;
    }

    let matches = signature_matches(crashes, rules);
    // Latest source wins; on equal timestamps the first discovered wins.
    let latest = matches
        .iter()
        .enumerate()
        .max_by_key(|(index, m)| (m.crash.created_at(), Reverse(*index)))
        .map(|(_, m)| *m);

    if let Some(m) = latest {
        info!(
            source = m.crash.source.origin.label(),
            duplicate = %m.rule.duplicate_ticket_id,
            candidates = matches.len(),
            "crash matches known signature"
        );
        return TriageDecision::ResolveDuplicate {
            ticket_id: m.rule.duplicate_ticket_id.clone(),
            matched_at: m.crash.created_at(),
        };
    }

    if modded_consensus(crashes) {
        info!(crashes = crashes.len(), "all crashes agree on modded client");
        return TriageDecision::ResolveInvalidModded;
    }

    TriageDecision::NoAction
}
