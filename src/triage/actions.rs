//! Turns a triage decision into side effects on the report.
//!
//! Steps run in order (link, comment, resolution). A failing step does not
//! stop later steps and nothing is rolled back; every failure is reported.

use crate::core::decision::TriageDecision;
use crate::core::report::{BugReport, CommentOptions, ReportMutator};
use crate::triage::config::MessagesConfig;
use std::fmt;
use tracing::{info, warn};

/// One side effect of a triage action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStep {
    Link { link_type: String, target: String },
    Comment(CommentOptions),
    ResolveDuplicate,
    ResolveInvalid,
    ResolveAwaitingResponse,
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::Link { link_type, target } => write!(f, "link {} {}", link_type, target),
            ActionStep::Comment(comment) => write!(f, "comment {}", comment.template),
            ActionStep::ResolveDuplicate => write!(f, "resolve as duplicate"),
            ActionStep::ResolveInvalid => write!(f, "resolve as invalid"),
            ActionStep::ResolveAwaitingResponse => write!(f, "resolve as awaiting response"),
        }
    }
}

/// A step that the tracker rejected.
#[derive(Debug)]
pub struct StepFailure {
    pub step: ActionStep,
    pub error: anyhow::Error,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {:#}", self.step, self.error)
    }
}

/// Result of executing a decision.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The decision required no side effects.
    NoAction,
    /// Every step succeeded. `skipped` lists steps already satisfied.
    Applied {
        applied: Vec<ActionStep>,
        skipped: Vec<ActionStep>,
    },
    /// At least one step failed; earlier and later steps may have applied.
    Failed {
        applied: Vec<ActionStep>,
        failures: Vec<StepFailure>,
    },
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. })
    }

    pub fn failures(&self) -> &[StepFailure] {
        match self {
            ActionOutcome::Failed { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// The ordered steps a decision expands to.
pub fn plan(decision: &TriageDecision, messages: &MessagesConfig) -> Vec<ActionStep> {
    match decision {
        TriageDecision::NoAction => Vec::new(),
        TriageDecision::ResolveDuplicate { ticket_id, .. } => vec![
            ActionStep::Link {
                link_type: messages.duplicate_link_type.clone(),
                target: ticket_id.clone(),
            },
            ActionStep::Comment(
                CommentOptions::new(&messages.duplicate_message).with_param(ticket_id),
            ),
            ActionStep::ResolveDuplicate,
        ],
        TriageDecision::ResolveInvalidModded => vec![
            ActionStep::Comment(CommentOptions::new(&messages.modded_message)),
            ActionStep::ResolveInvalid,
        ],
        TriageDecision::RequestMoreInfo => vec![
            ActionStep::Comment(CommentOptions::new(&messages.missing_crash_message)),
            ActionStep::ResolveAwaitingResponse,
        ],
    }
}

/// Executes triage decisions through a `ReportMutator`.
pub struct ActionExecutor<'a> {
    messages: &'a MessagesConfig,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(messages: &'a MessagesConfig) -> Self {
        Self { messages }
    }

    pub fn execute(
        &self,
        report: &BugReport,
        decision: &TriageDecision,
        mutator: &mut dyn ReportMutator,
    ) -> ActionOutcome {
        let steps = plan(decision, self.messages);
        if steps.is_empty() {
            return ActionOutcome::NoAction;
        }

        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();

        for step in steps {
            if let ActionStep::Link { link_type, target } = &step {
                if report.has_outward_link(link_type, target) {
                    info!(report = %report.key, %step, "already linked");
                    skipped.push(step);
                    continue;
                }
            }

            match run_step(&step, mutator) {
                Ok(()) => applied.push(step),
                Err(error) => {
                    let failure = StepFailure { step, error };
                    warn!(report = %report.key, error = %failure, "triage step failed");
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            info!(report = %report.key, %decision, steps = applied.len(), "triage applied");
            ActionOutcome::Applied { applied, skipped }
        } else {
            ActionOutcome::Failed { applied, failures }
        }
    }
}

fn run_step(step: &ActionStep, mutator: &mut dyn ReportMutator) -> anyhow::Result<()> {
    match step {
        ActionStep::Link { link_type, target } => mutator.create_link(link_type, target),
        ActionStep::Comment(comment) => mutator.add_comment(comment),
        ActionStep::ResolveDuplicate => mutator.resolve_as_duplicate(),
        ActionStep::ResolveInvalid => mutator.resolve_as_invalid(),
        ActionStep::ResolveAwaitingResponse => mutator.resolve_as_awaiting_response(),
    }
}
