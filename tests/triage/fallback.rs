use crate::common::*;
use crashsort::triage::{CrashTriage, TriageDecision};

fn triage() -> CrashTriage {
    CrashTriage::new(config(), KeywordParser).unwrap()
}

#[test]
fn crash_mentioned_without_dump_requests_more_info() {
    let report = report()
        .with_description("Game CRASHED when loading my world")
        .with_attachment(text_attachment("notes.txt", "nothing useful", now()));
    let mut mutator = RecordingMutator::new();
    let run = triage().run_missing_crash(&report, &mut mutator);

    assert_eq!(run.decision, TriageDecision::RequestMoreInfo);
    assert_eq!(
        mutator.calls,
        vec![
            Call::Comment("provide-crash-report".into(), vec![]),
            Call::ResolveAwaitingResponse
        ]
    );
}

#[test]
fn description_crash_text_is_not_counted() {
    let report = report().with_description("crash: PIXEL_FORMAT_CRASH");
    let run = triage().run_missing_crash(&report, &mut RecordingMutator::new());
    assert_eq!(run.decision, TriageDecision::RequestMoreInfo);
}

#[test]
fn any_attached_crash_suppresses() {
    let report = report()
        .with_description("it crashes")
        .with_attachment(text_attachment("crash.log", "EXAMPLE_CRASH", now()));
    let mut mutator = RecordingMutator::new();
    let run = triage().run_missing_crash(&report, &mut mutator);
    assert_eq!(run.decision, TriageDecision::NoAction);
    assert!(mutator.calls.is_empty());
}

#[test]
fn reopened_or_triaged_reports_are_skipped() {
    let cases = [
        report().with_description("crash").with_status("Reopened"),
        report().with_description("crash").with_priority("Low"),
        report().with_description("crash").with_confirmation_status("Community Consensus"),
        report().with_description("it froze"),
    ];
    for report in cases {
        let mut mutator = RecordingMutator::new();
        let run = triage().run_missing_crash(&report, &mut mutator);
        assert_eq!(run.decision, TriageDecision::NoAction);
        assert!(mutator.calls.is_empty());
    }
}

#[test]
fn unconfirmed_status_still_applies() {
    let report = report()
        .with_description("crash on startup")
        .with_confirmation_status("Unconfirmed");
    let run = triage().run_missing_crash(&report, &mut RecordingMutator::new());
    assert_eq!(run.decision, TriageDecision::RequestMoreInfo);
}
