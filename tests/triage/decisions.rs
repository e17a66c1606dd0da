use crate::common::*;
use crashsort::triage::{ActionOutcome, CrashTriage, TriageDecision};

fn triage() -> CrashTriage {
    CrashTriage::new(config(), KeywordParser).unwrap()
}

#[test]
fn description_signature_resolves_as_duplicate() {
    let report = report().with_description("PIXEL_FORMAT_CRASH");
    let mut mutator = RecordingMutator::new();
    let run = triage().run(&report, &mut mutator, days_ago(1));

    assert!(matches!(run.decision, TriageDecision::ResolveDuplicate { ref ticket_id, .. } if ticket_id == "MC-297"));
    assert_eq!(
        mutator.calls,
        vec![
            Call::Link("Duplicate".into(), "MC-297".into()),
            Call::Comment("duplicate-tech".into(), vec!["MC-297".into()]),
            Call::ResolveDuplicate,
        ]
    );
    assert!(!run.is_failure());
}

#[test]
fn most_recent_match_wins_regardless_of_order() {
    let a = text_attachment("a.txt", "PIXEL_FORMAT_CRASH", now());
    let b = text_attachment("b.txt", "DRIVER_NO_OPENGL", days_ago(1));

    for attachments in [vec![a.clone(), b.clone()], vec![b, a]] {
        let mut report = report();
        report.attachments = attachments;
        let (_, decision) = triage().analyze(&report);
        match decision {
            TriageDecision::ResolveDuplicate { ticket_id, .. } => assert_eq!(ticket_id, "MC-297"),
            other => panic!("expected duplicate, got {:?}", other),
        }
    }
}

#[test]
fn signature_match_beats_modded_sources() {
    let report = report()
        .with_description("DEFINITELY_MODDED_SERVER_CRASH")
        .with_attachment(text_attachment("old.txt", "DRIVER_NO_OPENGL", days_ago(2)));
    let (_, decision) = triage().analyze(&report);
    assert!(matches!(decision, TriageDecision::ResolveDuplicate { ref ticket_id, .. } if ticket_id == "MC-128302"));
}

#[test]
fn modded_with_vanilla_counter_evidence_is_no_action() {
    let report = report()
        .with_description("DEFINITELY_MODDED_SERVER_CRASH")
        .with_attachment(text_attachment("old.txt", "EXAMPLE_CRASH", days_ago(2)));
    let mut mutator = RecordingMutator::new();
    let run = triage().run(&report, &mut mutator, now());
    assert_eq!(run.decision, TriageDecision::NoAction);
    assert!(matches!(run.actions, ActionOutcome::NoAction));
    assert!(mutator.calls.is_empty());
}

#[test]
fn modded_consensus_resolves_invalid() {
    let report = report()
        .with_description("DEFINITELY_MODDED_SERVER_CRASH")
        .with_attachment(text_attachment("crash.txt", "LIKELY_MODDED", now()));
    let mut mutator = RecordingMutator::new();
    let run = triage().run(&report, &mut mutator, now());
    assert_eq!(run.decision, TriageDecision::ResolveInvalidModded);
    assert_eq!(
        mutator.calls,
        vec![
            Call::Comment("modified-game".into(), vec![]),
            Call::ResolveInvalid
        ]
    );
}

#[test]
fn unknown_confidence_alone_is_no_action() {
    let report = report().with_description("UNKNOWN_MODDED crash");
    assert_eq!(triage().analyze(&report).1, TriageDecision::NoAction);
}

#[test]
fn unknown_sources_do_not_block_consensus() {
    let report = report()
        .with_description("UNKNOWN_MODDED crash")
        .with_attachment(text_attachment("crash.txt", "LIKELY_MODDED", now()));
    assert_eq!(
        triage().analyze(&report).1,
        TriageDecision::ResolveInvalidModded
    );
}

#[test]
fn guarded_reports_are_left_alone_every_time() {
    let guarded = [
        report().with_confirmation_status("Confirmed"),
        report().with_priority("Important"),
        report().with_resolution("Fixed"),
    ];
    let triage = triage();
    for report in guarded {
        let report = report
            .with_description("PIXEL_FORMAT_CRASH")
            .with_attachment(text_attachment("crash.txt", "DEFINITELY_MODDED", now()));
        for _ in 0..2 {
            let mut mutator = RecordingMutator::new();
            let run = triage.run(&report, &mut mutator, days_ago(1));
            assert_eq!(run.decision, TriageDecision::NoAction);
            assert!(mutator.calls.is_empty());
        }
        assert!(triage.analyze(&report).0.is_empty());
    }
}

#[test]
fn attachments_outside_allow_list_are_ignored() {
    let report = report()
        .with_attachment(text_attachment("crash.png", "PIXEL_FORMAT_CRASH", now()))
        .with_attachment(text_attachment("crash.TXT", "PIXEL_FORMAT_CRASH", now()));
    let (crashes, decision) = triage().analyze(&report);
    assert!(crashes.is_empty());
    assert_eq!(decision, TriageDecision::NoAction);
}

#[test]
fn failed_steps_are_all_reported() {
    let report = report().with_description("PIXEL_FORMAT_CRASH");
    let mut mutator = RecordingMutator::failing(&["link", "comment"]);
    let run = triage().run(&report, &mut mutator, now());

    assert!(run.is_failure());
    assert_eq!(run.actions.failures().len(), 2);
    assert_eq!(mutator.calls.last(), Some(&Call::ResolveDuplicate));
}

#[test]
fn invalid_rule_is_rejected_at_construction() {
    let mut config = config();
    config.crash.duplicates[1].pattern = "(unclosed".into();
    let err = CrashTriage::new(config, KeywordParser).err().unwrap();
    assert!(err.to_string().contains("(unclosed"));
}
