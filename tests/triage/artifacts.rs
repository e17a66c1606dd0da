use crate::common::*;
use crashsort::triage::deobfuscation::{ArtifactWriter, JobResult};
use crashsort::triage::CrashTriage;
use tempfile::TempDir;

fn triage(temp_root: &TempDir) -> CrashTriage {
    CrashTriage::new(config(), KeywordParser)
        .unwrap()
        .with_deobfuscator(MarkingDeobfuscator)
        .with_artifact_writer(ArtifactWriter::new().with_temp_root(temp_root.path()))
}

fn assert_no_leftovers(root: &TempDir) {
    let leftovers: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "temp dirs left behind: {:?}", leftovers);
}

#[test]
fn uploads_deobfuscated_trace_and_cleans_up() {
    let root = TempDir::new().unwrap();
    let report = report()
        .with_description("The game crashed")
        .with_attachment(text_attachment("crash-2024.txt", "OBFUSCATED_CRASH\n\tat a.b", now()));
    let mut mutator = RecordingMutator::new();
    let run = triage(&root).run(&report, &mut mutator, days_ago(1));

    assert_eq!(
        run.artifacts.jobs,
        vec![JobResult::Uploaded("crash-2024-deobfuscated.txt".into())]
    );
    assert_eq!(mutator.uploads.len(), 1);
    assert_eq!(mutator.uploads[0].1, "[1.20.1] READABLE_CRASH\n\tat a.b");
    assert!(!mutator.upload_paths[0].exists());
    assert_no_leftovers(&root);

    let description = mutator.description().unwrap();
    assert!(description.starts_with("The game crashed\n\n*Crash in crash-2024.txt*"));
    assert!(description.contains("{code:title=(crash-2024.txt)}"));
}

#[test]
fn second_run_on_updated_report_is_a_no_op() {
    let root = TempDir::new().unwrap();
    let triage = triage(&root);
    let report = report()
        .with_attachment(text_attachment("crash.txt", "OBFUSCATED_CRASH", now()));

    let mut first = RecordingMutator::new();
    triage.run(&report, &mut first, days_ago(1));
    assert_eq!(first.uploads.len(), 1);

    let updated = first.apply(&report);
    let mut second = RecordingMutator::new();
    let run = triage.run(&updated, &mut second, days_ago(1));
    assert!(run.artifacts.jobs.is_empty());
    assert!(!run.artifacts.description_updated);
    assert!(second.calls.is_empty());
}

#[test]
fn failed_upload_still_removes_temp_dir() {
    let root = TempDir::new().unwrap();
    let report = report().with_attachment(text_attachment("crash.txt", "OBFUSCATED_CRASH", now()));
    let mut mutator = RecordingMutator::failing(&["attachment"]);
    let run = triage(&root).run(&report, &mut mutator, days_ago(1));

    assert!(run.is_failure());
    assert_eq!(run.artifacts.failures.len(), 1);
    assert_eq!(run.artifacts.failures[0].target, "crash-deobfuscated.txt");
    assert!(run.artifacts.description_updated);
    assert_no_leftovers(&root);
}

#[test]
fn dropped_callback_still_removes_temp_dir() {
    let root = TempDir::new().unwrap();
    let report = report().with_attachment(text_attachment("crash.txt", "OBFUSCATED_CRASH", now()));
    let mut mutator = RecordingMutator {
        skip_callbacks: true,
        ..RecordingMutator::default()
    };
    triage(&root).run(&report, &mut mutator, days_ago(1));
    assert_eq!(mutator.uploads.len(), 1);
    assert_no_leftovers(&root);
}

#[test]
fn path_separators_never_leave_the_temp_dir() {
    let root = TempDir::new().unwrap();
    let report = report().with_attachment(text_attachment(
        "../../etc/crash.txt",
        "OBFUSCATED_CRASH",
        now(),
    ));
    let mut mutator = RecordingMutator::new();
    let run = triage(&root).run(&report, &mut mutator, days_ago(1));

    assert_eq!(
        run.artifacts.jobs,
        vec![JobResult::Uploaded("....etccrash-deobfuscated.txt".into())]
    );
    let uploaded = &mutator.upload_paths[0];
    assert!(uploaded.starts_with(root.path().canonicalize().unwrap()));
    assert_no_leftovers(&root);
}

#[test]
fn older_crashes_get_no_description_block() {
    let root = TempDir::new().unwrap();
    let report = report()
        .with_description("crashed")
        .with_attachment(text_attachment("crash.txt", "EXAMPLE_CRASH", days_ago(2)));
    let mut mutator = RecordingMutator::new();
    let run = triage(&root).run(&report, &mut mutator, days_ago(1));
    assert!(!run.artifacts.description_updated);
    assert!(mutator.description().is_none());
}
