#![cfg(feature = "builtin-parser")]

use crate::common::*;
use crashsort::core::crash::CrashCategory;
use crashsort::crash::{MappingDeobfuscator, MappingTable};
use crashsort::triage::config::SignatureRuleConfig;
use crashsort::triage::deobfuscation::ArtifactWriter;
use crashsort::triage::{CrashTriage, ModdedConfidence, TriageDecision};
use tempfile::TempDir;

const MAPPINGS: &str = "\
net.minecraft.client.Minecraft -> emh:
    void run() -> a
    boolean isReady() -> b
";

fn engine_crash(exception: &str, modded: &str) -> String {
    format!(
        "---- Minecraft Crash Report ----
// Shall we play a game?

Time: 2024-03-01 10:00:00
Description: Initializing game

{}
\tat emh.a(SourceFile:120)
\tat emh.b(SourceFile:40)

-- System Details --
Details:
\tMinecraft Version: 1.20.4
\tIs Modded: {}
",
        exception, modded
    )
}

fn triage(root: &TempDir) -> CrashTriage {
    let mut config = config();
    config.crash.duplicates = vec![SignatureRuleConfig::new(
        CrashCategory::EngineCrash,
        r"Pixel format not accelerated",
        "MC-297",
    )];
    let deobfuscator = MappingDeobfuscator::new()
        .with_mappings("1.20.4", MappingTable::parse(MAPPINGS).unwrap());
    CrashTriage::with_builtin_parser(config)
        .unwrap()
        .with_deobfuscator(deobfuscator)
        .with_artifact_writer(ArtifactWriter::new().with_temp_root(root.path()))
}

#[test]
fn known_engine_crash_is_resolved_and_deobfuscated() {
    let root = TempDir::new().unwrap();
    let crash = engine_crash(
        "java.lang.IllegalStateException: Pixel format not accelerated",
        "Probably not; Client jar signature and brand is untouched",
    );
    let report = report().with_attachment(text_attachment("crash-client.txt", &crash, now()));
    let mut mutator = RecordingMutator::new();
    let run = triage(&root).run(&report, &mut mutator, days_ago(1));

    assert!(matches!(run.decision, TriageDecision::ResolveDuplicate { ref ticket_id, .. } if ticket_id == "MC-297"));
    assert_eq!(mutator.comments(), vec!["duplicate-tech"]);

    let (name, content) = &mutator.uploads[0];
    assert_eq!(name, "crash-client-deobfuscated.txt");
    assert!(content.contains("at net.minecraft.client.Minecraft.run(SourceFile:120)"));
    assert!(content.contains("at net.minecraft.client.Minecraft.isReady(SourceFile:40)"));

    let description = mutator.description().unwrap();
    assert!(description.contains("(Minecraft 1.20.4): java.lang.IllegalStateException"));
}

#[test]
fn modded_engine_crash_is_resolved_invalid() {
    let root = TempDir::new().unwrap();
    let crash = engine_crash(
        "java.lang.NullPointerException: Cannot invoke \"Object.hashCode()\"",
        "Definitely; Client brand changed to 'fabric'",
    );
    let report = report()
        .with_description("Crashes when I open the inventory")
        .with_attachment(text_attachment("crash.txt", &crash, now()));
    let (crashes, decision) = triage(&root).analyze(&report);

    assert_eq!(crashes.len(), 1);
    assert_eq!(crashes[0].modded, ModdedConfidence::Definite);
    assert_eq!(decision, TriageDecision::ResolveInvalidModded);
}

#[test]
fn jvm_fatal_error_log_is_classified() {
    let root = TempDir::new().unwrap();
    let log = "#
# A fatal error has been detected by the Java Runtime Environment:
#
#  EXCEPTION_ACCESS_VIOLATION (0xc0000005) at pc=0x00007ffb, pid=1234, tid=5678
#
# Problematic frame:
# C  [atio6axx.dll+0x1a2b3]
#
";
    let report = report().with_attachment(text_attachment("hs_err_pid1234.log", log, now()));
    let (crashes, decision) = triage(&root).analyze(&report);

    assert_eq!(crashes.len(), 1);
    assert_eq!(crashes[0].category, CrashCategory::GenericJvm);
    assert_eq!(crashes[0].signature, "C [atio6axx.dll+0x1a2b3]");
    assert_eq!(decision, TriageDecision::NoAction);
}
