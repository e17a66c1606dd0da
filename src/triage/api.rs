//! Entry points that run the whole crash triage pipeline on one report.
//!
//! `CrashTriage` owns the validated configuration and compiled rules, so a
//! single instance can be shared across reports. It holds no per-report state.

use crate::core::crash::{ClassifiedCrash, CrashSignatureRule};
use crate::core::decision::TriageDecision;
use crate::core::report::{BugReport, ReportMutator};
use crate::error::Result;
use crate::triage::actions::{ActionExecutor, ActionOutcome};
use crate::triage::classify::{ClassifierAdapter, CrashParser, Deobfuscator};
use crate::triage::collect::SourceCollector;
use crate::triage::config::TriageConfig;
use crate::triage::deobfuscation::{ArtifactOutcome, ArtifactWriter};
use crate::triage::engine::{decide, ReportGuards};
use crate::triage::fallback;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Summary of one triage run against one report.
#[derive(Debug)]
pub struct TriageRun {
    pub decision: TriageDecision,
    pub actions: ActionOutcome,
    pub artifacts: ArtifactOutcome,
}

impl TriageRun {
    fn skipped() -> Self {
        Self {
            decision: TriageDecision::NoAction,
            actions: ActionOutcome::NoAction,
            artifacts: ArtifactOutcome::default(),
        }
    }

    /// True when any side effect was rejected.
    pub fn is_failure(&self) -> bool {
        self.actions.is_failure() || !self.artifacts.failures.is_empty()
    }
}

/// Crash analysis and deduplication for bug reports.
pub struct CrashTriage {
    config: TriageConfig,
    rules: Vec<CrashSignatureRule>,
    collector: SourceCollector,
    parser: Box<dyn CrashParser + Send + Sync>,
    deobfuscator: Option<Box<dyn Deobfuscator + Send + Sync>>,
    writer: ArtifactWriter,
}

impl CrashTriage {
    /// Validates `config` and compiles its signature rules.
    pub fn new(config: TriageConfig, parser: impl CrashParser + Send + Sync + 'static) -> Result<Self> {
        config.validate()?;
        let rules = config
            .crash
            .compile_rules()
            .map_err(|e| crate::log_error!(e, "compiling signature rules"))?;
        let collector = SourceCollector::from_config(&config.crash);
        debug!(rules = rules.len(), "crash triage configured");
        Ok(Self {
            config,
            rules,
            collector,
            parser: Box::new(parser),
            deobfuscator: None,
            writer: ArtifactWriter::new(),
        })
    }

    /// Uses the built-in text parser for crash reports and JVM logs.
    #[cfg(feature = "builtin-parser")]
    pub fn with_builtin_parser(config: TriageConfig) -> Result<Self> {
        Self::new(config, crate::crash::parser::TextCrashParser::new())
    }

    pub fn with_deobfuscator(mut self, deobfuscator: impl Deobfuscator + Send + Sync + 'static) -> Self {
        self.deobfuscator = Some(Box::new(deobfuscator));
        self
    }

    pub fn with_artifact_writer(mut self, writer: ArtifactWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn rules(&self) -> &[CrashSignatureRule] {
        &self.rules
    }

    fn adapter(&self) -> ClassifierAdapter<'_> {
        let adapter = ClassifierAdapter::new(&*self.parser);
        match &self.deobfuscator {
            Some(deobfuscator) => adapter.with_deobfuscator(&**deobfuscator),
            None => adapter,
        }
    }

    /// Classifies every source of the report and decides, without side
    /// effects. Guarded reports are not classified at all.
    pub fn analyze(&self, report: &BugReport) -> (Vec<ClassifiedCrash>, TriageDecision) {
        let guards = ReportGuards::from_report(report);
        if guards.blocks() {
            debug!(report = %report.key, ?guards, "skipping triaged report");
            return (Vec::new(), TriageDecision::NoAction);
        }
        let crashes = self.adapter().classify_all(self.collector.collect(report));
        let decision = decide(&crashes, &self.rules, &guards);
        (crashes, decision)
    }

    /// Analyzes the report, applies the decision and attaches deobfuscated
    /// traces for crashes observed since `last_run`.
    pub fn run(
        &self,
        report: &BugReport,
        mutator: &mut dyn ReportMutator,
        last_run: DateTime<Utc>,
    ) -> TriageRun {
        let span = crate::span_trace!("crash_triage", report = %report.key);
        let _guard = span.enter();

        let (crashes, decision) = self.analyze(report);
        if crashes.is_empty() && decision.is_no_action() {
            return TriageRun::skipped();
        }

        let actions = ActionExecutor::new(&self.config.messages).execute(report, &decision, mutator);
        let artifacts = self.writer.run(report, &crashes, last_run, mutator);

        info!(
            crashes = crashes.len(),
            %decision,
            failed = actions.is_failure(),
            uploads = artifacts.uploaded().count(),
            "crash triage finished"
        );
        TriageRun {
            decision,
            actions,
            artifacts,
        }
    }

    /// Asks for a crash report when the description mentions a crash but
    /// no attachment contains one.
    pub fn run_missing_crash(&self, report: &BugReport, mutator: &mut dyn ReportMutator) -> TriageRun {
        let span = crate::span_trace!("missing_crash", report = %report.key);
        let _guard = span.enter();

        if !fallback::applies_to(report) {
            return TriageRun::skipped();
        }
        let attachments = self
            .adapter()
            .classify_all(self.collector.collect_attachments(report));
        let decision = fallback::decide_missing_crash(report, &attachments);
        let actions = ActionExecutor::new(&self.config.messages).execute(report, &decision, mutator);
        TriageRun {
            decision,
            actions,
            artifacts: ArtifactOutcome::default(),
        }
    }
}
