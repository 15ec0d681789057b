//! Run reporting
//!
//! The orchestrator reports through the [`CaseReporter`] trait so presentation stays separate from
//! execution. [`ConsoleReporter`] produces the classic output: one `case <id> PASS|FAIL` line per case on
//! stdout, everything else on stderr.

use std::time::Duration;

use super::cases::TestCase;
use super::pipeline::Side;

/// Final classification of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseVerdict {
    Pass,
    Fail,
}

impl CaseVerdict {
    pub fn label(self) -> &'static str {
        match self {
            CaseVerdict::Pass => "PASS",
            CaseVerdict::Fail => "FAIL",
        }
    }
}

/// Why a run stopped before finishing its case list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortInfo {
    pub case: TestCase,
    pub side: Side,
    pub command: String,
    pub reason: String,
}

/// Summary of a harness run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub verdicts: Vec<(TestCase, CaseVerdict)>,
    pub aborted: Option<AbortInfo>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn verdict(&self, case: &str) -> Option<CaseVerdict> {
        self.verdicts
            .iter()
            .find(|(c, _)| c.id() == case)
            .map(|(_, verdict)| *verdict)
    }

    /// Counts line, e.g. `2 passed, 1 failed, 1 skipped`.
    pub fn counts_line(&self) -> String {
        let mut parts = Vec::new();
        if self.passed > 0 {
            parts.push(format!("{} passed", self.passed));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if parts.is_empty() {
            parts.push("no cases run".to_string());
        }
        parts.join(", ")
    }

    /// JSON form used by `--summary-json`.
    pub fn to_json(&self) -> serde_json::Value {
        let cases: Vec<serde_json::Value> = self
            .verdicts
            .iter()
            .map(|(case, verdict)| serde_json::json!({ "case": case.id(), "verdict": verdict.label() }))
            .collect();
        let aborted = self.aborted.as_ref().map(|abort| {
            serde_json::json!({
                "case": abort.case.id(),
                "side": abort.side.label(),
                "command": abort.command,
                "reason": abort.reason,
            })
        });
        serde_json::json!({
            "total": self.total,
            "passed": self.passed,
            "failed": self.failed,
            "skipped": self.skipped,
            "duration_secs": self.duration.as_secs_f64(),
            "cases": cases,
            "aborted": aborted,
        })
    }
}

/// Trait for reporting harness progress.
pub trait CaseReporter {
    /// Called once the case list is known
    fn on_run_start(&mut self, _case_count: usize) {}

    /// Called before each command is executed
    fn on_command(&mut self, _case: &TestCase, _side: Side, _command: &str) {}

    /// Called when a case is skipped because its source does not exist
    fn on_case_skipped(&mut self, _case: &TestCase) {}

    /// Called when a case has been classified
    fn on_case_complete(&mut self, case: &TestCase, verdict: CaseVerdict);

    /// Called when a fatal outcome stops the run
    fn on_abort(&mut self, abort: &AbortInfo);

    /// Called when the run ends, aborted or not
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Default console reporter
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

/// The line printed for each classified case.
pub fn verdict_line(case: &TestCase, verdict: CaseVerdict) -> String {
    format!("case {} {}", case, verdict.label())
}

impl CaseReporter for ConsoleReporter {
    fn on_run_start(&mut self, case_count: usize) {
        if case_count == 0 {
            eprintln!("No cases listed");
        }
    }

    fn on_command(&mut self, _case: &TestCase, _side: Side, command: &str) {
        if self.verbose {
            eprintln!(">>>>{}", command);
        }
    }

    fn on_case_skipped(&mut self, case: &TestCase) {
        if self.verbose {
            eprintln!("case {} skipped (no source)", case);
        }
    }

    fn on_case_complete(&mut self, case: &TestCase, verdict: CaseVerdict) {
        println!("{}", verdict_line(case, verdict));
    }

    fn on_abort(&mut self, abort: &AbortInfo) {
        eprintln!(">>>>{}", abort.command);
        eprintln!(
            "\x1b[1;31mfatal:\x1b[0m {} run for case {} failed: {}",
            abort.side, abort.case, abort.reason
        );
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let color = if summary.failed > 0 || summary.is_aborted() {
            "\x1b[1;31m"
        } else {
            "\x1b[1;32m"
        };
        let suffix = if summary.is_aborted() { " (aborted)" } else { "" };
        eprintln!(
            "{}====== {} in {:.2}s{} ======\x1b[0m",
            color,
            summary.counts_line(),
            summary.duration.as_secs_f64(),
            suffix
        );
    }
}
