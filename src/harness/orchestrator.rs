//! Golden-comparison orchestration
//!
//! For each case the orchestrator runs the reference pipeline, then the candidate pipeline, then compares
//! the two scratch outputs byte for byte:
//!
//! ```text
//! PENDING → REFERENCE_RUN → CANDIDATE_RUN → COMPARED → PASS | FAIL
//!                 └──────────────┴──→ ABORTED (whole run)
//! ```
//!
//! A non-zero exit on either side is ordinary data. A timeout or internal error is not: the run stops at
//! that case and the remaining cases are never started.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::exec::{CommandExecutor, ExecutionOutcome};

use super::cases::TestCase;
use super::config::SOURCE_EXTENSION;
use super::error::HarnessError;
use super::failure_log::{FailureEntry, FailureLog};
use super::ledger::ResultLedger;
use super::pipeline::{CommandPlan, Side};
use super::reporter::{AbortInfo, CaseReporter, CaseVerdict, RunSummary};
use super::scratch::ScratchFiles;

/// Where a case is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    Pending,
    ReferenceRun,
    CandidateRun,
    Compared,
    Pass,
    Fail,
    Aborted,
}

impl CaseState {
    fn running(side: Side) -> Self {
        match side {
            Side::Reference => CaseState::ReferenceRun,
            Side::Candidate => CaseState::CandidateRun,
        }
    }
}

/// What happened to one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    /// The case source does not exist; nothing ran.
    Skipped,
    Verdict(CaseVerdict),
    /// A fatal outcome; the run must stop.
    Aborted(AbortInfo),
}

/// Owns everything a run mutates: scratch files, the ledger, and the failure log.
pub struct Orchestrator<E, P> {
    executor: E,
    plan: P,
    examples_dir: PathBuf,
    timeout: Option<Duration>,
    scratch: ScratchFiles,
    ledger: ResultLedger,
    fail_log: FailureLog,
}

impl<E: CommandExecutor, P: CommandPlan> Orchestrator<E, P> {
    pub fn new(
        executor: E,
        plan: P,
        examples_dir: impl Into<PathBuf>,
        timeout: Option<Duration>,
        fail_log: FailureLog,
    ) -> Result<Self, HarnessError> {
        let examples_dir = examples_dir.into();
        // Sources are handed to pipelines that run from another directory.
        let examples_dir = std::path::absolute(&examples_dir).map_err(|source| HarnessError::Layout {
            path: examples_dir.clone(),
            source,
        })?;
        let scratch = ScratchFiles::create().map_err(HarnessError::Scratch)?;
        tracing::debug!(dir = %scratch.dir().display(), "scratch directory created");
        Ok(Self {
            executor,
            plan,
            examples_dir,
            timeout,
            scratch,
            ledger: ResultLedger::new(),
            fail_log,
        })
    }

    pub fn ledger(&self) -> &ResultLedger {
        &self.ledger
    }

    pub fn fail_log(&self) -> &FailureLog {
        &self.fail_log
    }

    pub fn scratch(&self) -> &ScratchFiles {
        &self.scratch
    }

    /// Run every case in order, stopping at the first fatal outcome.
    ///
    /// An aborted run still returns `Ok`; check [`RunSummary::aborted`]. `Err` is reserved for the harness's
    /// own I/O (scratch files, failure log).
    #[tracing::instrument(skip_all, fields(case_count = cases.len()))]
    pub fn run(&mut self, cases: &[TestCase], reporter: &mut dyn CaseReporter) -> Result<RunSummary, HarnessError> {
        let started = Instant::now();
        let mut summary = RunSummary {
            total: cases.len(),
            ..RunSummary::default()
        };
        reporter.on_run_start(cases.len());

        for case in cases {
            match self.run_case(case, reporter)? {
                CaseResult::Skipped => {
                    summary.skipped += 1;
                    reporter.on_case_skipped(case);
                }
                CaseResult::Verdict(verdict) => {
                    match verdict {
                        CaseVerdict::Pass => summary.passed += 1,
                        CaseVerdict::Fail => summary.failed += 1,
                    }
                    summary.verdicts.push((case.clone(), verdict));
                    reporter.on_case_complete(case, verdict);
                }
                CaseResult::Aborted(abort) => {
                    reporter.on_abort(&abort);
                    summary.aborted = Some(abort);
                    break;
                }
            }
        }

        summary.duration = started.elapsed();
        reporter.on_run_complete(&summary);
        Ok(summary)
    }

    /// Take one case from PENDING to a terminal state.
    pub fn run_case(&mut self, case: &TestCase, reporter: &mut dyn CaseReporter) -> Result<CaseResult, HarnessError> {
        transition(case, CaseState::Pending);
        let source = self.examples_dir.join(format!("{}.{}", case.id(), SOURCE_EXTENSION));
        if !source.is_file() {
            tracing::debug!(case = %case, source = %source.display(), "case source missing; skipping");
            return Ok(CaseResult::Skipped);
        }

        self.scratch.reset().map_err(HarnessError::Scratch)?;

        for side in [Side::Reference, Side::Candidate] {
            transition(case, CaseState::running(side));
            let command = self.plan.command(side, case, &source, self.scratch.path(side));
            reporter.on_command(case, side, &command);

            let outcome = self.executor.execute(&command, self.timeout);
            let abort = outcome.is_fatal().then(|| AbortInfo {
                case: case.clone(),
                side,
                command,
                reason: outcome.error_detail().unwrap_or_default().to_string(),
            });
            self.ledger.record(side, case, outcome);

            if let Some(abort) = abort {
                transition(case, CaseState::Aborted);
                return Ok(CaseResult::Aborted(abort));
            }
        }

        let reference_output = self.scratch.read(Side::Reference).map_err(HarnessError::Scratch)?;
        let candidate_output = self.scratch.read(Side::Candidate).map_err(HarnessError::Scratch)?;
        transition(case, CaseState::Compared);

        if reference_output == candidate_output {
            transition(case, CaseState::Pass);
            return Ok(CaseResult::Verdict(CaseVerdict::Pass));
        }

        transition(case, CaseState::Fail);
        let missing = ExecutionOutcome::InternalError {
            detail: "no outcome recorded".to_string(),
        };
        let entry = FailureEntry {
            case,
            reference: self.ledger.get(Side::Reference, case).unwrap_or(&missing),
            candidate: self.ledger.get(Side::Candidate, case).unwrap_or(&missing),
            reference_output: reference_output.as_deref(),
            candidate_output: candidate_output.as_deref(),
        };
        self.fail_log.append(&entry).map_err(HarnessError::FailLogWrite)?;
        Ok(CaseResult::Verdict(CaseVerdict::Fail))
    }
}

fn transition(case: &TestCase, state: CaseState) {
    tracing::debug!(case = %case, state = ?state, "case state");
}
