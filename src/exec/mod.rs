//! Timeout-bounded shell command execution
//!
//! [`execute`] runs a shell command, merges its stderr into stdout, and turns whatever happens into an
//! [`ExecutionOutcome`]. The function is total: spawn failures, pipe errors and deadline overruns all come
//! back as outcomes, never as panics or `Err` values.
//!
//! ## Deadline enforcement
//!
//! When a timeout is given, a reader thread drains the merged output pipe while the calling thread polls the
//! child with `try_wait` every [`POLL_INTERVAL`]. Once the deadline passes, the child's whole process group is
//! killed (so every stage of a `a | b | c` pipeline goes down with the shell) and the outcome is
//! [`ExecutionOutcome::Timeout`].
//!
//! A timeout of `None` or zero disables the deadline and the executor blocks until the command exits.

mod process;

use std::time::Duration;

use process::Completion;

/// Interval between `try_wait` polls while a deadline is armed.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Error detail reported for every timed-out command.
pub const TIMEOUT_DETAIL: &str = "timeout";

/// Coarse classification of an [`ExecutionOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Success,
    NonZeroExit,
    Timeout,
    InternalError,
}

/// Result of one command execution.
///
/// Successful runs carry their captured output; every other variant carries diagnostic text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Exit code 0. `output` is the merged stream with one trailing newline removed.
    Success { output: String },
    /// The command exited non-zero (or was killed by a signal, in which case `code` is `None`).
    NonZeroExit { code: Option<i32>, detail: String },
    /// The deadline elapsed and the command was killed.
    Timeout,
    /// The command could not be spawned or its output could not be collected.
    InternalError { detail: String },
}

impl ExecutionOutcome {
    pub fn status(&self) -> ExecStatus {
        match self {
            ExecutionOutcome::Success { .. } => ExecStatus::Success,
            ExecutionOutcome::NonZeroExit { .. } => ExecStatus::NonZeroExit,
            ExecutionOutcome::Timeout => ExecStatus::Timeout,
            ExecutionOutcome::InternalError { .. } => ExecStatus::InternalError,
        }
    }

    /// Captured output, present only on success.
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Success { output } => Some(output),
            _ => None,
        }
    }

    /// Diagnostic text, present on every non-success status.
    pub fn error_detail(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::NonZeroExit { detail, .. } => Some(detail),
            ExecutionOutcome::Timeout => Some(TIMEOUT_DETAIL),
            ExecutionOutcome::InternalError { detail } => Some(detail),
        }
    }

    /// Whether this outcome must abort a harness run.
    ///
    /// A non-zero exit is ordinary data (an invalid test input is expected to make the toolchain complain);
    /// a hung or unspawnable toolchain is not.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecutionOutcome::Timeout | ExecutionOutcome::InternalError { .. })
    }
}

/// Execute shell commands and capture their outcome.
///
/// The orchestrator only talks to this trait, so tests can substitute scripted executors for real processes.
pub trait CommandExecutor {
    fn execute(&self, command: &str, timeout: Option<Duration>) -> ExecutionOutcome;
}

/// Runs commands through `sh -c` (current behavior).
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

impl CommandExecutor for ShellExecutor {
    fn execute(&self, command: &str, timeout: Option<Duration>) -> ExecutionOutcome {
        execute(command, timeout)
    }
}

/// Run `command` through the shell, enforcing `timeout` when it is non-zero.
pub fn execute(command: &str, timeout: Option<Duration>) -> ExecutionOutcome {
    tracing::debug!(command, timeout_ms = timeout.map(|t| t.as_millis() as u64), "executing command");

    let timeout = timeout.filter(|t| !t.is_zero());
    match process::run_shell(command, timeout, POLL_INTERVAL) {
        Ok(Completion::Exited { status, captured }) => {
            let text = strip_trailing_newline(String::from_utf8_lossy(&captured).into_owned());
            if status.success() {
                ExecutionOutcome::Success { output: text }
            } else {
                tracing::debug!(command, code = ?status.code(), "command exited unsuccessfully");
                ExecutionOutcome::NonZeroExit {
                    code: status.code(),
                    detail: text,
                }
            }
        }
        Ok(Completion::TimedOut) => {
            tracing::error!(command, "command timed out");
            ExecutionOutcome::Timeout
        }
        Err(e) => {
            tracing::error!(command, error = %e, "command failed to run");
            ExecutionOutcome::InternalError { detail: e.to_string() }
        }
    }
}

/// Remove exactly one trailing `\n`, if present.
pub fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

// ============================================================================
// Tests
// ============================================================================
