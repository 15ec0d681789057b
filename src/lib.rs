#![forbid(unsafe_code)]
//! Golden-comparison regression harness
//!
//! Drives a multi-stage toolchain (for example `lexer | parser | semant`) over a list of test cases,
//! runs a trusted reference pipeline and the candidate pipeline for each, and classifies every case as
//! PASS or FAIL by comparing their outputs byte for byte.
//!
//! - [`exec`] runs one shell command under a wall-clock deadline.
//! - [`harness`] builds the command pipelines, compares results, and reports.
//! - [`cli`] is the `harness <clean|run> <phase>` front end.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Command execution**: [`exec::execute`] never fails; every failure becomes an outcome.

pub mod cli;
pub mod exec;
pub mod harness;
pub mod version;

pub use exec::{CommandExecutor, ExecStatus, ExecutionOutcome, ShellExecutor, execute};
pub use harness::{HarnessConfig, Orchestrator, Phase, RunSummary, TestCase};
