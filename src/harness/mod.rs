//! Golden-comparison harness
//!
//! ## Modules
//!
//! - `config` - Directory layout, phases, timeouts, toolchain sources
//! - `cases` - Case list loading
//! - `pipeline` - Reference and candidate command construction
//! - `scratch` - Per-run scratch files
//! - `ledger` - Outcomes recorded per case and side
//! - `failure_log` - Append-only failure sink
//! - `reporter` - Presentation of case verdicts and the run summary
//! - `orchestrator` - The per-case state machine
//! - `toolchain` - `make` glue for cleaning and building a phase

pub mod cases;
pub mod config;
mod error;
pub mod failure_log;
pub mod ledger;
pub mod orchestrator;
pub mod pipeline;
pub mod reporter;
pub mod scratch;
pub mod toolchain;

pub use cases::{CaseListError, TestCase, load_case_list, parse_case_list};
pub use config::{HarnessConfig, Phase, ToolchainSource, UnknownPhase};
pub use error::HarnessError;
pub use failure_log::{FailureEntry, FailureLog};
pub use ledger::ResultLedger;
pub use orchestrator::{CaseResult, CaseState, Orchestrator};
pub use pipeline::{CommandPlan, Side, ToolchainPlan};
pub use reporter::{AbortInfo, CaseReporter, CaseVerdict, ConsoleReporter, RunSummary};
pub use scratch::ScratchFiles;
