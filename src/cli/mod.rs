//! CLI module for the golden harness
//!
//! ## Commands
//!
//! - `clean <phase>` - Remove generated case artifacts and run the phase's `make clean`
//! - `run <phase>` - Build the phase target and compare every case against the reference toolchain
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::harness::{HarnessConfig, Phase, ToolchainSource};
use crate::version::HARNESS_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// A command timed out or could not run; the rest of the case list was abandoned.
    pub const ABORTED: ExitCode = ExitCode(255);
}

/// A message for stderr and the exit code that goes with it; [`run`] prints the one and exits with the other.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an abort error (exit code 255).
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::ABORTED)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Golden-comparison regression harness for multi-stage toolchains
#[derive(Parser, Debug)]
#[command(name = "harness")]
#[command(version = HARNESS_VERSION)]
#[command(about = "Compare a toolchain phase against its reference implementation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub options: GlobalOptions,
}

/// Layout and deadline options shared by every command.
#[derive(Args, Debug, Default)]
pub struct GlobalOptions {
    /// Root holding `examples/` and `assignments/` (default: ..)
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Case list file, one case per line (default: case.list)
    #[arg(long = "case-list", value_name = "FILE", global = true)]
    pub case_list: Option<PathBuf>,

    /// Failure log written by `run` (default: faillog.txt)
    #[arg(long = "fail-log", value_name = "FILE", global = true)]
    pub fail_log: Option<PathBuf>,

    /// Per-command timeout in seconds, 0 disables it (default: 10)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Timeout for make invocations in seconds (default: 600)
    #[arg(long = "build-timeout", value_name = "SECS", global = true)]
    pub build_timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove generated case artifacts and run the phase's clean step
    Clean {
        /// Phase id (PA2, PA3, PA4)
        #[arg(value_name = "PHASE")]
        phase: Phase,
    },

    /// Build the phase and compare every case against the reference toolchain
    Run {
        /// Phase id (PA2, PA3, PA4)
        #[arg(value_name = "PHASE")]
        phase: Phase,
        /// Directory holding the reference executables (default: resolve on PATH)
        #[arg(long = "reference-bin-dir", value_name = "DIR")]
        reference_bin_dir: Option<PathBuf>,
        /// Directory holding the candidate stage (default: the phase directory)
        #[arg(long = "candidate-bin-dir", value_name = "DIR")]
        candidate_bin_dir: Option<PathBuf>,
        /// Use the executables already built
        #[arg(long = "skip-build")]
        skip_build: bool,
        /// Write a JSON summary of the run
        #[arg(long = "summary-json", value_name = "FILE")]
        summary_json: Option<PathBuf>,
        /// Echo each command before it runs
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Cli {
    /// Whether the command asked for verbose output.
    pub fn verbose(&self) -> bool {
        matches!(self.command, Command::Run { verbose: true, .. })
    }
}

impl GlobalOptions {
    /// Overlay the given flags on the default configuration.
    pub fn to_config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::default();
        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        if let Some(case_list) = &self.case_list {
            config = config.with_case_list(case_list);
        }
        if let Some(fail_log) = &self.fail_log {
            config = config.with_fail_log(fail_log);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.build_timeout {
            config = config.with_build_timeout(Duration::from_secs(secs));
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose());

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.options.to_config();

    match cli.command {
        Command::Clean { phase } => commands::clean(&resolve(config)?, phase),
        Command::Run {
            phase,
            reference_bin_dir,
            candidate_bin_dir,
            skip_build,
            summary_json,
            verbose,
        } => {
            let mut config = config.with_skip_build(skip_build);
            if let Some(dir) = reference_bin_dir {
                config = config.with_reference(ToolchainSource::Dir(dir));
            }
            if let Some(dir) = candidate_bin_dir {
                config = config.with_candidate_dir(dir);
            }
            let options = commands::RunOptions { verbose, summary_json };
            commands::run(&resolve(config)?, phase, &options)
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}

/// Structured logging on stderr; case verdicts own stdout.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn resolve(config: HarnessConfig) -> CliResult<HarnessConfig> {
    config
        .resolved()
        .map_err(|e| CliError::failure(format!("Error: cannot resolve harness root: {}", e)))
}

// ============================================================================
// Tests
// ============================================================================
