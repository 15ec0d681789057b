//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::exec::ShellExecutor;
use crate::harness::{
    ConsoleReporter, FailureLog, HarnessConfig, HarnessError, Orchestrator, Phase, RunSummary, TestCase,
    ToolchainPlan, load_case_list, toolchain,
};
use crate::version::HARNESS_VERSION;

use super::{CliError, CliResult, ExitCode};

/// Options that only affect `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub verbose: bool,
    pub summary_json: Option<PathBuf>,
}

fn harness_error(e: HarnessError) -> CliError {
    match e {
        HarnessError::StepAborted { .. } => CliError::aborted(format!("Error: {}", e)),
        other => CliError::failure(format!("Error: {}", other)),
    }
}

fn load_cases(config: &HarnessConfig) -> CliResult<Vec<TestCase>> {
    load_case_list(&config.case_list).map_err(|e| harness_error(e.into()))
}

/// `harness clean <phase>`
pub fn clean(config: &HarnessConfig, phase: Phase) -> CliResult<ExitCode> {
    let cases = load_cases(config)?;
    toolchain::clean_phase(&ShellExecutor, config, phase, &cases).map_err(harness_error)?;
    Ok(ExitCode::SUCCESS)
}

/// `harness run <phase>`
///
/// Exits successfully whatever the individual verdicts are; only an aborted run (or a broken
/// precondition such as a failed build) is an error.
pub fn run(config: &HarnessConfig, phase: Phase, options: &RunOptions) -> CliResult<ExitCode> {
    let cases = load_cases(config)?;

    toolchain::clean_artifacts(config, &cases).map_err(harness_error)?;
    if config.skip_build {
        tracing::info!(phase = %phase, "skipping build");
    } else {
        toolchain::build_phase(&ShellExecutor, config, phase).map_err(harness_error)?;
    }

    let fail_log = FailureLog::create(&config.fail_log).map_err(|source| {
        harness_error(HarnessError::FailLog {
            path: config.fail_log.clone(),
            source,
        })
    })?;

    let plan = ToolchainPlan::from_config(config, phase);
    let mut orchestrator = Orchestrator::new(
        ShellExecutor,
        plan,
        config.examples_dir(),
        config.command_timeout(),
        fail_log,
    )
    .map_err(harness_error)?;
    let mut reporter = ConsoleReporter::new(options.verbose);
    let summary = orchestrator.run(&cases, &mut reporter).map_err(harness_error)?;

    if let Some(path) = &options.summary_json {
        write_summary(path, phase, &summary)?;
    }

    if summary.is_aborted() {
        // The reporter has already printed the offending command.
        return Err(CliError::aborted(""));
    }
    Ok(ExitCode::SUCCESS)
}

/// Write the JSON run summary.
pub fn write_summary(path: &Path, phase: Phase, summary: &RunSummary) -> CliResult<()> {
    let mut json = summary.to_json();
    json["phase"] = phase.id().into();
    json["harness_version"] = HARNESS_VERSION.into();

    let text = serde_json::to_string_pretty(&json)
        .map_err(|e| CliError::failure(format!("Error serializing summary: {}", e)))?;
    fs::write(path, text + "\n")
        .map_err(|e| CliError::failure(format!("Error writing summary '{}': {}", path.display(), e)))
}
