//! Build-system glue: cleaning generated artifacts and building a phase target

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::exec::{CommandExecutor, ExecutionOutcome};

use super::cases::TestCase;
use super::config::{HarnessConfig, Phase, shell_quote};
use super::error::HarnessError;

/// `make clean` in the phase directory.
pub fn clean_command(phase_dir: &Path) -> String {
    format!("cd {} && make clean", shell_quote(&phase_dir.to_string_lossy()))
}

/// Clean rebuild of everything, then the phase's own target.
pub fn build_command(phase_dir: &Path, target: &str) -> String {
    format!(
        "cd {} && make clean && make -j && make {} -j",
        shell_quote(&phase_dir.to_string_lossy()),
        target
    )
}

/// Remove the generated `<case>.s` artifact of every listed case. Returns how many were removed.
pub fn clean_artifacts(config: &HarnessConfig, cases: &[TestCase]) -> Result<usize, HarnessError> {
    let mut removed = 0;
    for case in cases {
        let path = config.case_artifact(case.id());
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed artifact");
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(HarnessError::Clean { path, source }),
        }
    }
    Ok(removed)
}

/// Run one build-system step and insist that it succeeds.
pub fn run_step(
    executor: &dyn CommandExecutor,
    step: &str,
    command: &str,
    timeout: Option<Duration>,
) -> Result<String, HarnessError> {
    match executor.execute(command, timeout) {
        ExecutionOutcome::Success { output } => Ok(output),
        ExecutionOutcome::NonZeroExit { code, detail } => Err(HarnessError::StepFailed {
            step: step.to_string(),
            code: code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            detail,
        }),
        fatal => Err(HarnessError::StepAborted {
            step: step.to_string(),
            command: command.to_string(),
            detail: fatal.error_detail().unwrap_or_default().to_string(),
        }),
    }
}

/// `clean`: drop generated artifacts, then `make clean`.
///
/// A failing `make clean` is only a warning; a hung one is fatal.
pub fn clean_phase(
    executor: &dyn CommandExecutor,
    config: &HarnessConfig,
    phase: Phase,
    cases: &[TestCase],
) -> Result<(), HarnessError> {
    let removed = clean_artifacts(config, cases)?;
    tracing::info!(phase = %phase, removed, "cleaned case artifacts");

    let command = clean_command(&config.phase_dir(phase));
    match run_step(executor, "make clean", &command, Some(config.build_timeout)) {
        Ok(_) => Ok(()),
        Err(HarnessError::StepFailed { code, detail, .. }) => {
            tracing::warn!(phase = %phase, code = %code, detail = %detail, "make clean failed");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Build the phase's target; the build succeeding is a precondition for running cases.
pub fn build_phase(executor: &dyn CommandExecutor, config: &HarnessConfig, phase: Phase) -> Result<(), HarnessError> {
    let command = build_command(&config.phase_dir(phase), phase.build_target());
    let step = format!("build of '{}'", phase.build_target());
    run_step(executor, &step, &command, Some(config.build_timeout))?;
    tracing::info!(phase = %phase, target = phase.build_target(), "build finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ShellExecutor;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records every command and answers with a fixed outcome.
    struct Scripted {
        outcome: ExecutionOutcome,
        seen: RefCell<Vec<String>>,
    }

    impl CommandExecutor for Scripted {
        fn execute(&self, command: &str, _timeout: Option<Duration>) -> ExecutionOutcome {
            self.seen.borrow_mut().push(command.to_string());
            self.outcome.clone()
        }
    }

    fn scripted(outcome: ExecutionOutcome) -> Scripted {
        Scripted {
            outcome,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_build_command() {
        assert_eq!(
            build_command(Path::new("/w/assignments/PA4"), "semant"),
            "cd '/w/assignments/PA4' && make clean && make -j && make semant -j"
        );
        assert_eq!(clean_command(Path::new("/w/a")), "cd '/w/a' && make clean");
    }

    #[test]
    fn test_clean_artifacts_removes_only_listed() {
        let root = tempfile::tempdir().unwrap();
        let examples = root.path().join("examples");
        fs::create_dir_all(&examples).unwrap();
        fs::write(examples.join("a.s"), "").unwrap();
        fs::write(examples.join("b.s"), "").unwrap();
        fs::write(examples.join("a.cl"), "").unwrap();

        let config = HarnessConfig::new().with_root(root.path());
        let removed = clean_artifacts(&config, &[TestCase::new("a"), TestCase::new("missing")]).unwrap();

        assert_eq!(removed, 1);
        assert!(!examples.join("a.s").exists());
        assert!(examples.join("b.s").exists());
        assert!(examples.join("a.cl").exists());
    }

    #[test]
    fn test_run_step_maps_outcomes() {
        let ok = run_step(&ShellExecutor, "echo", "echo built", None).unwrap();
        assert_eq!(ok, "built");

        let err = run_step(&ShellExecutor, "build", "echo 'no rule'; exit 2", None).unwrap_err();
        assert!(matches!(err, HarnessError::StepFailed { ref code, .. } if code == "2"));
        assert!(err.to_string().contains("no rule"));

        let err = run_step(&scripted(ExecutionOutcome::Timeout), "build", "make", None).unwrap_err();
        assert!(matches!(err, HarnessError::StepAborted { ref detail, .. } if detail == "timeout"));
    }

    #[test]
    fn test_clean_phase_tolerates_failing_make() {
        let root = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new().with_root(root.path());
        let executor = scripted(ExecutionOutcome::NonZeroExit {
            code: Some(2),
            detail: "make: *** No rule to make target 'clean'.".to_string(),
        });

        clean_phase(&executor, &config, Phase::Pa4, &[]).unwrap();
        let expected_dir: PathBuf = root.path().join("assignments").join("PA4");
        assert_eq!(*executor.seen.borrow(), vec![clean_command(&expected_dir)]);
    }

    #[test]
    fn test_clean_phase_timeout_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new().with_root(root.path());
        let err = clean_phase(&scripted(ExecutionOutcome::Timeout), &config, Phase::Pa2, &[]).unwrap_err();
        assert!(matches!(err, HarnessError::StepAborted { .. }));
    }

    #[test]
    fn test_build_phase_uses_target() {
        let config = HarnessConfig::new().with_root("/w");
        let executor = scripted(ExecutionOutcome::Success { output: String::new() });
        build_phase(&executor, &config, Phase::Pa3).unwrap();
        assert_eq!(
            *executor.seen.borrow(),
            vec!["cd '/w/assignments/PA3' && make clean && make -j && make parser -j".to_string()]
        );
    }
}
