//! Shell command construction for both sides of a comparison

use std::fmt;
use std::path::{Path, PathBuf};

use super::cases::TestCase;
use super::config::{HarnessConfig, Phase, ToolchainSource, shell_quote};

/// Which side of the comparison a command or outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The trusted baseline
    Reference,
    /// The implementation under test
    Candidate,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Reference => "golden",
            Side::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the shell command that runs one side of a case.
///
/// The command must write the stream being compared to `scratch`; whatever it prints to stdout/stderr
/// is captured separately as the execution outcome.
pub trait CommandPlan {
    fn command(&self, side: Side, case: &TestCase, source: &Path, scratch: &Path) -> String;
}

/// Toolchain pipelines for one phase: `cd <phase dir> && stage1 <source> | ... | stageN > <scratch>`.
#[derive(Debug, Clone)]
pub struct ToolchainPlan {
    phase: Phase,
    phase_dir: PathBuf,
    reference: ToolchainSource,
    candidate: ToolchainSource,
}

impl ToolchainPlan {
    pub fn new(phase: Phase, phase_dir: impl Into<PathBuf>, reference: ToolchainSource, candidate: ToolchainSource) -> Self {
        Self {
            phase,
            phase_dir: phase_dir.into(),
            reference,
            candidate,
        }
    }

    pub fn from_config(config: &HarnessConfig, phase: Phase) -> Self {
        Self::new(phase, config.phase_dir(phase), config.reference.clone(), config.candidate(phase))
    }

    fn toolchain(&self, side: Side) -> &ToolchainSource {
        match side {
            Side::Reference => &self.reference,
            Side::Candidate => &self.candidate,
        }
    }

    /// The pipeline stages for `side`, fed from `source`.
    pub fn pipeline(&self, side: Side, source: &Path) -> String {
        let under_test = self.phase.stage_under_test();
        let local = ToolchainSource::Dir(self.phase_dir.clone());

        let programs: Vec<String> = self
            .phase
            .stages()
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                let toolchain = if *stage == under_test { self.toolchain(side) } else { &local };
                let program = toolchain.program(stage, &self.phase_dir);
                if i == 0 {
                    format!("{} {}", program, shell_quote(&source.to_string_lossy()))
                } else {
                    program
                }
            })
            .collect();
        programs.join(" | ")
    }
}

impl CommandPlan for ToolchainPlan {
    fn command(&self, side: Side, _case: &TestCase, source: &Path, scratch: &Path) -> String {
        format!(
            "cd {} && {} > {}",
            shell_quote(&self.phase_dir.to_string_lossy()),
            self.pipeline(side, source),
            shell_quote(&scratch.to_string_lossy())
        )
    }
}
