//! Harness configuration
//!
//! Directory layout, timeouts, and how each side of the comparison finds its toolchain.

use std::fmt;
use std::io;
use std::path::{self, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Per-command deadline used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for `make` invocations.
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(600);

/// Extension of case source files under the examples directory.
pub const SOURCE_EXTENSION: &str = "cl";

/// Extension of the generated artifacts removed by `clean`.
pub const ARTIFACT_EXTENSION: &str = "s";

/// A toolchain phase that can be put under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Lexical analysis
    Pa2,
    /// Parsing
    Pa3,
    /// Semantic analysis
    Pa4,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Pa2, Phase::Pa3, Phase::Pa4];

    /// Directory name under `assignments/`, which is also the phase id on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Phase::Pa2 => "PA2",
            Phase::Pa3 => "PA3",
            Phase::Pa4 => "PA4",
        }
    }

    /// The `make` target that builds the stage under test.
    pub fn build_target(self) -> &'static str {
        self.stage_under_test()
    }

    /// The executable this phase is about.
    pub fn stage_under_test(self) -> &'static str {
        match self {
            Phase::Pa2 => "lexer",
            Phase::Pa3 => "parser",
            Phase::Pa4 => "semant",
        }
    }

    /// Every stage of the pipeline, ending with the stage under test.
    pub fn stages(self) -> &'static [&'static str] {
        match self {
            Phase::Pa2 => &["lexer"],
            Phase::Pa3 => &["lexer", "parser"],
            Phase::Pa4 => &["lexer", "parser", "semant"],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unrecognised phase id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase '{0}' (expected one of PA2, PA3, PA4)")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// Where a toolchain's executables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainSource {
    /// Resolve the bare executable name on `$PATH`.
    Path,
    /// Use executables from this directory.
    Dir(PathBuf),
}

impl ToolchainSource {
    /// Shell word that invokes `stage` from this source.
    ///
    /// `phase_dir` is the working directory the pipeline runs in; executables that live there are
    /// invoked as `./stage`.
    pub fn program(&self, stage: &str, phase_dir: &Path) -> String {
        match self {
            ToolchainSource::Path => stage.to_string(),
            ToolchainSource::Dir(dir) if dir == phase_dir => format!("./{stage}"),
            ToolchainSource::Dir(dir) => shell_quote(&dir.join(stage).to_string_lossy()),
        }
    }
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Repository root holding `examples/` and `assignments/`
    pub root: PathBuf,
    /// File listing one case id per line
    pub case_list: PathBuf,
    /// Where failing cases are written
    pub fail_log: PathBuf,
    /// Deadline for every individual command; zero disables it
    pub timeout: Duration,
    /// Deadline for build-system steps
    pub build_timeout: Duration,
    /// Toolchain producing the golden output
    pub reference: ToolchainSource,
    /// Directory of the candidate stage; `None` means the phase directory
    pub candidate_dir: Option<PathBuf>,
    /// Skip `make` before running cases
    pub skip_build: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".."),
            case_list: PathBuf::from("case.list"),
            fail_log: PathBuf::from("faillog.txt"),
            timeout: DEFAULT_TIMEOUT,
            build_timeout: DEFAULT_BUILD_TIMEOUT,
            reference: ToolchainSource::Path,
            candidate_dir: None,
            skip_build: false,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_case_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.case_list = path.into();
        self
    }

    pub fn with_fail_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_log = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn with_reference(mut self, source: ToolchainSource) -> Self {
        self.reference = source;
        self
    }

    pub fn with_candidate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.candidate_dir = Some(dir.into());
        self
    }

    pub fn with_skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }

    /// Anchor the layout and toolchain directories at the current directory.
    ///
    /// Pipelines `cd` into the phase directory before running, so every path they mention must be absolute.
    pub fn resolved(mut self) -> io::Result<Self> {
        self.root = path::absolute(&self.root)?;
        if let ToolchainSource::Dir(dir) = &self.reference {
            self.reference = ToolchainSource::Dir(path::absolute(dir)?);
        }
        if let Some(dir) = &self.candidate_dir {
            self.candidate_dir = Some(path::absolute(dir)?);
        }
        Ok(self)
    }

    /// Directory holding case sources.
    pub fn examples_dir(&self) -> PathBuf {
        self.root.join("examples")
    }

    /// Build directory of a phase; pipelines run with this as their working directory.
    pub fn phase_dir(&self, phase: Phase) -> PathBuf {
        self.root.join("assignments").join(phase.id())
    }

    /// Source artifact of a case.
    pub fn case_source(&self, case: &str) -> PathBuf {
        self.examples_dir().join(format!("{case}.{SOURCE_EXTENSION}"))
    }

    /// Generated artifact of a case, removed by `clean`.
    pub fn case_artifact(&self, case: &str) -> PathBuf {
        self.examples_dir().join(format!("{case}.{ARTIFACT_EXTENSION}"))
    }

    /// Toolchain source for the candidate side.
    pub fn candidate(&self, phase: Phase) -> ToolchainSource {
        ToolchainSource::Dir(self.candidate_dir.clone().unwrap_or_else(|| self.phase_dir(phase)))
    }

    /// Effective deadline handed to the executor.
    pub fn command_timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}

/// Quote `word` for POSIX `sh` using single quotes.
pub fn shell_quote(word: &str) -> String {
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('\'');
    for ch in word.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_str_is_case_insensitive() {
        assert_eq!("PA4".parse::<Phase>(), Ok(Phase::Pa4));
        assert_eq!("pa3".parse::<Phase>(), Ok(Phase::Pa3));
        assert_eq!(" PA2 ".parse::<Phase>(), Ok(Phase::Pa2));
    }

    #[test]
    fn test_phase_from_str_rejects_unknown() {
        let err = "PA9".parse::<Phase>().unwrap_err();
        assert_eq!(err, UnknownPhase("PA9".to_string()));
        assert!(err.to_string().contains("PA9"));
    }

    #[test]
    fn test_phase_build_targets() {
        assert_eq!(Phase::Pa2.build_target(), "lexer");
        assert_eq!(Phase::Pa3.build_target(), "parser");
        assert_eq!(Phase::Pa4.build_target(), "semant");
    }

    #[test]
    fn test_stages_end_with_stage_under_test() {
        for phase in Phase::ALL {
            assert_eq!(phase.stages().last(), Some(&phase.stage_under_test()));
        }
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.build_timeout, DEFAULT_BUILD_TIMEOUT);
        assert_eq!(config.case_list, PathBuf::from("case.list"));
        assert_eq!(config.fail_log, PathBuf::from("faillog.txt"));
        assert_eq!(config.reference, ToolchainSource::Path);
        assert!(!config.skip_build);
    }

    #[test]
    fn test_layout_paths() {
        let config = HarnessConfig::new().with_root("/work");
        assert_eq!(config.phase_dir(Phase::Pa4), PathBuf::from("/work/assignments/PA4"));
        assert_eq!(config.case_source("good"), PathBuf::from("/work/examples/good.cl"));
        assert_eq!(config.case_artifact("good"), PathBuf::from("/work/examples/good.s"));
    }

    #[test]
    fn test_resolved_makes_paths_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let config = HarnessConfig::new()
            .with_reference(ToolchainSource::Dir(PathBuf::from("ref/bin")))
            .with_candidate_dir("mine")
            .resolved()
            .unwrap();

        assert_eq!(config.root, cwd.join(".."));
        assert_eq!(config.reference, ToolchainSource::Dir(cwd.join("ref/bin")));
        assert_eq!(config.candidate_dir, Some(cwd.join("mine")));
        assert!(config.phase_dir(Phase::Pa4).is_absolute());
        assert!(config.examples_dir().is_absolute());
    }

    #[test]
    fn test_resolved_keeps_path_lookup_and_absolute_dirs() {
        let config = HarnessConfig::new().with_root("/work").resolved().unwrap();
        assert_eq!(config.root, PathBuf::from("/work"));
        assert_eq!(config.reference, ToolchainSource::Path);
        assert_eq!(config.candidate_dir, None);
    }

    #[test]
    fn test_candidate_defaults_to_phase_dir() {
        let config = HarnessConfig::new().with_root("/work");
        assert_eq!(
            config.candidate(Phase::Pa3),
            ToolchainSource::Dir(PathBuf::from("/work/assignments/PA3"))
        );
        let config = config.with_candidate_dir("/mine");
        assert_eq!(config.candidate(Phase::Pa3), ToolchainSource::Dir(PathBuf::from("/mine")));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        assert_eq!(HarnessConfig::new().with_timeout(Duration::ZERO).command_timeout(), None);
        assert_eq!(
            HarnessConfig::new().command_timeout(),
            Some(DEFAULT_TIMEOUT)
        );
    }

    #[test]
    fn test_toolchain_program() {
        let phase_dir = Path::new("/work/assignments/PA4");
        assert_eq!(ToolchainSource::Path.program("semant", phase_dir), "semant");
        assert_eq!(
            ToolchainSource::Dir(phase_dir.to_path_buf()).program("semant", phase_dir),
            "./semant"
        );
        assert_eq!(
            ToolchainSource::Dir(PathBuf::from("/opt/ref bin")).program("semant", phase_dir),
            "'/opt/ref bin/semant'"
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
