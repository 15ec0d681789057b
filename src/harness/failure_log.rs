//! Append-only log of failing cases
//!
//! Each failing case gets one section holding both captured outcomes verbatim, followed by a
//! line-by-line diff of the two scratch outputs:
//!
//! ```text
//! ===== case t2 result for golden is =====
//! <reference outcome>
//! ===== case t2 result for candidate is =====
//! <candidate outcome>
//! ===== case t2 output diff (golden vs candidate) =====
//! -   1 | 1
//! +   1 | 2
//! ```

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::exec::ExecutionOutcome;

use super::cases::TestCase;
use super::pipeline::Side;

/// Failure sink opened once per run.
pub struct FailureLog {
    writer: Box<dyn Write>,
    path: Option<PathBuf>,
    sections: usize,
}

impl FailureLog {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            path: Some(path.to_path_buf()),
            sections: 0,
        })
    }

    /// Log into an arbitrary writer.
    pub fn from_writer(writer: impl Write + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            path: None,
            sections: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of sections written so far.
    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Append one case's section and flush it.
    pub fn append(&mut self, entry: &FailureEntry<'_>) -> io::Result<()> {
        self.writer.write_all(render_section(entry).as_bytes())?;
        self.writer.flush()?;
        self.sections += 1;
        Ok(())
    }
}

impl std::fmt::Debug for FailureLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureLog")
            .field("path", &self.path)
            .field("sections", &self.sections)
            .finish_non_exhaustive()
    }
}

/// Everything recorded about one failing case.
#[derive(Debug, Clone, Copy)]
pub struct FailureEntry<'a> {
    pub case: &'a TestCase,
    pub reference: &'a ExecutionOutcome,
    pub candidate: &'a ExecutionOutcome,
    pub reference_output: Option<&'a [u8]>,
    pub candidate_output: Option<&'a [u8]>,
}

impl FailureEntry<'_> {
    fn outcome(&self, side: Side) -> &ExecutionOutcome {
        match side {
            Side::Reference => self.reference,
            Side::Candidate => self.candidate,
        }
    }
}

/// Render one log section.
pub fn render_section(entry: &FailureEntry<'_>) -> String {
    let mut out = String::new();
    for side in [Side::Reference, Side::Candidate] {
        let _ = writeln!(out, "===== case {} result for {} is =====", entry.case, side);
        let _ = writeln!(out, "{}", describe_outcome(entry.outcome(side)));
    }
    let _ = writeln!(
        out,
        "===== case {} output diff ({} vs {}) =====",
        entry.case,
        Side::Reference,
        Side::Candidate
    );
    out.push_str(&line_diff(entry.reference_output, entry.candidate_output));
    out
}

/// Human-readable text for an outcome.
pub fn describe_outcome(outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Success { output } => output.clone(),
        ExecutionOutcome::NonZeroExit { code: Some(code), detail } => format!("[exit {code}] {detail}"),
        ExecutionOutcome::NonZeroExit { code: None, detail } => format!("[killed by signal] {detail}"),
        ExecutionOutcome::Timeout => "[timeout]".to_string(),
        ExecutionOutcome::InternalError { detail } => format!("[internal error] {detail}"),
    }
}

/// Line-by-line listing of the lines that differ between the two scratch outputs.
pub fn line_diff(reference: Option<&[u8]>, candidate: Option<&[u8]>) -> String {
    let (reference, candidate) = match (reference, candidate) {
        (Some(r), Some(c)) => (String::from_utf8_lossy(r), String::from_utf8_lossy(c)),
        (None, None) => return "(neither side produced an output file)\n".to_string(),
        (None, Some(_)) => return format!("({} produced no output file)\n", Side::Reference),
        (Some(_), None) => return format!("({} produced no output file)\n", Side::Candidate),
    };

    let mut diff = String::new();
    let reference_lines: Vec<&str> = reference.lines().collect();
    let candidate_lines: Vec<&str> = candidate.lines().collect();
    let max_lines = reference_lines.len().max(candidate_lines.len());

    for i in 0..max_lines {
        let left = reference_lines.get(i);
        let right = candidate_lines.get(i);
        if left != right {
            if let Some(line) = left {
                let _ = writeln!(diff, "-{:4} | {}", i + 1, line);
            }
            if let Some(line) = right {
                let _ = writeln!(diff, "+{:4} | {}", i + 1, line);
            }
        }
    }

    if diff.is_empty() && reference != candidate {
        diff.push_str("(outputs differ only in line endings or trailing bytes)\n");
    }
    diff
}
