//! Case list loading

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A named test input, `<examples>/<id>.cl` on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestCase(String);

impl TestCase {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
#[error("cannot read case list '{}': {source}", path.display())]
pub struct CaseListError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Parse a case list: one id per line, trimmed, blank lines dropped, order kept.
///
/// A repeated id keeps only its first position.
pub fn parse_case_list(text: &str) -> Vec<TestCase> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && seen.insert(*line))
        .map(TestCase::new)
        .collect()
}

/// Read and parse the case list at `path`.
pub fn load_case_list(path: &Path) -> Result<Vec<TestCase>, CaseListError> {
    let text = fs::read_to_string(path).map_err(|source| CaseListError {
        path: path.to_path_buf(),
        source,
    })?;
    let cases = parse_case_list(&text);
    tracing::debug!(path = %path.display(), count = cases.len(), "loaded case list");
    Ok(cases)
}
