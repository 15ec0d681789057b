//! Per-run scratch files holding each side's output for the current case

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::pipeline::Side;

/// Two scratch files in a temporary directory unique to this run.
///
/// The directory is removed when the value is dropped.
#[derive(Debug)]
pub struct ScratchFiles {
    dir: TempDir,
    reference: PathBuf,
    candidate: PathBuf,
}

impl ScratchFiles {
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("golden-harness-").tempdir()?;
        let reference = dir.path().join("goldenresult");
        let candidate = dir.path().join("candidateresult");
        Ok(Self {
            dir,
            reference,
            candidate,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, side: Side) -> &Path {
        match side {
            Side::Reference => &self.reference,
            Side::Candidate => &self.candidate,
        }
    }

    /// Remove both files so nothing from the previous case can leak into the next comparison.
    pub fn reset(&self) -> io::Result<()> {
        for path in [&self.reference, &self.candidate] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Contents of one side's file; `None` if the command never created it.
    pub fn read(&self, side: Side) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path(side)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
