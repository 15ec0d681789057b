use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::cases::CaseListError;

/// Errors that stop the harness outside of case classification.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    CaseList(#[from] CaseListError),

    #[error("cannot resolve '{}': {source}", path.display())]
    Layout {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create failure log '{}': {source}", path.display())]
    FailLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write failure log: {0}")]
    FailLogWrite(#[source] io::Error),

    #[error("scratch file error: {0}")]
    Scratch(#[source] io::Error),

    #[error("cannot remove '{}': {source}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{step} failed (exit {code}):\n{detail}")]
    StepFailed { step: String, code: String, detail: String },

    #[error("{step} aborted: {detail}\n  command: {command}")]
    StepAborted { step: String, command: String, detail: String },
}
