use thiserror::Error;

use super::tools::ToolError;
use crate::core::io::conf::TemplateError;
use crate::core::io::pdb::PdbParseErrorKind;
use std::io;
use std::path::PathBuf;

/// Failure of a single job. Never escapes the batch.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("No '.{extension}' structure file found under '{dir}'", dir = dir.display())]
    Discovery { dir: PathBuf, extension: String },

    #[error("External tool failed: {0}")]
    Collaborator(#[from] ToolError),

    #[error("Malformed coordinates in '{path}' on line {line}: {kind}", path = path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        kind: PdbParseErrorKind,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure that prevents a batch from starting or continuing.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Missing dependency '{dependency}': {reason}")]
    DependencyMissing { dependency: String, reason: String },

    #[error("Cannot read input root '{path}': {source}", path = path.display())]
    InputRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
