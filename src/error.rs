use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while obtaining or indexing the episode catalog. All of them are
/// fatal for the run: a partial catalog is never used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no catalog source configured (pass --catalog <FILE> or --api-key <KEY>)")]
    NoSource,

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog source answered with HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("catalog login was rejected: {0}")]
    Auth(String),

    #[error("could not read catalog snapshot {path:?}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("catalog data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("catalog is empty")]
    Empty,

    #[error("catalog contains episode id {0} more than once")]
    DuplicateId(u64),
}

/// Invalid operator input at the disambiguation prompt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("{choice} is not between 0 and {max}")]
    OutOfRange { choice: usize, max: usize },
}

/// Failures of a single rename. The batch reports them and moves on.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("target file '{0}' already exists")]
    AlreadyExists(PathBuf),

    #[error("no permission to rename '{0}'")]
    NoPermission(PathBuf),

    #[error("source file '{0}' not found")]
    SourceNotFound(PathBuf),

    #[error("renaming '{path}' failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RenameError {
    pub fn from_io(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => RenameError::NoPermission(path),
            io::ErrorKind::NotFound => RenameError::SourceNotFound(path),
            _ => RenameError::Io { path, source: err },
        }
    }
}
