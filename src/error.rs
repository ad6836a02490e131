use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a sweep
///
/// Unreadable directories and failed removals inside a target are not errors;
/// they are reported through [`crate::scanner::SkippedDir`] and
/// [`crate::apply::Outcome::Partial`].
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("empty path, nothing to scan")]
    EmptyPath,

    #[error("invalid path: {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to update ignore file {}: {source}", path.display())]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to draw progress: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;
