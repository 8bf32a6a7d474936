use serde_json::error::Category;
use std::io;
use std::path::{Path, PathBuf};

/// Failures from reading or writing the state file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure (permissions, missing device, ...)
    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// File content could not be decoded into a state
    #[error("failed to decode state from {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    /// Whether this failure means the file content is malformed or truncated,
    /// as opposed to a genuine I/O fault.
    pub fn is_corruption(&self) -> bool {
        match self {
            StoreError::Decode { source, .. } => matches!(
                source.classify(),
                Category::Syntax | Category::Data | Category::Eof
            ),
            StoreError::Io { source, .. } => source.kind() == io::ErrorKind::UnexpectedEof,
            StoreError::Encode(_) => false,
        }
    }
}

/// Build a closure that wraps an `io::Error` with the path it happened on
pub(crate) fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
