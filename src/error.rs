use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ListError>;

#[derive(Debug, Error)]
pub enum ListError {
    /// The resolved directory could not be read: missing, not a directory,
    /// or permission denied.
    #[error("cannot read directory {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A `..` survived normalization and would leave the base path.
    #[error("path escapes the base directory: {path}")]
    Escape { path: String },
}

impl ListError {
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            ListError::Filesystem { source, .. } => Some(source.kind()),
            ListError::Escape { .. } => None,
        }
    }
}
