use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors the file assembler can raise. The receiver maps any of these onto
/// the `FILESTORE_REJECTION` condition code.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// An I/O operation against the temp or destination file failed.
    #[error("filestore I/O error at {path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl AssemblerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
