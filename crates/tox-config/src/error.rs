//! Error types for tox-config

use std::path::PathBuf;

/// Result type for tox-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating or reading tox configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No configuration file in the start directory or any ancestor
    #[error("No tox configuration file found in {directory}. Searched for: {searched}")]
    NotFound { directory: PathBuf, searched: String },

    /// The file exists but its content is malformed
    #[error("Failed to parse {format} config at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// The file name does not identify a known configuration format
    #[error("Unsupported configuration file: {path}")]
    UnsupportedFile { path: PathBuf },

    #[error(transparent)]
    Fs(#[from] tox_fs::Error),
}

impl Error {
    pub(crate) fn parse(
        path: impl Into<PathBuf>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            format: format.into(),
            message: message.into(),
        }
    }

    /// True for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`Error::Parse`].
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
