//! Error types for tox-ini

/// Result type for tox-ini operations
pub type Result<T> = std::result::Result<T, Error>;

/// Syntax errors, each carrying the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("line {line}: unterminated section header: {text}")]
    UnterminatedSectionHeader { line: usize, text: String },

    #[error("line {line}: empty section name")]
    EmptySectionName { line: usize },

    #[error("line {line}: option outside of any section: {text}")]
    MissingSectionHeader { line: usize, text: String },

    #[error("line {line}: expected 'key = value', got: {text}")]
    MissingDelimiter { line: usize, text: String },

    #[error("line {line}: empty option name")]
    EmptyOptionName { line: usize },

    #[error("line {line}: section [{name}] already defined on line {first}")]
    DuplicateSection {
        line: usize,
        name: String,
        first: usize,
    },

    #[error("line {line}: option '{key}' already defined in section [{section}]")]
    DuplicateOption {
        line: usize,
        section: String,
        key: String,
    },
}

impl Error {
    /// The 1-based line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            Self::UnterminatedSectionHeader { line, .. }
            | Self::EmptySectionName { line }
            | Self::MissingSectionHeader { line, .. }
            | Self::MissingDelimiter { line, .. }
            | Self::EmptyOptionName { line }
            | Self::DuplicateSection { line, .. }
            | Self::DuplicateOption { line, .. } => *line,
        }
    }
}
