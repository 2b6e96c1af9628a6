//! File names tox recognizes as configuration.

/// A configuration file name tox looks for in every directory it searches.
///
/// Variants are declared in discovery priority order; [`ConfigFileName::ALL`]
/// preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFileName {
    /// `tox.ini`, always tox configuration
    ToxIni,
    /// `setup.cfg`, only when it carries `[tox:tox]` or `[testenv]` sections
    SetupCfg,
    /// `pyproject.toml`, only when it carries a `[tool.tox]` table
    PyprojectToml,
    /// `tox.toml`, always tox configuration
    ToxToml,
}

impl ConfigFileName {
    /// All recognized names, highest priority first.
    pub const ALL: [ConfigFileName; 4] = [
        Self::ToxIni,
        Self::SetupCfg,
        Self::PyprojectToml,
        Self::ToxToml,
    ];

    /// Get the string representation of the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToxIni => "tox.ini",
            Self::SetupCfg => "setup.cfg",
            Self::PyprojectToml => "pyproject.toml",
            Self::ToxToml => "tox.toml",
        }
    }

    /// Look up a recognized name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == name)
    }

    /// Comma separated list of every name, in priority order.
    pub fn searched() -> String {
        Self::ALL
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lets a name be passed straight to `NormalizedPath::join`.
impl AsRef<str> for ConfigFileName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ConfigFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
