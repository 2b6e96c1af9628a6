//! Readers for each configuration file format
//!
//! Every reader is built from an explicit path and reads the whole file on
//! [`ConfigReader::read`]; a read either yields a complete [`Config`] or an
//! error, never a partial result.

use std::fmt;

use tox_fs::{ConfigFileName, NormalizedPath, io};
use tox_ini::IniDocument;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::normalize;

const INI: &str = "INI";
const TOML: &str = "TOML";
const LEGACY_KEY: &str = "legacy_tox_ini";

/// The kinds of configuration file tox understands, in discovery priority
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    ToxIni,
    SetupCfg,
    /// `pyproject.toml` embedding INI text in `tool.tox.legacy_tox_ini`
    PyprojectLegacyIni,
    /// `pyproject.toml` with a native `[tool.tox]` table
    PyprojectToml,
    ToxToml,
}

impl ConfigSource {
    /// All sources, highest priority first.
    pub const ALL: [ConfigSource; 5] = [
        Self::ToxIni,
        Self::SetupCfg,
        Self::PyprojectLegacyIni,
        Self::PyprojectToml,
        Self::ToxToml,
    ];

    /// The file name this source is read from.
    pub fn file_name(&self) -> ConfigFileName {
        match self {
            Self::ToxIni => ConfigFileName::ToxIni,
            Self::SetupCfg => ConfigFileName::SetupCfg,
            Self::PyprojectLegacyIni | Self::PyprojectToml => ConfigFileName::PyprojectToml,
            Self::ToxToml => ConfigFileName::ToxToml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToxIni => "tox.ini",
            Self::SetupCfg => "setup.cfg",
            Self::PyprojectLegacyIni => "pyproject.toml (legacy_tox_ini)",
            Self::PyprojectToml => "pyproject.toml",
            Self::ToxToml => "tox.toml",
        }
    }

    /// Whether `path` holds tox configuration of this kind.
    ///
    /// The file name must match. `tox.ini` and `tox.toml` qualify whenever
    /// they exist. `setup.cfg` must contain a `[tox:tox]` or `[testenv`
    /// section header; a `pyproject.toml` must carry the matching `tool.tox`
    /// content. A `pyproject.toml` that is not valid TOML never qualifies.
    pub fn can_read(&self, path: &NormalizedPath) -> Result<bool> {
        if path.file_name() != Some(self.file_name().as_str()) || !path.is_file() {
            return Ok(false);
        }
        match self {
            Self::ToxIni | Self::ToxToml => Ok(true),
            Self::SetupCfg => {
                let content = io::read_text(path)?;
                Ok(content.contains("[tox:tox]") || content.contains("[testenv"))
            }
            Self::PyprojectLegacyIni => {
                Ok(pyproject_tox_table(path)?.is_some_and(|tox| tox.contains_key(LEGACY_KEY)))
            }
            Self::PyprojectToml => Ok(pyproject_tox_table(path)?
                .is_some_and(|tox| !tox.is_empty() && !tox.contains_key(LEGACY_KEY))),
        }
    }

    /// A reader for `path`, interpreted as this kind of source.
    pub fn reader(&self, path: NormalizedPath) -> Box<dyn ConfigReader> {
        match self {
            Self::ToxIni => Box::new(IniReader::tox_ini(path)),
            Self::SetupCfg => Box::new(IniReader::setup_cfg(path)),
            Self::PyprojectLegacyIni => Box::new(LegacyIniReader::new(path)),
            Self::PyprojectToml => Box::new(TomlReader::pyproject(path)),
            Self::ToxToml => Box::new(TomlReader::tox_toml(path)),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads one configuration file into a [`Config`].
pub trait ConfigReader: Send + Sync {
    /// The file this reader reads.
    fn path(&self) -> &NormalizedPath;

    fn source(&self) -> ConfigSource;

    fn read(&self) -> Result<Config>;
}

/// Reader for INI files: `tox.ini` and `setup.cfg`.
#[derive(Debug, Clone)]
pub struct IniReader {
    path: NormalizedPath,
    source: ConfigSource,
    core_section: &'static str,
}

impl IniReader {
    /// Core settings in `[tox]`.
    pub fn tox_ini(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            source: ConfigSource::ToxIni,
            core_section: "tox",
        }
    }

    /// Core settings in `[tox:tox]`.
    pub fn setup_cfg(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            source: ConfigSource::SetupCfg,
            core_section: "tox:tox",
        }
    }
}

impl ConfigReader for IniReader {
    fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn source(&self) -> ConfigSource {
        self.source
    }

    fn read(&self) -> Result<Config> {
        let content = io::read_text(&self.path)?;
        read_ini(&self.path, &content, self.core_section)
    }
}

/// Reader for INI text embedded in `pyproject.toml` under
/// `tool.tox.legacy_tox_ini`.
#[derive(Debug, Clone)]
pub struct LegacyIniReader {
    path: NormalizedPath,
}

impl LegacyIniReader {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigReader for LegacyIniReader {
    fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn source(&self) -> ConfigSource {
        ConfigSource::PyprojectLegacyIni
    }

    fn read(&self) -> Result<Config> {
        let document = read_toml(&self.path)?;
        let tox = nested_table(&self.path, document, &["tool", "tox"])?;
        match tox.get(LEGACY_KEY) {
            None => Ok(Config::new()),
            Some(toml::Value::String(content)) => read_ini(&self.path, content, "tox"),
            Some(other) => Err(Error::parse(
                self.path.to_native(),
                TOML,
                format!("tool.tox.{LEGACY_KEY} must be a string, got {}", other.type_str()),
            )),
        }
    }
}

/// Reader for native TOML configuration: `tox.toml` (settings at the root)
/// and `pyproject.toml` (settings under `tool.tox`).
#[derive(Debug, Clone)]
pub struct TomlReader {
    path: NormalizedPath,
    source: ConfigSource,
    key_path: &'static [&'static str],
}

impl TomlReader {
    pub fn tox_toml(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            source: ConfigSource::ToxToml,
            key_path: &[],
        }
    }

    pub fn pyproject(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            source: ConfigSource::PyprojectToml,
            key_path: &["tool", "tox"],
        }
    }
}

impl ConfigReader for TomlReader {
    fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn source(&self) -> ConfigSource {
        self.source
    }

    fn read(&self) -> Result<Config> {
        let document = read_toml(&self.path)?;
        let table = nested_table(&self.path, document, self.key_path)?;
        normalize::from_toml(table)
            .map_err(|invalid| Error::parse(self.path.to_native(), TOML, invalid.to_string()))
    }
}

/// Pick a reader from the file name, and for `pyproject.toml` from its
/// content.
///
/// Names other than the four tox knows are read by extension: `.ini` and
/// `.cfg` as `tox.ini`, `.toml` as `tox.toml`.
pub fn open(path: impl Into<NormalizedPath>) -> Result<Box<dyn ConfigReader>> {
    let path = path.into();
    let source = match path.file_name().and_then(ConfigFileName::from_file_name) {
        Some(ConfigFileName::ToxIni) => ConfigSource::ToxIni,
        Some(ConfigFileName::SetupCfg) => ConfigSource::SetupCfg,
        Some(ConfigFileName::ToxToml) => ConfigSource::ToxToml,
        Some(ConfigFileName::PyprojectToml) => {
            if ConfigSource::PyprojectLegacyIni.can_read(&path)? {
                ConfigSource::PyprojectLegacyIni
            } else {
                ConfigSource::PyprojectToml
            }
        }
        None => match path.extension() {
            Some("ini" | "cfg") => ConfigSource::ToxIni,
            Some("toml") => ConfigSource::ToxToml,
            _ => {
                return Err(Error::UnsupportedFile {
                    path: path.to_native(),
                });
            }
        },
    };
    tracing::debug!(path = %path, %source, "Opening configuration");
    Ok(source.reader(path))
}

fn read_ini(path: &NormalizedPath, content: &str, core_section: &str) -> Result<Config> {
    let document = IniDocument::parse(content)
        .map_err(|e| Error::parse(path.to_native(), INI, e.to_string()))?;
    normalize::from_ini(&document, core_section)
        .map_err(|invalid| Error::parse(path.to_native(), INI, invalid.to_string()))
}

fn read_toml(path: &NormalizedPath) -> Result<toml::Table> {
    let content = io::read_text(path)?;
    toml::from_str(&content).map_err(|e| Error::parse(path.to_native(), TOML, e.message()))
}

/// Descend into `keys`; a missing table is empty, a non-table is an error.
fn nested_table(path: &NormalizedPath, mut table: toml::Table, keys: &[&str]) -> Result<toml::Table> {
    for (depth, key) in keys.iter().enumerate() {
        table = match table.remove(*key) {
            None => return Ok(toml::Table::new()),
            Some(toml::Value::Table(inner)) => inner,
            Some(other) => {
                return Err(Error::parse(
                    path.to_native(),
                    TOML,
                    format!("{} must be a table, got {}", keys[..=depth].join("."), other.type_str()),
                ));
            }
        };
    }
    Ok(table)
}

/// The `tool.tox` table of a pyproject file, `None` when absent or when the
/// file is not valid TOML.
fn pyproject_tox_table(path: &NormalizedPath) -> Result<Option<toml::Table>> {
    let document = match read_toml(path) {
        Ok(document) => document,
        Err(Error::Parse { message, .. }) => {
            tracing::warn!(path = %path, %message, "Skipping invalid pyproject.toml");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    Ok(document
        .get("tool")
        .and_then(|tool| tool.get("tox"))
        .and_then(|tox| tox.as_table())
        .cloned())
}
