//! Locating the configuration file for a directory
//!
//! Starting from a directory, each candidate file name is tried in tox's
//! priority order; if none qualifies the search moves to the parent
//! directory, up to the filesystem root or an explicit stop directory.

use std::path::Path;

use tox_fs::{ConfigFileName, NormalizedPath, io};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reader::{ConfigReader, ConfigSource};

/// A configuration file found by [`ConfigFinder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredConfig {
    pub path: NormalizedPath,
    pub source: ConfigSource,
}

impl DiscoveredConfig {
    /// The directory containing the file (tox's `tox_root`).
    pub fn root(&self) -> Option<NormalizedPath> {
        self.path.parent()
    }

    pub fn reader(&self) -> Box<dyn ConfigReader> {
        self.source.reader(self.path.clone())
    }

    pub fn read(&self) -> Result<Config> {
        self.reader().read()
    }
}

/// Walks up the directory tree looking for tox configuration.
///
/// ```no_run
/// use tox_config::ConfigFinder;
///
/// let found = ConfigFinder::new()
///     .start("services/api")
///     .stop_at(".")
///     .find()?;
/// println!("{} ({})", found.path, found.source);
/// # Ok::<(), tox_config::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigFinder {
    start: Option<NormalizedPath>,
    stop_at: Option<NormalizedPath>,
}

impl ConfigFinder {
    /// A finder starting at the current directory, unbounded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory to start from. Relative paths are resolved against the
    /// current directory; a file path starts from its directory.
    pub fn start(mut self, dir: impl Into<NormalizedPath>) -> Self {
        self.start = Some(dir.into());
        self
    }

    /// Last directory to search (inclusive).
    pub fn stop_at(mut self, dir: impl Into<NormalizedPath>) -> Self {
        self.stop_at = Some(dir.into());
        self
    }

    pub fn find(&self) -> Result<DiscoveredConfig> {
        let start = match &self.start {
            Some(dir) => io::resolve_dir(dir)?,
            None => io::resolve_dir(&io::current_dir()?)?,
        };
        let stop_at = self.stop_at.as_ref().map(io::resolve_dir).transpose()?;

        for dir in start.ancestors() {
            if let Some(found) = find_in_dir(&dir)? {
                tracing::debug!(path = %found.path, source = %found.source, "Found configuration");
                return Ok(found);
            }
            if stop_at.as_ref() == Some(&dir) {
                tracing::debug!(dir = %dir, "Reached stop directory");
                break;
            }
        }

        Err(Error::NotFound {
            directory: start.to_native(),
            searched: ConfigFileName::searched(),
        })
    }
}

/// Check a single directory, without looking at its ancestors.
pub fn find_in_dir(dir: &NormalizedPath) -> Result<Option<DiscoveredConfig>> {
    for source in ConfigSource::ALL {
        let path = dir.join(source.file_name());
        if source.can_read(&path)? {
            return Ok(Some(DiscoveredConfig { path, source }));
        }
        if path.is_file() {
            tracing::debug!(path = %path, %source, "Not a tox configuration, skipping");
        }
    }
    Ok(None)
}

/// Find the configuration for `directory`, or the current directory.
pub fn find_config_file(directory: Option<&Path>) -> Result<DiscoveredConfig> {
    let mut finder = ConfigFinder::new();
    if let Some(directory) = directory {
        finder = finder.start(directory);
    }
    finder.find()
}
