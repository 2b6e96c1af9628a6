//! Command implementations for tox-cli

pub mod envs;
pub mod find;
pub mod show;

pub use envs::run_envs;
pub use find::run_find;
pub use show::run_show;

use tox_config::{Config, ConfigFinder};
use tox_fs::{NormalizedPath, io};

use crate::cli::Target;
use crate::error::{CliError, Result};

/// A configuration read for a command, with the directory it applies to.
pub(crate) struct Loaded {
    pub root: NormalizedPath,
    pub config: Config,
}

/// Read the configuration named by `-c`, or discover one from the target
/// directory. `-c` wins when both are given.
pub(crate) fn load(target: &Target) -> Result<Loaded> {
    if let Some(file) = &target.config {
        if let Some(dir) = &target.dir {
            tracing::debug!(dir = %dir.display(), "Ignoring directory, a config file was given");
        }
        let path = NormalizedPath::from(file.as_path());
        if path.is_dir() {
            return Err(CliError::user(format!(
                "{path} is a directory, expected a configuration file"
            )));
        }
        let root = io::resolve_dir(&path)?;
        let config = tox_config::open(path)?.read()?;
        return Ok(Loaded { root, config });
    }

    let mut finder = ConfigFinder::new();
    if let Some(dir) = &target.dir {
        finder = finder.start(dir.as_path());
    }
    let found = finder.find()?;
    let root = match found.root() {
        Some(root) => root,
        None => io::current_dir()?,
    };
    Ok(Loaded {
        root,
        config: found.read()?,
    })
}
