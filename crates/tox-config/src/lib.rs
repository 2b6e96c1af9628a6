//! Reading tox configuration
//!
//! Finds the configuration that applies to a directory (`tox.ini`,
//! `setup.cfg`, `pyproject.toml` or `tox.toml`), parses it and normalizes it
//! into a [`Config`]: legacy key names are rewritten, list values are split,
//! `[testenv]` defaults are inherited by every environment and factor
//! conditional lines are evaluated. Substitution of `{...}` tokens is a
//! separate step, see [`Substitutor`].
//!
//! ```no_run
//! use tox_config::{Substitutor, read_config};
//!
//! let config = read_config(None)?;
//! for name in config.env_names() {
//!     println!("{name}");
//! }
//! let resolved = config.substitute(&Substitutor::new().posargs(["-x"]));
//! # let _ = resolved;
//! # Ok::<(), tox_config::Error>(())
//! ```

pub mod config;
pub mod discovery;
pub mod envlist;
pub mod error;
mod normalize;
pub mod reader;
pub mod schema;
pub mod settings;
pub mod substitution;
pub mod value;

use std::path::Path;

pub use config::Config;
pub use discovery::{ConfigFinder, DiscoveredConfig, find_config_file, find_in_dir};
pub use error::{Error, Result};
pub use reader::{ConfigReader, ConfigSource, IniReader, LegacyIniReader, TomlReader, open};
pub use settings::Settings;
pub use substitution::Substitutor;
pub use value::Value;

/// Find and read the configuration for `directory`, or the current
/// directory.
pub fn read_config(directory: Option<&Path>) -> Result<Config> {
    find_config_file(directory)?.read()
}
