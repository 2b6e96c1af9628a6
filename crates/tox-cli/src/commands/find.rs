//! Find command implementation

use std::path::Path;

use colored::Colorize;
use tox_config::ConfigFinder;

use crate::error::Result;

/// Print the discovered file and its kind, e.g. `/src/proj/tox.ini (tox.ini)`.
pub fn run_find(dir: Option<&Path>) -> Result<()> {
    let mut finder = ConfigFinder::new();
    if let Some(dir) = dir {
        finder = finder.start(dir);
    }
    let found = finder.find()?;
    println!("{} ({})", found.path, found.source.to_string().dimmed());
    Ok(())
}
