//! Envs command implementation

use crate::cli::Target;
use crate::commands::load;
use crate::error::Result;

/// Print every environment name, `env_list` entries first.
pub fn run_envs(target: &Target) -> Result<()> {
    let loaded = load(target)?;
    for name in loaded.config.env_names() {
        println!("{name}");
    }
    Ok(())
}
