//! Show command implementation

use tox_config::Substitutor;

use crate::cli::Target;
use crate::commands::load;
use crate::error::Result;

/// Print the configuration as pretty JSON.
///
/// With `resolve`, substitutions are applied first; `tox_root` and
/// `toxinidir` are bound to the configuration's directory and `posargs`
/// feed `{posargs}`.
pub fn run_show(target: &Target, resolve: bool, posargs: &[String]) -> Result<()> {
    let loaded = load(target)?;

    let config = if resolve {
        let root = loaded.root.to_string();
        let substitutor = Substitutor::new()
            .posargs(posargs)
            .var("tox_root", root.as_str())
            .var("toxinidir", root.as_str());
        loaded.config.substitute(&substitutor)
    } else {
        if !posargs.is_empty() {
            tracing::warn!("Positional arguments are only used with --resolve");
        }
        loaded.config
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
