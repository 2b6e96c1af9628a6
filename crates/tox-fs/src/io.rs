//! Read-only filesystem access

use std::fs;

use crate::{Error, NormalizedPath, Result};

const UTF8_BOM: char = '\u{feff}';

/// Read text content from a file.
///
/// A leading UTF-8 byte order mark is dropped; editors on Windows like to
/// write one and it would otherwise end up glued to the first section header.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    let content = fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))?;
    tracing::debug!(path = %path, bytes = content.len(), "Read file");
    Ok(match content.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Resolve `path` to an absolute directory.
///
/// Relative paths are taken against the current directory. A path naming a
/// file resolves to the directory containing it.
pub fn resolve_dir(path: &NormalizedPath) -> Result<NormalizedPath> {
    let native_path = path.to_native();
    let canonical = dunce::canonicalize(&native_path).map_err(|e| Error::io(&native_path, e))?;

    if canonical.is_dir() {
        return Ok(NormalizedPath::new(canonical));
    }
    match canonical.parent() {
        Some(parent) if canonical.is_file() => Ok(NormalizedPath::new(parent)),
        _ => Err(Error::NotADirectory { path: canonical }),
    }
}

/// The current working directory.
pub fn current_dir() -> Result<NormalizedPath> {
    std::env::current_dir()
        .map(NormalizedPath::new)
        .map_err(|e| Error::io(".", e))
}
