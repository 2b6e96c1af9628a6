//! Filesystem helpers for the tox configuration reader
//!
//! Provides normalized path handling, text reads that report the offending
//! path, and the table of file names tox recognizes as configuration.

pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use constants::ConfigFileName;
pub use error::{Error, Result};
pub use path::NormalizedPath;
