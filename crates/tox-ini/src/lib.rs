//! INI parsing for tox configuration.
//!
//! tox reads its INI files with Python's `configparser` (interpolation
//! disabled). This crate reproduces the parts of that grammar tox files rely
//! on:
//!
//! ```text
//! [DEFAULT]
//! shared = value            ; fallback for every section
//!
//! [testenv]
//! deps =
//!     pytest
//!     coverage
//! commands = pytest {posargs}
//! ```
//!
//! - `key = value` and `key: value`, first delimiter wins
//! - keys are lowercased, values trimmed
//! - deeper-indented lines continue the previous value
//! - `#` and `;` start full-line comments
//! - `[DEFAULT]` entries fall back into every other section
//!
//! Parsing produces an [`IniDocument`] of [`RawSection`]s; nothing is
//! interpreted beyond that.

pub mod document;
pub mod error;
pub mod parser;

pub use document::{DEFAULT_SECTION, IniDocument, RawEntry, RawSection};
pub use error::{Error, Result};
pub use parser::parse;
