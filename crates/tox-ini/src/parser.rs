//! Line-oriented INI parser.
//!
//! Mirrors `configparser.ConfigParser(interpolation=None)` with its default
//! options: `=`/`:` delimiters, `#`/`;` full-line comments, empty lines kept
//! inside multi-line values, strict duplicate checks.

use crate::document::{DEFAULT_SECTION, IniDocument, RawEntry, RawSection};
use crate::{Error, Result};

/// Where options are currently being collected.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Defaults,
    Section(usize),
}

/// The option whose value continuation lines extend.
#[derive(Debug, Clone, Copy)]
struct OpenOption {
    indent: usize,
}

/// Parses INI source into an [`IniDocument`].
///
/// # Example
/// ```
/// use tox_ini::parse;
///
/// let doc = parse("[tox]\nenvlist = py39\n").unwrap();
/// assert_eq!(doc.get("tox", "envlist"), Some("py39"));
/// ```
pub fn parse(source: &str) -> Result<IniDocument> {
    let mut defaults: Option<RawSection> = None;
    let mut sections: Vec<RawSection> = Vec::new();
    let mut cursor: Option<Cursor> = None;
    let mut open: Option<OpenOption> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let stripped = raw_line.trim();

        if stripped.starts_with('#') || stripped.starts_with(';') {
            continue;
        }

        if stripped.is_empty() {
            // Blank lines belong to the open value until something else shows up
            if open.is_some() {
                if let Some(entry) = current(&mut defaults, &mut sections, cursor)
                    .and_then(RawSection::last_mut)
                {
                    entry.value.push('\n');
                }
            }
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start().len();

        if let Some(option) = open {
            if indent > option.indent {
                if let Some(entry) = current(&mut defaults, &mut sections, cursor)
                    .and_then(RawSection::last_mut)
                {
                    entry.value.push('\n');
                    entry.value.push_str(stripped);
                }
                continue;
            }
        }

        if stripped.starts_with('[') {
            let name = section_name(stripped, line)?;
            open = None;

            if name == DEFAULT_SECTION {
                if defaults.is_none() {
                    defaults = Some(RawSection::new(name, line));
                }
                cursor = Some(Cursor::Defaults);
                continue;
            }

            if let Some(existing) = sections.iter().find(|section| section.name() == name) {
                return Err(Error::DuplicateSection {
                    line,
                    name: name.to_string(),
                    first: existing.line(),
                });
            }
            tracing::trace!(line, section = name, "Section header");
            sections.push(RawSection::new(name, line));
            cursor = Some(Cursor::Section(sections.len() - 1));
            continue;
        }

        let Some(section) = current(&mut defaults, &mut sections, cursor) else {
            return Err(Error::MissingSectionHeader {
                line,
                text: stripped.to_string(),
            });
        };

        let (key, value) = split_option(stripped, line)?;
        if section.contains_key(&key) {
            return Err(Error::DuplicateOption {
                line,
                section: section.name().to_string(),
                key,
            });
        }
        section.push(RawEntry { key, value, line });
        open = Some(OpenOption { indent });
    }

    if let Some(defaults) = defaults.as_mut() {
        defaults.trim_values();
    }
    for section in &mut sections {
        section.trim_values();
    }

    Ok(IniDocument::from_parts(defaults, sections))
}

fn current<'a>(
    defaults: &'a mut Option<RawSection>,
    sections: &'a mut [RawSection],
    cursor: Option<Cursor>,
) -> Option<&'a mut RawSection> {
    match cursor? {
        Cursor::Defaults => defaults.as_mut(),
        Cursor::Section(index) => sections.get_mut(index),
    }
}

/// Extract the name from a `[name]` header line.
///
/// Anything after the last `]` is ignored, as `configparser` does.
fn section_name(stripped: &str, line: usize) -> Result<&str> {
    let Some(close) = stripped.rfind(']') else {
        return Err(Error::UnterminatedSectionHeader {
            line,
            text: stripped.to_string(),
        });
    };
    let name = stripped[1..close].trim();
    if name.is_empty() {
        return Err(Error::EmptySectionName { line });
    }
    Ok(name)
}

/// Split `key = value` / `key: value` at the first delimiter.
fn split_option(stripped: &str, line: usize) -> Result<(String, String)> {
    let Some(at) = stripped.find(['=', ':']) else {
        return Err(Error::MissingDelimiter {
            line,
            text: stripped.to_string(),
        });
    };
    let key = stripped[..at].trim().to_lowercase();
    if key.is_empty() {
        return Err(Error::EmptyOptionName { line });
    }
    let value = stripped[at + 1..].trim().to_string();
    Ok((key, value))
}
