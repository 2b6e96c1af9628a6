//! Turning parsed INI or TOML documents into a [`Config`]

use std::collections::HashSet;
use std::fmt;

use tox_ini::{IniDocument, RawEntry, RawSection};

use crate::config::Config;
use crate::envlist::{expand, filter_conditional, parse_env_list, split_list};
use crate::schema::{ValueKind, canonical_key, value_kind};
use crate::settings::Settings;
use crate::value::Value;

const RUN_BASE: &str = "testenv";
const PKG_BASE: &str = "pkgenv";
const ENV_PREFIX: &str = "testenv:";

/// Content that parses but cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invalid {
    pub line: Option<usize>,
    pub message: String,
}

impl Invalid {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ============================================================================
// INI
// ============================================================================

/// Normalize an INI document whose core settings live in `core_section`.
pub(crate) fn from_ini(document: &IniDocument, core_section: &str) -> Result<Config, Invalid> {
    let core = match document.section(core_section) {
        Some(section) => normalize_section(section)?,
        None => Settings::new(),
    };
    let env_run_base = match document.section(RUN_BASE) {
        Some(section) => normalize_section(section)?,
        None => Settings::new(),
    };
    let env_pkg_base = match document.section(PKG_BASE) {
        Some(section) => normalize_section(section)?,
        None => Settings::new(),
    };

    let mut config = Config::new()
        .with_env_run_base(env_run_base)
        .with_env_pkg_base(env_pkg_base);

    for section in document.sections() {
        let name = section.name();
        if name == core_section || name == RUN_BASE || name == PKG_BASE || name.starts_with(ENV_PREFIX) {
            continue;
        }
        config = config.with_section(name, normalize_section(section)?);
    }

    let env_sections = env_sections(document)?;
    let mut names: Vec<String> = core
        .get("env_list")
        .and_then(Value::string_list)
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect();
    for (name, _) in &env_sections {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    for name in names {
        let own = env_sections
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, section)| *section);
        let settings = effective_settings(document, own, &name)?;
        config = config.with_env(name, settings);
    }

    tracing::debug!(
        envs = config.env_names().count(),
        sections = config.sections().count(),
        "Normalized INI configuration"
    );
    Ok(config.with_core(core))
}

/// Map every environment name to the `[testenv:...]` section defining it.
///
/// Section names are expanded generatively, so one section can define
/// several environments.
fn env_sections(document: &IniDocument) -> Result<Vec<(String, &RawSection)>, Invalid> {
    let mut mapping: Vec<(String, &RawSection)> = Vec::new();
    for section in document.sections() {
        let Some(pattern) = section.name().strip_prefix(ENV_PREFIX) else {
            continue;
        };
        for name in expand(pattern.trim()) {
            if let Some((_, first)) = mapping.iter().find(|(existing, _)| *existing == name) {
                return Err(Invalid::at(
                    section.line(),
                    format!(
                        "environment '{name}' is defined by both [{}] and [{}]",
                        first.name(),
                        section.name()
                    ),
                ));
            }
            mapping.push((name, section));
        }
    }
    Ok(mapping)
}

/// The sections an environment inherits from, closest first.
///
/// A `[testenv:...]` section inherits from the sections named by its `base`
/// option, `[testenv]` when it has none. Other sections only chain further
/// when they set `base` themselves.
fn inheritance_chain<'a>(document: &'a IniDocument, own: Option<&'a RawSection>) -> Vec<&'a RawSection> {
    fn visit<'a>(
        document: &'a IniDocument,
        section: &'a RawSection,
        visited: &mut HashSet<&'a str>,
        chain: &mut Vec<&'a RawSection>,
    ) {
        if !visited.insert(section.name()) {
            return;
        }
        chain.push(section);

        let bases: Vec<&str> = match section.get("base") {
            Some(value) => value
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|name| !name.is_empty())
                .collect(),
            None if section.name().starts_with(ENV_PREFIX) => vec![RUN_BASE],
            None => Vec::new(),
        };
        for base in bases {
            let found = document
                .section(base)
                .or_else(|| document.section(&format!("{ENV_PREFIX}{base}")));
            match found {
                Some(base_section) => visit(document, base_section, visited, chain),
                None => tracing::debug!(section = section.name(), base, "Unknown base section"),
            }
        }
    }

    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    if let Some(start) = own.or_else(|| document.section(RUN_BASE)) {
        visit(document, start, &mut visited, &mut chain);
    }
    chain
}

/// Settings of environment `name`, inherited key by key and filtered by
/// factor conditions.
fn effective_settings(
    document: &IniDocument,
    own: Option<&RawSection>,
    name: &str,
) -> Result<Settings, Invalid> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut settings = Settings::new();
    for section in inheritance_chain(document, own) {
        for (key, entry) in canonical_entries(section)? {
            if seen.insert(key) {
                let raw = filter_conditional(&entry.value, name);
                settings.insert(key, typed_value(key, &raw));
            }
        }
    }
    Ok(settings)
}

fn normalize_section(section: &RawSection) -> Result<Settings, Invalid> {
    let mut settings = Settings::new();
    for (key, entry) in canonical_entries(section)? {
        settings.insert(key, typed_value(key, &entry.value));
    }
    Ok(settings)
}

/// The entries of a section under their tox 4 names.
fn canonical_entries(section: &RawSection) -> Result<Vec<(&str, &RawEntry)>, Invalid> {
    let mut entries: Vec<(&str, &RawEntry)> = Vec::with_capacity(section.len());
    for entry in section.entries() {
        let key = canonical_key(&entry.key);
        if let Some((_, first)) = entries.iter().find(|(existing, _)| *existing == key) {
            return Err(Invalid::at(
                entry.line,
                format!(
                    "[{}] sets both '{}' and '{}'",
                    section.name(),
                    first.key,
                    entry.key
                ),
            ));
        }
        entries.push((key, entry));
    }
    Ok(entries)
}

fn lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Convert raw INI text to a value according to the key's shape.
fn typed_value(key: &str, raw: &str) -> Value {
    match value_kind(key) {
        ValueKind::CommaList if key == "env_list" => Value::from(parse_env_list(raw)),
        ValueKind::CommaList => Value::from(split_list(raw)),
        ValueKind::LineList => Value::from(lines(raw).collect::<Vec<_>>()),
        ValueKind::Mapping => Value::Table(mapping(key, raw)),
        ValueKind::Plain => {
            let mut items: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
            match items.len() {
                0 => Value::from(""),
                1 => Value::from(items.remove(0)),
                _ => Value::from(items),
            }
        }
    }
}

fn mapping(key: &str, raw: &str) -> Settings {
    let mut table = Settings::new();
    for line in lines(raw) {
        match line.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                table.insert(name.trim(), value.trim());
            }
            _ => tracing::warn!(key, line, "Ignoring line without NAME=VALUE"),
        }
    }
    table
}

// ============================================================================
// TOML
// ============================================================================

fn into_settings(value: toml::Value, what: &str) -> Result<Settings, Invalid> {
    match value {
        toml::Value::Table(table) => Ok(Settings::from(table)),
        other => Err(Invalid::new(format!(
            "'{what}' must be a table, got {}",
            other.type_str()
        ))),
    }
}

/// Normalize a tox TOML table (the document root of `tox.toml`, or
/// `tool.tox` of `pyproject.toml`).
pub(crate) fn from_toml(table: toml::Table) -> Result<Config, Invalid> {
    let mut core = Settings::new();
    let mut env_run_base = Settings::new();
    let mut env_pkg_base = Settings::new();
    let mut env_tables: Vec<(String, toml::Value)> = Vec::new();

    for (key, value) in table {
        match key.as_str() {
            "env_run_base" => env_run_base = into_settings(value, "env_run_base")?,
            "env_pkg_base" => env_pkg_base = into_settings(value, "env_pkg_base")?,
            "env" => match value {
                toml::Value::Table(envs) => env_tables.extend(envs),
                other => {
                    return Err(Invalid::new(format!(
                        "'env' must be a table, got {}",
                        other.type_str()
                    )));
                }
            },
            _ => {
                core.insert(key, Value::from(value));
            }
        }
    }

    let mut names: Vec<String> = Vec::new();
    if let Some(Value::List(items)) = core.get("env_list") {
        for item in items {
            match item.as_str() {
                Some(name) if !names.iter().any(|n| n == name) => names.push(name.to_string()),
                Some(_) => {}
                None => tracing::warn!(kind = item.type_name(), "Ignoring non-string env_list entry"),
            }
        }
    }
    for (name, _) in &env_tables {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    let mut config = Config::new()
        .with_env_run_base(env_run_base.clone())
        .with_env_pkg_base(env_pkg_base);
    for name in names {
        let own = match env_tables.iter().find(|(candidate, _)| *candidate == name) {
            Some((_, value)) => into_settings(value.clone(), &format!("env.{name}"))?,
            None => Settings::new(),
        };
        config = config.with_env(name, own.with_fallback(&env_run_base));
    }

    tracing::debug!(envs = config.env_names().count(), "Normalized TOML configuration");
    Ok(config.with_core(core))
}
