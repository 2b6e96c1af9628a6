//! The normalized tox configuration

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::schema::canonical_key;
use crate::settings::Settings;
use crate::substitution::Substitutor;
use crate::value::Value;

/// A fully read tox configuration.
///
/// `envs` holds the *effective* settings of each environment: inheritance
/// from `[testenv]` (or `env_run_base`) is already applied and factor
/// conditions are already evaluated for that environment's name. The base
/// tables are kept as written so that references to them still resolve.
///
/// A `Config` is built once per read and not mutated afterwards; the
/// `with_*` methods exist for assembling one by hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    core: Settings,
    env_run_base: Settings,
    env_pkg_base: Settings,
    envs: Vec<(String, Settings)>,
    sections: Vec<(String, Settings)>,
}

fn named<'a>(entries: &'a [(String, Settings)], name: &str) -> Option<&'a Settings> {
    entries
        .iter()
        .find(|(candidate, _)| candidate == name)
        .map(|(_, settings)| settings)
}

fn upsert(entries: &mut Vec<(String, Settings)>, name: String, settings: Settings) {
    match entries.iter_mut().find(|(candidate, _)| *candidate == name) {
        Some((_, slot)) => *slot = settings,
        None => entries.push((name, settings)),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core(mut self, core: Settings) -> Self {
        self.core = core;
        self
    }

    pub fn with_env_run_base(mut self, settings: Settings) -> Self {
        self.env_run_base = settings;
        self
    }

    pub fn with_env_pkg_base(mut self, settings: Settings) -> Self {
        self.env_pkg_base = settings;
        self
    }

    /// Add an environment, or replace the one with the same name.
    pub fn with_env(mut self, name: impl Into<String>, settings: Settings) -> Self {
        upsert(&mut self.envs, name.into(), settings);
        self
    }

    /// Add an unrelated INI section, or replace the one with the same name.
    pub fn with_section(mut self, name: impl Into<String>, settings: Settings) -> Self {
        upsert(&mut self.sections, name.into(), settings);
        self
    }

    /// Settings of the `[tox]` section, or the TOML root.
    pub fn core(&self) -> &Settings {
        &self.core
    }

    pub fn env_run_base(&self) -> &Settings {
        &self.env_run_base
    }

    pub fn env_pkg_base(&self) -> &Settings {
        &self.env_pkg_base
    }

    /// Effective settings of one environment.
    pub fn env(&self, name: &str) -> Option<&Settings> {
        named(&self.envs, name)
    }

    pub fn envs(&self) -> impl Iterator<Item = (&str, &Settings)> {
        self.envs.iter().map(|(name, settings)| (name.as_str(), settings))
    }

    pub fn env_names(&self) -> impl Iterator<Item = &str> {
        self.envs.iter().map(|(name, _)| name.as_str())
    }

    /// The declared `env_list`, empty when there is none.
    pub fn env_list(&self) -> Vec<&str> {
        self.core
            .get("env_list")
            .and_then(Value::string_list)
            .unwrap_or_default()
    }

    pub fn section(&self, name: &str) -> Option<&Settings> {
        named(&self.sections, name)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Settings)> {
        self.sections
            .iter()
            .map(|(name, settings)| (name.as_str(), settings))
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
            && self.env_run_base.is_empty()
            && self.env_pkg_base.is_empty()
            && self.envs.is_empty()
            && self.sections.is_empty()
    }

    /// Follow a dotted path through the normalized layout.
    ///
    /// `["env_run_base", "deps"]`, `["env", "lint", "commands"]` and
    /// `["requires"]` (a core key) are all valid paths. Tables along the way
    /// are descended into; the value found at the end is returned whatever
    /// its type.
    pub fn lookup(&self, path: &[&str]) -> Option<Value> {
        let (first, rest) = path.split_first()?;
        let (settings, rest) = match *first {
            "env_run_base" => (&self.env_run_base, rest),
            "env_pkg_base" => (&self.env_pkg_base, rest),
            "env" => {
                let (name, rest) = rest.split_first()?;
                (self.env(name)?, rest)
            }
            _ => (&self.core, path),
        };

        let Some((key, rest)) = rest.split_first() else {
            return Some(Value::Table(settings.clone()));
        };
        let mut value = settings.get(key)?;
        for segment in rest {
            value = value.as_table()?.get(segment)?;
        }
        Some(value.clone())
    }

    /// Resolve an INI style `[section]key` reference.
    ///
    /// `tox` and `tox:tox` name the core settings, `testenv` and `pkgenv` the
    /// base tables, `testenv:NAME` an environment (falling back to
    /// `[testenv]`) and anything else one of the extra sections. Legacy key
    /// spellings are accepted.
    pub fn ini_reference(&self, section: &str, key: &str) -> Option<&Value> {
        let key = key.trim().to_lowercase();
        let key = canonical_key(&key);
        let section = section.trim();

        match section {
            "tox" | "tox:tox" => self.core.get(key),
            "testenv" => self.env_run_base.get(key),
            "pkgenv" => self.env_pkg_base.get(key),
            _ => match section.strip_prefix("testenv:") {
                Some(env) => self
                    .env(env.trim())
                    .and_then(|settings| settings.get(key))
                    .or_else(|| self.env_run_base.get(key)),
                None => self.section(section)?.get(key),
            },
        }
    }

    /// A copy of this configuration with every `{...}` token resolved.
    ///
    /// Each environment is resolved with `env_name` bound to its own name.
    pub fn substitute(&self, substitutor: &Substitutor) -> Config {
        let resolve = |settings: &Settings, substitutor: &Substitutor| {
            settings.map_values(|value| substitutor.substitute_value(value, self))
        };

        let envs = self
            .envs
            .iter()
            .map(|(name, settings)| {
                let scoped = substitutor
                    .clone()
                    .var("env_name", name.as_str())
                    .var("envname", name.as_str());
                (name.clone(), resolve(settings, &scoped))
            })
            .collect();

        Config {
            core: resolve(&self.core, substitutor),
            env_run_base: resolve(&self.env_run_base, substitutor),
            env_pkg_base: resolve(&self.env_pkg_base, substitutor),
            envs,
            sections: self
                .sections
                .iter()
                .map(|(name, settings)| (name.clone(), resolve(settings, substitutor)))
                .collect(),
        }
    }
}

struct Named<'a>(&'a [(String, Settings)]);

impl Serialize for Named<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, settings) in self.0 {
            map.serialize_entry(name, settings)?;
        }
        map.end()
    }
}

/// Serializes to the tox 4 layout: core keys at the top level, then
/// `env_run_base`, `env_pkg_base`, `env` and `sections` when non-empty.
impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.core.iter() {
            map.serialize_entry(key, value)?;
        }
        if !self.env_run_base.is_empty() {
            map.serialize_entry("env_run_base", &self.env_run_base)?;
        }
        if !self.env_pkg_base.is_empty() {
            map.serialize_entry("env_pkg_base", &self.env_pkg_base)?;
        }
        if !self.envs.is_empty() {
            map.serialize_entry("env", &Named(&self.envs))?;
        }
        if !self.sections.is_empty() {
            map.serialize_entry("sections", &Named(&self.sections))?;
        }
        map.end()
    }
}
