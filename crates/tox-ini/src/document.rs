//! Parsed INI document model

use crate::{Result, parser};

/// Name of the section whose entries fall back into every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// One `key = value` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Lowercased option name.
    pub key: String,
    /// Raw value; continuation lines are joined with `\n`.
    pub value: String,
    /// 1-based line of the option name.
    pub line: usize,
}

/// Option name to raw string value, scoped to one section.
///
/// Entries keep their file order. Keys are unique within a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    name: String,
    line: usize,
    entries: Vec<RawEntry>,
}

impl RawSection {
    /// Create an empty section declared on `line`.
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            entries: Vec::new(),
        }
    }

    /// The section name as written between the brackets, trimmed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based line of the section header.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Look up a raw value. The key is matched case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|entry| entry.value.as_str())
    }

    /// Look up an entry. The key is matched case-insensitively.
    pub fn entry(&self, key: &str) -> Option<&RawEntry> {
        let key = key.to_lowercase();
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[RawEntry] {
        &self.entries
    }

    /// `(key, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: RawEntry) {
        self.entries.push(entry);
    }

    /// Drop trailing blank lines and whitespace from every value.
    pub(crate) fn trim_values(&mut self) {
        for entry in &mut self.entries {
            let trimmed = entry.value.trim_end().len();
            entry.value.truncate(trimmed);
        }
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut RawEntry> {
        self.entries.last_mut()
    }

    /// Append `defaults` entries this section does not define itself.
    pub(crate) fn inherit(&mut self, defaults: &RawSection) {
        for entry in &defaults.entries {
            if !self.entries.iter().any(|own| own.key == entry.key) {
                self.entries.push(entry.clone());
            }
        }
    }
}

/// A parsed INI file.
///
/// Every section returned already includes the `[DEFAULT]` fallbacks, the
/// way `configparser` presents them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IniDocument {
    defaults: Option<RawSection>,
    sections: Vec<RawSection>,
}

impl IniDocument {
    /// Parse INI source text.
    pub fn parse(source: &str) -> Result<Self> {
        parser::parse(source)
    }

    pub(crate) fn from_parts(defaults: Option<RawSection>, mut sections: Vec<RawSection>) -> Self {
        if let Some(defaults) = &defaults {
            for section in &mut sections {
                section.inherit(defaults);
            }
        }
        Self { defaults, sections }
    }

    /// Sections in file order, `[DEFAULT]` excluded.
    pub fn sections(&self) -> impl Iterator<Item = &RawSection> {
        self.sections.iter()
    }

    /// Section names in file order, `[DEFAULT]` excluded.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(RawSection::name)
    }

    /// Look up a section by exact name.
    pub fn section(&self, name: &str) -> Option<&RawSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// The `[DEFAULT]` section, if the file declares one.
    pub fn defaults(&self) -> Option<&RawSection> {
        self.defaults.as_ref()
    }

    /// Look up a raw value in a section.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|section| section.get(key))
    }

    /// Number of sections, `[DEFAULT]` excluded.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
