//! Setting names and their value shapes
//!
//! tox 4 renamed many legacy INI keys. Both spellings are accepted on input;
//! the normalized model only ever uses the new one.

/// Legacy key spellings and the names they normalize to.
pub const KEY_ALIASES: &[(&str, &str)] = &[
    ("envlist", "env_list"),
    ("basepython", "base_python"),
    ("setenv", "set_env"),
    ("passenv", "pass_env"),
    ("changedir", "change_dir"),
    ("envdir", "env_dir"),
    ("envtmpdir", "env_tmp_dir"),
    ("envlogdir", "env_log_dir"),
    ("sitepackages", "system_site_packages"),
    ("alwayscopy", "always_copy"),
    ("usedevelop", "use_develop"),
    ("whitelist_externals", "allowlist_externals"),
    ("minversion", "min_version"),
    ("skipsdist", "no_package"),
    ("toxworkdir", "work_dir"),
    ("isolated_build_env", "package_env"),
];

/// The tox 4 name for `key`.
pub fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, modern)| *modern)
        .unwrap_or(key)
}

/// How the raw INI text of a setting is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Entries split on commas and newlines
    CommaList,
    /// One entry per line
    LineList,
    /// `KEY=VALUE` lines
    Mapping,
    /// A string, or a list when the value spans several lines
    Plain,
}

/// The value shape of a (canonical) setting name.
pub fn value_kind(key: &str) -> ValueKind {
    match key {
        "env_list" | "pass_env" | "depends" | "extras" | "labels" => ValueKind::CommaList,
        "deps" | "commands" | "commands_pre" | "commands_post" | "allowlist_externals"
        | "requires" => ValueKind::LineList,
        "set_env" => ValueKind::Mapping,
        _ => ValueKind::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("envlist", "env_list")]
    #[case("setenv", "set_env")]
    #[case("skipsdist", "no_package")]
    #[case("deps", "deps")]
    #[case("env_list", "env_list")]
    fn test_canonical_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(canonical_key(key), expected);
    }

    #[test]
    fn test_aliases_are_unique() {
        for (i, (legacy, _)) in KEY_ALIASES.iter().enumerate() {
            assert!(
                KEY_ALIASES[i + 1..].iter().all(|(other, _)| other != legacy),
                "{legacy} listed twice"
            );
        }
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(value_kind("env_list"), ValueKind::CommaList);
        assert_eq!(value_kind("commands"), ValueKind::LineList);
        assert_eq!(value_kind("set_env"), ValueKind::Mapping);
        assert_eq!(value_kind("description"), ValueKind::Plain);
    }
}
