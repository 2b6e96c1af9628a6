//! Environment list expansion and factor conditions
//!
//! Environment names are made of `-` separated factors. A name can be
//! written generatively (`py{38,39}-django{41,42}`) and settings can be
//! restricted to some factors (`django41: Django>=4.1,<4.2`).

use std::sync::LazyLock;

use regex::Regex;

static RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)$").expect("Invalid range regex"));

static FACTOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\w{}.!,\-]+):\s+(.*)$").expect("Invalid factor line regex")
});

enum Segment<'a> {
    Literal(&'a str),
    Choice(Vec<String>),
}

fn segments(name: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = name;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        segments.push(Segment::Choice(alternatives(&rest[open + 1..close])));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

fn alternatives(group: &str) -> Vec<String> {
    let mut expanded = Vec::new();
    for alternative in group.split(',').map(str::trim) {
        match numeric_range(alternative) {
            Some(range) => expanded.extend(range),
            None => expanded.push(alternative.to_string()),
        }
    }
    expanded
}

/// Widest numeric range `{a-b}` that is expanded.
pub const MAX_RANGE_WIDTH: u64 = 1024;

/// A wider range stays a literal alternative.
fn numeric_range(alternative: &str) -> Option<Vec<String>> {
    let captures = RANGE.captures(alternative)?;
    let start: u64 = captures[1].parse().ok()?;
    let end: u64 = captures[2].parse().ok()?;
    if start > end {
        return None;
    }
    if end - start >= MAX_RANGE_WIDTH {
        tracing::warn!(range = alternative, max = MAX_RANGE_WIDTH, "Range too wide, not expanded");
        return None;
    }
    Some((start..=end).map(|n| n.to_string()).collect())
}

/// Expand a generative environment name.
///
/// Every `{a,b}` group multiplies the result, left to right; `{8-10}` is an
/// inclusive numeric range. Names without braces come back unchanged.
pub fn expand(name: &str) -> Vec<String> {
    let mut names = vec![String::new()];
    for segment in segments(name) {
        names = match segment {
            Segment::Literal(text) => names.into_iter().map(|prefix| prefix + text).collect(),
            Segment::Choice(options) => names
                .iter()
                .flat_map(|prefix| options.iter().map(move |option| format!("{prefix}{option}")))
                .collect(),
        };
    }
    names
}

/// Split `value` on `delimiters` that are not inside braces.
fn split_top_level<'a>(value: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in value.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && delimiters.contains(&c) => {
                parts.push(&value[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// Split a comma or newline separated value into trimmed, non-empty
/// entries. Commas inside braces do not split.
pub fn split_list(value: &str) -> Vec<&str> {
    split_top_level(value, &[',', '\n'])
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Parse an `env_list` value into environment names.
///
/// Entries are separated by commas or newlines, expanded generatively and
/// deduplicated keeping the first occurrence.
pub fn parse_env_list(value: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for entry in split_list(value) {
        for name in expand(entry) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// The factors of an environment name.
pub fn factors(env_name: &str) -> Vec<&str> {
    env_name.split('-').collect()
}

/// Whether a factor condition such as `py39,!lint-cov` holds for `env_name`.
///
/// Comma separated alternatives are or-ed; the `-` separated factors of one
/// alternative are and-ed; a `!` prefix negates a factor.
pub fn matches_condition(condition: &str, env_name: &str) -> bool {
    let present = factors(env_name);
    split_top_level(condition, &[','])
        .into_iter()
        .map(str::trim)
        .filter(|alternative| !alternative.is_empty())
        .flat_map(expand)
        .any(|alternative| {
            alternative.split('-').all(|factor| match factor.strip_prefix('!') {
                Some(negated) => !present.contains(&negated),
                None => present.contains(&factor),
            })
        })
}

/// Drop the lines of `value` whose factor condition does not hold for
/// `env_name`, and strip the condition from the lines that remain.
pub fn filter_conditional(value: &str, env_name: &str) -> String {
    value
        .split('\n')
        .filter_map(|line| match FACTOR_LINE.captures(line) {
            Some(captures) => matches_condition(&captures[1], env_name)
                .then(|| captures[2].trim_end().to_string()),
            None => Some(line.to_string()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("py39", &["py39"])]
    #[case("py{38,39}", &["py38", "py39"])]
    #[case("py{38,39}-django{41,42}", &["py38-django41", "py38-django42", "py39-django41", "py39-django42"])]
    #[case("py3{8-10}", &["py38", "py39", "py310"])]
    #[case("py{,-cov}", &["py", "py-cov"])]
    #[case("broken{a,b", &["broken{a,b"])]
    fn test_expand(#[case] name: &str, #[case] expected: &[&str]) {
        assert_eq!(expand(name), expected);
    }

    #[test]
    fn test_wide_range_is_not_expanded() {
        assert_eq!(expand("py{0-4000000000}"), vec!["py0-4000000000"]);
        assert_eq!(expand("py{1-1024}").len(), 1024);
        assert_eq!(expand("py{0-1024}"), vec!["py0-1024"]);
    }

    #[test]
    fn test_parse_env_list_keeps_braces_together() {
        assert_eq!(
            parse_env_list("py{38,39}, lint\n  docs,lint"),
            vec!["py38", "py39", "lint", "docs"]
        );
    }

    #[rstest]
    #[case("py39", "py39-lint", true)]
    #[case("py38", "py39-lint", false)]
    #[case("py38,lint", "py39-lint", true)]
    #[case("py39-lint", "py39-lint", true)]
    #[case("py39-cov", "py39-lint", false)]
    #[case("!lint", "py39-lint", false)]
    #[case("!lint", "py39", true)]
    #[case("py{38,39}", "py39", true)]
    fn test_matches_condition(#[case] condition: &str, #[case] env: &str, #[case] expected: bool) {
        assert_eq!(matches_condition(condition, env), expected);
    }

    #[test]
    fn test_filter_conditional() {
        let value = "pytest\ndjango41: Django>=4.1,<4.2\ndjango42: Django>=4.2\nhttps://example.com/pkg.tar.gz";
        assert_eq!(
            filter_conditional(value, "py39-django42"),
            "pytest\nDjango>=4.2\nhttps://example.com/pkg.tar.gz"
        );
    }
}
