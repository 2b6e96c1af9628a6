//! Resolution of `{...}` substitution tokens
//!
//! Tokens nest (`{env:A:{env:B}}`) and are resolved innermost-last by
//! repeated passes until the text stops changing. A backslash escapes a
//! brace; escapes are removed only after the last pass.
//!
//! Supported forms:
//!
//! | Token                    | Result                                        |
//! |--------------------------|-----------------------------------------------|
//! | `{:}`                    | path list separator (`:` or `;`)              |
//! | `{/}`                    | path separator                                |
//! | `{env:KEY[:DEFAULT]}`    | environment variable                          |
//! | `{posargs[:DEFAULT]}`    | positional arguments joined by spaces         |
//! | `{posargs[N]}`           | one positional argument, negative from end    |
//! | `{posargs[A:B]}`         | a slice of the positional arguments           |
//! | `{tty:ON[:OFF]}`         | depends on whether stdin is a terminal        |
//! | `{[section]key}`         | INI style reference                           |
//! | `{env.lint.deps}`        | dotted path into the normalized layout        |
//! | `{name}`                 | core setting or variable                      |
//!
//! Anything unresolvable is left exactly as written.

use std::collections::HashMap;
use std::io::IsTerminal;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;
use crate::settings::Settings;
use crate::value::Value;

const MAX_PASSES: usize = 10;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: &str = ":";

static ESCAPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([{}\[\]:])").expect("Invalid escape regex"));

/// Resolves substitution tokens against a [`Config`].
///
/// ```
/// use tox_config::{Config, Substitutor};
///
/// let substitutor = Substitutor::new()
///     .posargs(["-k", "slow"])
///     .environ([("HOME", "/home/ci")]);
/// let text = substitutor.substitute_str("pytest {posargs} --basetemp={env:HOME}/tmp", &Config::new());
/// assert_eq!(text, "pytest -k slow --basetemp=/home/ci/tmp");
/// ```
#[derive(Debug, Clone)]
pub struct Substitutor {
    posargs: Vec<String>,
    environ: HashMap<String, String>,
    tty: bool,
    vars: HashMap<String, String>,
}

impl Default for Substitutor {
    /// Positional arguments empty, environment and terminal state taken
    /// from the running process.
    fn default() -> Self {
        Self {
            posargs: Vec::new(),
            environ: std::env::vars().collect(),
            tty: std::io::stdin().is_terminal(),
            vars: HashMap::new(),
        }
    }
}

impl Substitutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments for `{posargs}`.
    pub fn posargs<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.posargs = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the environment used by `{env:...}`.
    pub fn environ<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environ = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Set a single environment variable.
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environ.insert(key.into(), value.into());
        self
    }

    pub fn tty(mut self, interactive: bool) -> Self {
        self.tty = interactive;
        self
    }

    /// Define a `{name}` variable. Variables win over core settings.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Resolve every token in `value`.
    pub fn substitute_str(&self, value: &str, config: &Config) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_PASSES {
            let tokens = find_tokens(&current);
            if tokens.is_empty() {
                break;
            }
            let mut next = current.clone();
            for token in tokens.iter().rev() {
                let replacement = self.resolve_token(&token.expression, config);
                next.replace_range(token.start..token.end, &replacement);
            }
            if next == current {
                break;
            }
            current = next;
        }
        ESCAPED.replace_all(&current, "$1").into_owned()
    }

    /// Resolve tokens inside a structured value.
    ///
    /// Strings are resolved in place; lists and tables recurse. Inside a list
    /// an inline substitution table (`{ replace = "posargs" }` and friends)
    /// or a lone `{[section]key}` reference to a list is spliced into the
    /// surrounding list.
    pub fn substitute_value(&self, value: &Value, config: &Config) -> Value {
        match value {
            Value::String(s) => Value::String(self.substitute_str(s, config)),
            Value::List(items) => Value::List(self.substitute_list(items, config)),
            Value::Table(table) => match self.resolve_inline(table, config) {
                Some(resolved) => self.substitute_value(&resolved.value, config),
                None => Value::Table(table.map_values(|v| self.substitute_value(v, config))),
            },
            other => other.clone(),
        }
    }

    fn substitute_list(&self, items: &[Value], config: &Config) -> Vec<Value> {
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Table(table) => match self.resolve_inline(table, config) {
                    Some(Inline {
                        value: Value::List(spliced),
                        extend: true,
                    }) => result.extend(spliced.iter().map(|v| self.substitute_value(v, config))),
                    Some(resolved) => result.push(self.substitute_value(&resolved.value, config)),
                    None => result.push(self.substitute_value(item, config)),
                },
                Value::String(s) => match whole_ini_reference(s, config) {
                    Some(Value::List(spliced)) => {
                        result.extend(spliced.iter().map(|v| self.substitute_value(v, config)))
                    }
                    _ => result.push(self.substitute_value(item, config)),
                },
                _ => result.push(self.substitute_value(item, config)),
            }
        }
        result
    }

    fn resolve_inline(&self, table: &Settings, config: &Config) -> Option<Inline> {
        let kind = table.get_str("replace")?;
        let default = table.get("default").cloned();
        let extend = table.get("extend").and_then(Value::as_bool).unwrap_or(false);

        let resolved = match kind {
            "posargs" => {
                if !self.posargs.is_empty() {
                    let wants_list = extend || matches!(default, Some(Value::List(_)));
                    let value = if wants_list {
                        Value::from(self.posargs.clone())
                    } else {
                        Value::String(self.posargs.join(" "))
                    };
                    Inline { value, extend }
                } else if let Some(default) = default {
                    Inline { value: default, extend }
                } else if extend {
                    Inline { value: Value::List(Vec::new()), extend }
                } else {
                    Inline { value: Value::from(""), extend }
                }
            }
            "env" => {
                let name = table.get_str("name").unwrap_or_default();
                let value = match self.environ.get(name) {
                    Some(found) => Value::String(found.clone()),
                    None => default.unwrap_or_else(|| Value::from("")),
                };
                Inline { value, extend }
            }
            "ref" => self.resolve_ref(table, config, default, extend),
            other => {
                tracing::debug!(replace = other, "Unknown inline substitution");
                return None;
            }
        };
        Some(resolved)
    }

    fn resolve_ref(
        &self,
        table: &Settings,
        config: &Config,
        default: Option<Value>,
        extend: bool,
    ) -> Inline {
        let path: Option<Vec<&str>> = match (table.get("of"), table.get_str("env"), table.get_str("key")) {
            (Some(Value::List(of)), _, _) if !of.is_empty() => of.iter().map(Value::as_str).collect(),
            (_, Some(env), Some(key)) => Some(vec!["env", env, key]),
            _ => None,
        };

        match path.and_then(|path| config.lookup(&path)) {
            Some(found) => {
                let extend = extend || matches!(found, Value::List(_));
                Inline { value: found, extend }
            }
            None => match default {
                Some(default) => {
                    let extend = extend || matches!(default, Value::List(_));
                    Inline { value: default, extend }
                }
                None => Inline { value: Value::from(""), extend },
            },
        }
    }

    fn resolve_token(&self, expression: &str, config: &Config) -> String {
        let unresolved = || format!("{{{expression}}}");

        match expression {
            ":" => return PATH_LIST_SEPARATOR.to_string(),
            "/" => return std::path::MAIN_SEPARATOR_STR.to_string(),
            _ => {}
        }

        if expression.starts_with('[') {
            return ini_reference(expression, config)
                .and_then(as_text)
                .unwrap_or_else(unresolved);
        }

        let parts = split_expression(expression);
        let (kind, args) = match parts.split_first() {
            Some((kind, args)) => (kind.as_str(), args),
            None => return unresolved(),
        };

        match kind {
            "env" => {
                let Some(key) = args.first() else {
                    return unresolved();
                };
                if let Some(value) = self.environ.get(key) {
                    return value.clone();
                }
                if args.len() > 1 {
                    return self.substitute_str(&args[1..].join(":"), config);
                }
                return String::new();
            }
            "posargs" => {
                if !self.posargs.is_empty() {
                    return self.posargs.join(" ");
                }
                if !args.is_empty() {
                    return self.substitute_str(&args.join(":"), config);
                }
                return String::new();
            }
            "tty" => {
                let chosen = if self.tty { args.first() } else { args.get(1) };
                return chosen.cloned().unwrap_or_default();
            }
            _ => {}
        }

        if let Some(index) = kind
            .strip_prefix("posargs[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return self.indexed_posargs(index).unwrap_or_else(unresolved);
        }

        if let Some(value) = self.vars.get(expression) {
            return value.clone();
        }

        if expression.contains('.') {
            let path: Vec<&str> = expression.split('.').collect();
            if let Some(Value::String(found)) = config.lookup(&path) {
                return found;
            }
        }

        if let Some(found) = config.core().get_str(kind) {
            return found.to_string();
        }

        unresolved()
    }

    /// `posargs[N]` or `posargs[A:B]`, with Python indexing rules.
    fn indexed_posargs(&self, index: &str) -> Option<String> {
        let len = self.posargs.len() as i64;

        if let Some((start, end)) = index.split_once(':') {
            let start = parse_bound(start)?.map_or(0, |i| clamp_index(i, len));
            let end = parse_bound(end)?.map_or(len, |i| clamp_index(i, len));
            if start >= end {
                return Some(String::new());
            }
            return Some(self.posargs[start as usize..end as usize].join(" "));
        }

        let index: i64 = index.trim().parse().ok()?;
        let position = if index < 0 { index + len } else { index };
        Some(if (0..len).contains(&position) {
            self.posargs[position as usize].clone()
        } else {
            String::new()
        })
    }
}

struct Inline {
    value: Value,
    extend: bool,
}

/// An empty bound is `None`; anything else must be an integer.
fn parse_bound(bound: &str) -> Option<Option<i64>> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Some(None);
    }
    bound.parse().ok().map(Some)
}

fn clamp_index(index: i64, len: i64) -> i64 {
    if index < 0 {
        (index + len).max(0)
    } else {
        index.min(len)
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::List(_) => value.string_list().map(|items| items.join("\n")),
        _ => None,
    }
}

/// Parse `[section]key` and look it up.
fn ini_reference<'a>(expression: &str, config: &'a Config) -> Option<&'a Value> {
    let (section, key) = expression.strip_prefix('[')?.split_once(']')?;
    if section.trim().is_empty() || key.trim().is_empty() {
        return None;
    }
    config.ini_reference(section, key)
}

/// The referenced value when `item` is nothing but one `{[section]key}`.
fn whole_ini_reference<'a>(item: &str, config: &'a Config) -> Option<&'a Value> {
    let item = item.trim();
    let tokens = find_tokens(item);
    match tokens.as_slice() {
        [token] if token.start == 0 && token.end == item.len() => {
            ini_reference(&token.expression, config)
        }
        _ => None,
    }
}

/// A `{...}` token: byte range including the braces, and the text inside.
#[derive(Debug, PartialEq)]
struct Token {
    start: usize,
    end: usize,
    expression: String,
}

/// Outermost tokens of `text`, left to right.
fn find_tokens(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'{' => match matching_brace(bytes, index) {
                Some(close) => {
                    tokens.push(Token {
                        start: index,
                        end: close + 1,
                        expression: text[index + 1..close].to_string(),
                    });
                    index = close + 1;
                }
                None => index += 1,
            },
            _ => index += 1,
        }
    }
    tokens
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut index = open;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => {
                index += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

/// Split an expression on `:` outside nested braces and brackets.
///
/// `\:` is a literal colon; other escapes survive so that nested tokens are
/// unescaped only once, at the end of substitution.
fn split_expression(expression: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = expression.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(':') => current.push(':'),
                Some(escaped) => {
                    current.push('\\');
                    current.push(escaped);
                }
                None => current.push('\\'),
            },
            '{' | '[' => {
                depth += 1;
                current.push(ch);
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ':' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_tokens_nested_and_escaped() {
        let tokens = find_tokens(r"a {env:X:{posargs}} \{b} {c}");
        let expressions: Vec<_> = tokens.iter().map(|t| t.expression.as_str()).collect();
        assert_eq!(expressions, vec!["env:X:{posargs}", "c"]);
    }

    #[test]
    fn test_find_tokens_unbalanced() {
        assert!(find_tokens("{unclosed").is_empty());
    }

    #[test]
    fn test_split_expression() {
        assert_eq!(split_expression("env:A:{env:B:x}"), vec!["env", "A", "{env:B:x}"]);
        assert_eq!(split_expression(r"env:A:x\:y"), vec!["env", "A", "x:y"]);
        assert_eq!(split_expression("posargs[1:3]"), vec!["posargs[1:3]"]);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-1, 3), 2);
        assert_eq!(clamp_index(-10, 3), 0);
        assert_eq!(clamp_index(10, 3), 3);
    }
}
