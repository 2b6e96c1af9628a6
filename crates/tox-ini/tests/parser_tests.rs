//! Integration tests for INI parsing.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tox_ini::{Error, IniDocument, parse};

/// Render a document in a stable, compact form for snapshots.
fn render(doc: &IniDocument) -> String {
    let mut out = String::new();
    for section in doc.sections() {
        out.push_str(&format!("[{}] @{}\n", section.name(), section.line()));
        for entry in section.entries() {
            out.push_str(&format!("  {} = {:?} @{}\n", entry.key, entry.value, entry.line));
        }
    }
    out
}

#[test]
fn test_minimal_tox_ini() {
    let doc = parse("[tox]\nenvlist = py39\n").unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get("tox", "envlist"), Some("py39"));
}

#[test]
fn test_full_document_layout() {
    let source = r#"
# top comment
[tox]
envlist = py39, py310
skip_missing_interpreters = true

[testenv]
deps =
    pytest
    coverage
commands =
    pytest {posargs}

    coverage report
setenv =
    PYTHONPATH = {toxinidir}

[testenv:lint]
; linters only
deps = ruff
commands = ruff check src
"#;

    let doc = parse(source).unwrap();
    insta::assert_snapshot!(render(&doc), @r###"
    [tox] @3
      envlist = "py39, py310" @4
      skip_missing_interpreters = "true" @5
    [testenv] @7
      deps = "\npytest\ncoverage" @8
      commands = "\npytest {posargs}\n\ncoverage report" @11
      setenv = "\nPYTHONPATH = {toxinidir}" @15
    [testenv:lint] @18
      deps = "ruff" @20
      commands = "ruff check src" @21
    "###);
}

#[test]
fn test_keys_are_lowercased() {
    let doc = parse("[testenv]\nBasePython = python3.11\n").unwrap();
    let section = doc.section("testenv").unwrap();
    assert_eq!(section.entries()[0].key, "basepython");
    assert_eq!(section.get("BASEPYTHON"), Some("python3.11"));
}

#[test]
fn test_section_names_keep_case() {
    let doc = parse("[TestEnv]\na = 1\n").unwrap();
    assert!(doc.has_section("TestEnv"));
    assert!(!doc.has_section("testenv"));
}

#[test]
fn test_header_whitespace_and_trailing_text() {
    let doc = parse("[ tox ] ; core settings\na = 1\n").unwrap();
    assert_eq!(doc.get("tox", "a"), Some("1"));
}

#[test]
fn test_empty_value() {
    let doc = parse("[testenv]\ndeps =\n").unwrap();
    assert_eq!(doc.get("testenv", "deps"), Some(""));
}

#[test]
fn test_trailing_blank_lines_dropped() {
    let doc = parse("[testenv]\ndeps =\n    pytest\n\n\n[other]\nx = 1\n").unwrap();
    assert_eq!(doc.get("testenv", "deps"), Some("\npytest"));
    assert_eq!(doc.get("other", "x"), Some("1"));
}

#[test]
fn test_comment_inside_value_is_skipped() {
    let doc = parse("[testenv]\ndeps =\n    pytest\n# coverage\n    mock\n").unwrap();
    assert_eq!(doc.get("testenv", "deps"), Some("\npytest\nmock"));
}

#[test]
fn test_no_inline_comments() {
    let doc = parse("[testenv]\ncommands = echo hi ; not a comment\n").unwrap();
    assert_eq!(doc.get("testenv", "commands"), Some("echo hi ; not a comment"));
}

#[test]
fn test_indented_option_after_header_is_an_option() {
    let doc = parse("[testenv]\n  deps = pytest\n  commands = pytest\n").unwrap();
    assert_eq!(doc.get("testenv", "deps"), Some("pytest"));
    assert_eq!(doc.get("testenv", "commands"), Some("pytest"));
}

#[test]
fn test_indented_bracket_line_continues_value() {
    let doc = parse("[testenv]\ndeps =\n    [extra]\n").unwrap();
    assert_eq!(doc.get("testenv", "deps"), Some("\n[extra]"));
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_crlf_line_endings() {
    let doc = parse("[tox]\r\nenvlist = py39\r\n").unwrap();
    assert_eq!(doc.get("tox", "envlist"), Some("py39"));
}

#[test]
fn test_default_section_falls_back() {
    let source = "[DEFAULT]\nshared = base\nother = x\n\n[testenv]\nother = y\n";
    let doc = parse(source).unwrap();

    assert!(!doc.has_section("DEFAULT"));
    assert_eq!(doc.defaults().unwrap().get("shared"), Some("base"));

    let section = doc.section("testenv").unwrap();
    let keys: Vec<&str> = section.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["other", "shared"]);
    assert_eq!(section.get("other"), Some("y"));
    assert_eq!(section.get("shared"), Some("base"));
}

#[test]
fn test_default_after_sections_still_applies() {
    let doc = parse("[tox]\na = 1\n[DEFAULT]\nb = 2\n").unwrap();
    assert_eq!(doc.get("tox", "b"), Some("2"));
}

#[rstest]
#[case::unterminated_header("[tox\nenvlist = py39\n", 1)]
#[case::unterminated_later("[tox]\na = 1\n[testenv:lint\n", 3)]
#[case::empty_section_name("[]\n", 1)]
#[case::option_before_section("envlist = py39\n", 1)]
#[case::missing_delimiter("[tox]\njust some words\n", 2)]
#[case::empty_option_name("[tox]\n= value\n", 2)]
#[case::duplicate_section("[tox]\n[testenv]\n[tox]\n", 3)]
#[case::duplicate_option("[tox]\na = 1\nA = 2\n", 3)]
fn test_syntax_errors(#[case] source: &str, #[case] line: usize) {
    let err = parse(source).unwrap_err();
    assert_eq!(err.line(), line, "unexpected error: {err}");
}

#[test]
fn test_error_messages() {
    let err = parse("[tox\n").unwrap_err();
    assert_eq!(
        err,
        Error::UnterminatedSectionHeader {
            line: 1,
            text: "[tox".to_string()
        }
    );
    assert_eq!(err.to_string(), "line 1: unterminated section header: [tox");

    let err = parse("[tox]\n[tox]\n").unwrap_err();
    assert_eq!(err.to_string(), "line 2: section [tox] already defined on line 1");
}

#[test]
fn test_parse_is_deterministic() {
    let source = "[tox]\nenvlist = py39\n[testenv]\ndeps =\n    pytest\n";
    assert_eq!(parse(source).unwrap(), parse(source).unwrap());
}
