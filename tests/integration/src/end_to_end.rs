//! Discovery, reading and substitution together

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tox_config::{ConfigFinder, Substitutor, Value};

fn strings(value: Option<&Value>) -> Vec<&str> {
    value.and_then(Value::string_list).unwrap_or_default()
}

#[test]
fn test_nested_start_read_and_substitute() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tox.ini"),
        r#"
[tox]
envlist = unit, lint

[base]
deps =
    pytest
    pytest-mock

[testenv]
deps =
    {[base]deps}
    coverage
commands = pytest {posargs:tests/{envname}} --junitxml={env:REPORTS:reports}{/}{envname}.xml

[testenv:lint]
deps = ruff
commands = ruff check {[tox]src_dirs}
"#,
    )
    .unwrap();
    let nested = temp.path().join("src").join("pkg");
    fs::create_dir_all(&nested).unwrap();

    let found = ConfigFinder::new()
        .start(nested.as_path())
        .stop_at(temp.path())
        .find()
        .unwrap();
    let config = found.read().unwrap();
    assert_eq!(config.env_names().collect::<Vec<_>>(), vec!["unit", "lint"]);

    let substitutor = Substitutor::new()
        .environ([("REPORTS", "out")])
        .tty(false);
    let resolved = config.substitute(&substitutor);

    let unit = resolved.env("unit").unwrap();
    assert_eq!(strings(unit.get("deps")), vec!["pytest", "pytest-mock", "coverage"]);
    let sep = std::path::MAIN_SEPARATOR;
    assert_eq!(
        strings(unit.get("commands")),
        vec![format!("pytest tests/unit --junitxml=out{sep}unit.xml").as_str()]
    );

    // unresolvable references survive untouched
    let lint = resolved.env("lint").unwrap();
    assert_eq!(strings(lint.get("commands")), vec!["ruff check {[tox]src_dirs}"]);

    let with_posargs = config.substitute(&substitutor.clone().posargs(["-k", "smoke"]));
    assert_eq!(
        strings(with_posargs.env("unit").unwrap().get("commands")),
        vec![format!("pytest -k smoke --junitxml=out{sep}unit.xml").as_str()]
    );
}

#[test]
fn test_json_output_of_resolved_toml() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tox.toml"),
        r#"env_list = ["py"]

[env_run_base]
commands = [["pytest", { replace = "posargs", default = ["tests"], extend = true }]]
set_env = { HOME_COPY = "{env:HOME}" }
"#,
    )
    .unwrap();

    let config = tox_config::read_config(Some(temp.path())).unwrap();
    let resolved = config.substitute(&Substitutor::new().environ([("HOME", "/home/ci")]));

    assert_eq!(
        serde_json::to_value(resolved.env("py").unwrap()).unwrap(),
        serde_json::json!({
            "commands": [["pytest", "tests"]],
            "set_env": {"HOME_COPY": "/home/ci"},
        })
    );
}
