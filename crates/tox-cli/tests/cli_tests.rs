//! End-to-end tests that run the compiled `toxcfg` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/configs")
        .join(name)
}

/// A temp directory holding a copy of one fixture case.
fn fixture_dir(name: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.copy_from(fixture(name), &["*"]).unwrap();
    temp
}

fn toxcfg() -> Command {
    let mut cmd = Command::cargo_bin("toxcfg").unwrap();
    cmd.env_remove("TOXCFG_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

// ============================================================================
// General
// ============================================================================

#[test]
fn test_help_lists_commands() {
    toxcfg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("envs"));
}

#[test]
fn test_missing_subcommand_fails() {
    toxcfg().assert().failure();
}

// ============================================================================
// find
// ============================================================================

#[test]
fn test_find_prints_path_and_kind() {
    let temp = fixture_dir("tox_ini_basic");
    toxcfg()
        .arg("find")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tox.ini (tox.ini)"));
}

#[test]
fn test_find_from_nested_directory() {
    let temp = fixture_dir("tox_toml");
    let nested = temp.child("src/pkg");
    nested.create_dir_all().unwrap();

    toxcfg()
        .arg("find")
        .current_dir(nested.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("tox.toml (tox.toml)"));
}

#[test]
fn test_find_reports_legacy_pyproject() {
    let temp = fixture_dir("pyproject_legacy");
    toxcfg()
        .args(["find"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(pyproject.toml (legacy_tox_ini))"));
}

#[test]
fn test_find_nothing_exits_with_error() {
    let temp = TempDir::new().unwrap();
    temp.child("README.md").write_str("# nothing here\n").unwrap();

    // The search walks above the temp directory, so only check the failure
    // when no ancestor carries a configuration of its own.
    let assert = toxcfg().arg("find").arg(temp.path()).assert();
    let output = assert.get_output();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("error"), "stderr was: {stderr}");
        assert!(stderr.contains("No tox configuration file found"), "stderr was: {stderr}");
        assert_eq!(output.status.code(), Some(1));
    }
}

// ============================================================================
// envs
// ============================================================================

#[test]
fn test_envs_lists_names_in_order() {
    let temp = fixture_dir("tox_ini_basic");
    toxcfg()
        .arg("envs")
        .arg(temp.path())
        .assert()
        .success()
        .stdout("py39\npy310\nlint\n");
}

#[test]
fn test_envs_with_config_flag() {
    toxcfg()
        .args(["envs", "-c"])
        .arg(fixture("tox_ini_basic").join("tox.ini"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("py39\n"));
}

#[test]
fn test_config_from_environment_variable() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("ci.ini");
    file.write_str("[tox]\nenv_list = unit\n\n[testenv:extra]\ndeps = x\n")
        .unwrap();

    toxcfg()
        .arg("envs")
        .env("TOXCFG_CONFIG", file.path())
        .assert()
        .success()
        .stdout("unit\nextra\n");
}

#[test]
fn test_config_flag_rejects_directory() {
    let temp = fixture_dir("tox_ini_basic");
    toxcfg()
        .args(["envs", "-c"])
        .arg(temp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is a directory"));
}

#[test]
fn test_config_flag_missing_file() {
    let temp = TempDir::new().unwrap();
    toxcfg()
        .args(["envs", "-c"])
        .arg(temp.child("tox.ini").path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_parse_error_is_reported() {
    let temp = TempDir::new().unwrap();
    temp.child("tox.toml").write_str("env_list = [\n").unwrap();

    toxcfg()
        .arg("envs")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse TOML config"));
}

// ============================================================================
// show
// ============================================================================

#[test]
fn test_show_matches_golden_json() {
    let temp = fixture_dir("tox_ini_basic");
    let expected: Value = serde_json::from_str(
        &std::fs::read_to_string(fixture("tox_ini_basic").join("expected.json")).unwrap(),
    )
    .unwrap();

    let actual = stdout_json(toxcfg().arg("show").arg(temp.path()));
    assert_eq!(actual, expected);
}

#[test]
fn test_show_unresolved_keeps_tokens() {
    let temp = fixture_dir("tox_ini_basic");
    let json = stdout_json(toxcfg().arg("show").arg(temp.path()));
    assert_eq!(
        json["env"]["lint"]["commands"][0],
        "ruff check {posargs:src tests}"
    );
}

#[test]
fn test_show_resolve_without_posargs_uses_defaults() {
    let temp = fixture_dir("tox_ini_basic");
    let json = stdout_json(toxcfg().args(["show", "--resolve"]).arg(temp.path()));

    assert_eq!(json["env"]["lint"]["commands"][0], "ruff check src tests");
    assert_eq!(
        json["env"]["py39"]["commands"][0].as_str().map(str::trim_end),
        Some("coverage run -m pytest")
    );
}

#[test]
fn test_show_resolve_with_posargs() {
    let temp = fixture_dir("tox_ini_basic");
    let json = stdout_json(
        toxcfg()
            .args(["show", "--resolve"])
            .arg(temp.path())
            .args(["--", "-k", "smoke"]),
    );

    assert_eq!(json["env"]["lint"]["commands"][0], "ruff check -k smoke");
    assert_eq!(
        json["env"]["py310"]["commands"][0],
        "coverage run -m pytest -k smoke"
    );
}

#[test]
fn test_show_resolve_binds_root_directory() {
    let temp = fixture_dir("tox_ini_basic");
    let json = stdout_json(toxcfg().args(["show", "--resolve"]).arg(temp.path()));

    let python_path = json["env"]["py39"]["set_env"]["PYTHONPATH"]
        .as_str()
        .unwrap();
    assert!(python_path.ends_with("/src"), "got {python_path}");
    assert!(!python_path.contains("{toxinidir}"), "got {python_path}");
}

#[test]
fn test_verbose_logs_to_stderr() {
    let temp = fixture_dir("tox_toml");
    toxcfg()
        .args(["-v", "find"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Found configuration"));
}
