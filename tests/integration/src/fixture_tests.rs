//! Golden-file tests over test-fixtures/configs
//!
//! Every fixture directory holds one configuration file and an
//! `expected.json` with the normalized layout it must read to.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tox_config::{ConfigSource, find_config_file, read_config};
use tox_fs::{NormalizedPath, io};

/// Path to test-fixtures/configs (relative to the workspace root).
fn configs_dir() -> PathBuf {
    // tests/integration -> ../../test-fixtures
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/configs")
}

fn load_expected(fixture: &str) -> serde_json::Value {
    let path = configs_dir().join(fixture).join("expected.json");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read expected output at {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", path.display(), e))
}

#[rstest]
#[case("tox_ini_basic", ConfigSource::ToxIni)]
#[case("tox_ini_generative", ConfigSource::ToxIni)]
#[case("tox_ini_sections", ConfigSource::ToxIni)]
#[case("setup_cfg", ConfigSource::SetupCfg)]
#[case("pyproject_legacy", ConfigSource::PyprojectLegacyIni)]
#[case("pyproject_native", ConfigSource::PyprojectToml)]
#[case("tox_toml", ConfigSource::ToxToml)]
fn test_fixture(#[case] fixture: &str, #[case] source: ConfigSource) {
    let dir = configs_dir().join(fixture);

    let found = find_config_file(Some(&dir)).unwrap();
    assert_eq!(found.source, source);
    assert_eq!(
        found.root(),
        Some(io::resolve_dir(&NormalizedPath::new(&dir)).unwrap())
    );

    let config = read_config(Some(&dir)).unwrap();
    let actual = serde_json::to_value(&config).unwrap();
    assert_eq!(actual, load_expected(fixture));

    // reading is deterministic
    assert_eq!(config, read_config(Some(&dir)).unwrap());
}

#[test]
fn test_every_fixture_has_expected_output() {
    let mut fixtures: Vec<String> = fs::read_dir(configs_dir())
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    fixtures.sort();

    for fixture in &fixtures {
        let expected = configs_dir().join(fixture).join("expected.json");
        assert!(expected.is_file(), "{fixture} has no expected.json");
    }
    assert_eq!(fixtures.len(), 7, "fixture added without a test case: {fixtures:?}");
}
