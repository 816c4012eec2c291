//! Layered configuration: defaults, global file, workspace files, environment.

use super::test_utils::EnvGuard;
use mrd::config::ConfigLoader;
use mrd::partition::BlockSizing;
use std::path::PathBuf;
use tempfile::TempDir;

/// Guard with an empty global config directory and no MRD overrides.
fn isolated(config_home: &TempDir) -> EnvGuard {
    let mut guard = EnvGuard::new();
    guard.set("XDG_CONFIG_HOME", config_home.path().to_str().unwrap());
    guard.remove("MRD_ENV");
    guard.remove("MRD__CALCULATION__CONCURRENT_TASKS");
    guard.remove("MRD__CALCULATION__MAX_SITES");
    guard
}

fn write(path: PathBuf, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn defaults_without_any_file() {
    let config_home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let _guard = isolated(&config_home);

    let config = ConfigLoader::load(workspace.path()).unwrap();
    assert_eq!(config.calculation.concurrent_tasks, 32);
    assert_eq!(config.calculation.max_sites, 10);
    assert_eq!(config.calculation.block_sizing, BlockSizing::PerGroup);
    assert_eq!(config.storage.store_path, PathBuf::from(".mrd/store"));
}

#[test]
fn workspace_file_overrides_global_file() {
    let config_home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let _guard = isolated(&config_home);

    write(
        config_home.path().join("mrd").join("config.toml"),
        "[calculation]\nconcurrent_tasks = 8\nmax_sites = 6\n",
    );
    write(
        workspace.path().join("config").join("config.toml"),
        "[calculation]\nconcurrent_tasks = 4\n",
    );

    assert_eq!(
        ConfigLoader::global_config_path().unwrap(),
        config_home.path().join("mrd").join("config.toml")
    );
    let config = ConfigLoader::load(workspace.path()).unwrap();
    assert_eq!(config.calculation.concurrent_tasks, 4);
    assert_eq!(config.calculation.max_sites, 6);
}

#[test]
fn environment_specific_file_and_variables() {
    let config_home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let mut guard = isolated(&config_home);

    write(
        workspace.path().join("config").join("config.toml"),
        "[calculation]\nconcurrent_tasks = 4\n",
    );
    write(
        workspace.path().join("config").join("production.toml"),
        "[calculation]\nconcurrent_tasks = 64\nblock_sizing = \"total\"\n",
    );
    guard.set("MRD_ENV", "production");

    let config = ConfigLoader::load(workspace.path()).unwrap();
    assert_eq!(config.calculation.concurrent_tasks, 64);
    assert_eq!(config.calculation.block_sizing, BlockSizing::Total);

    guard.set("MRD__CALCULATION__MAX_SITES", "3");
    let config = ConfigLoader::load(workspace.path()).unwrap();
    assert_eq!(config.calculation.max_sites, 3);
}

#[test]
fn invalid_values_are_rejected() {
    let config_home = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let _guard = isolated(&config_home);

    write(
        workspace.path().join("config").join("config.toml"),
        "[binning]\nsigbins = [1.0, 0.5]\n",
    );
    assert!(ConfigLoader::load(workspace.path()).is_err());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&dir.path().join("nope.toml")).is_err());
}
