//! Configuration loading: file discovery, overlays, defaults
//!
//! Tests that point XDG_CONFIG_HOME somewhere else are marked #[serial] so
//! they do not race each other on the process environment.

use rollcall_common::config::{
    load_config, TomlConfig, DEFAULT_ENVIRONMENT, DEFAULT_LOADER_WORKERS, DEFAULT_VOTE_BATCH_SIZE,
};
use rollcall_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[test]
fn test_defaults_without_any_keys() {
    let config: TomlConfig = toml::from_str("").unwrap();

    assert_eq!(config.data_dir, None);
    assert_eq!(config.database_path, None);
    assert_eq!(config.ingest.vote_batch_size, DEFAULT_VOTE_BATCH_SIZE);
    assert_eq!(config.ingest.loader_workers, DEFAULT_LOADER_WORKERS);
    assert!(!config.ingest.skip_amendments);
    assert_eq!(config.ingest.timezone, "America/New_York");
    assert_eq!(config.logging.level, "info");
    assert!(config.responses.aliases.is_empty());
}

#[test]
fn test_explicit_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    write(
        &path,
        r#"
        data_dir = "/srv/congress/data"
        database_path = "/srv/rollcall/rollcall.db"

        [ingest]
        vote_batch_size = 500
        skip_amendments = true

        [responses.aliases]
        "Guilty" = "Yea"
        "Not Guilty" = "Nay"
        "#,
    );

    let config = load_config(Some(&path), DEFAULT_ENVIRONMENT).unwrap();

    assert_eq!(config.data_dir, Some(PathBuf::from("/srv/congress/data")));
    assert_eq!(config.database_path, Some(PathBuf::from("/srv/rollcall/rollcall.db")));
    assert_eq!(config.ingest.vote_batch_size, 500);
    assert_eq!(config.ingest.loader_workers, DEFAULT_LOADER_WORKERS);
    assert!(config.ingest.skip_amendments);
    assert_eq!(config.responses.aliases["Not Guilty"], "Nay");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config(Some(&dir.path().join("absent.toml")), DEFAULT_ENVIRONMENT);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_toml_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    write(&path, "[ingest\nvote_batch_size = ");

    match load_config(Some(&path), DEFAULT_ENVIRONMENT) {
        Err(Error::Toml { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected TOML error, got {:?}", other),
    }
}

#[test]
fn test_oversized_batch_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    write(&path, "[ingest]\nvote_batch_size = 10000\n");

    assert!(matches!(
        load_config(Some(&path), DEFAULT_ENVIRONMENT),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_environment_overlay_merges_over_base() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("config.toml");
    write(
        &base,
        r#"
        data_dir = "/srv/congress/data"
        [ingest]
        vote_batch_size = 1000
        loader_workers = 16
        [logging]
        level = "info"
        "#,
    );
    write(
        &dir.path().join("config.test.toml"),
        r#"
        [ingest]
        loader_workers = 2
        [logging]
        level = "debug"
        "#,
    );

    let prod = load_config(Some(&base), DEFAULT_ENVIRONMENT).unwrap();
    assert_eq!(prod.ingest.loader_workers, 16);
    assert_eq!(prod.logging.level, "info");

    let test = load_config(Some(&base), "test").unwrap();
    assert_eq!(test.ingest.loader_workers, 2);
    assert_eq!(test.logging.level, "debug");
    // Untouched keys come from the base file
    assert_eq!(test.ingest.vote_batch_size, 1000);
    assert_eq!(test.data_dir, Some(PathBuf::from("/srv/congress/data")));

    // Unknown environment without an overlay file falls back to the base
    let staging = load_config(Some(&base), "staging").unwrap();
    assert_eq!(staging.ingest.loader_workers, 16);
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_user_config_dir_is_discovered() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("rollcall").join("config.toml"),
        "[ingest]\nloader_workers = 3\n",
    );

    let original = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = load_config(None, DEFAULT_ENVIRONMENT);

    match original {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(config.unwrap().ingest.loader_workers, 3);
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_no_config_file_falls_back_to_defaults() {
    if Path::new("/etc/rollcall/config.toml").exists() {
        return;
    }

    let dir = TempDir::new().unwrap();
    let original = env::var_os("XDG_CONFIG_HOME");
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let config = load_config(None, DEFAULT_ENVIRONMENT);

    match original {
        Some(value) => env::set_var("XDG_CONFIG_HOME", value),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    let config = config.unwrap();
    assert_eq!(config.ingest.vote_batch_size, DEFAULT_VOTE_BATCH_SIZE);
    assert_eq!(config.data_dir, None);
}
