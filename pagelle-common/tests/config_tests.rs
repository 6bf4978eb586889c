//! Configuration loading and secret resolution tests
//!
//! Tests that touch SUPABASE_URL, SUPABASE_KEY or GOOGLE_API_KEY are marked
//! #[serial] so they never race on the process environment.

use pagelle_common::config::{
    load_toml_config, resolve_generation_key, resolve_secret, resolve_store_credentials,
    ConfigSource, TomlConfig, ENV_GENERATION_KEY, ENV_STORE_KEY, ENV_STORE_URL,
};
use pagelle_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;

fn clear_secret_env() {
    env::remove_var(ENV_STORE_URL);
    env::remove_var(ENV_STORE_KEY);
    env::remove_var(ENV_GENERATION_KEY);
}

fn config_with_store(url: Option<&str>, key: Option<&str>) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.store.url = url.map(String::from);
    config.store.key = key.map(String::from);
    config
}

#[test]
#[serial]
fn test_store_credentials_from_environment() {
    clear_secret_env();
    env::set_var(ENV_STORE_URL, "https://env.supabase.co");
    env::set_var(ENV_STORE_KEY, "env-key");

    let creds = resolve_store_credentials(&TomlConfig::default()).unwrap();
    assert_eq!(creds.url, "https://env.supabase.co");
    assert_eq!(creds.key, "env-key");

    clear_secret_env();
}

#[test]
#[serial]
fn test_environment_wins_over_toml() {
    clear_secret_env();
    env::set_var(ENV_STORE_URL, "https://env.supabase.co");

    let config = config_with_store(Some("https://toml.supabase.co"), Some("toml-key"));
    let creds = resolve_store_credentials(&config).unwrap();

    assert_eq!(creds.url, "https://env.supabase.co");
    assert_eq!(creds.key, "toml-key");

    clear_secret_env();
}

#[test]
#[serial]
fn test_blank_environment_value_falls_back_to_toml() {
    clear_secret_env();
    env::set_var(ENV_STORE_KEY, "   ");

    let resolved = resolve_secret(ENV_STORE_KEY, Some("toml-key"));
    assert_eq!(resolved, Some(("toml-key".to_string(), "TOML")));

    clear_secret_env();
}

#[test]
#[serial]
fn test_missing_store_key_is_fatal() {
    clear_secret_env();

    let config = config_with_store(Some("https://toml.supabase.co"), None);
    match resolve_store_credentials(&config) {
        Err(Error::Config(message)) => {
            assert!(message.contains(ENV_STORE_KEY));
            assert!(!message.contains(&format!("missing: {}", ENV_STORE_URL)));
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_missing_generation_key_disables_ai() {
    clear_secret_env();
    assert_eq!(resolve_generation_key(&TomlConfig::default()), None);

    let mut config = TomlConfig::default();
    config.generation.api_key = Some("toml-ai-key".to_string());
    assert_eq!(resolve_generation_key(&config), Some("toml-ai-key".to_string()));

    env::set_var(ENV_GENERATION_KEY, "env-ai-key");
    assert_eq!(resolve_generation_key(&config), Some("env-ai-key".to_string()));

    clear_secret_env();
}

#[test]
fn test_load_explicit_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
title = "Radar Party"
participants = ["Marco", "Giulia"]
categories = ["Romantico", "Pazzo"]
window_hours = 12

[store]
table = "voti_test"
"#
    )
    .unwrap();

    let (config, source) = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(source, ConfigSource::Explicit(file.path().to_path_buf()));
    assert_eq!(config.title, "Radar Party");
    assert_eq!(config.store.table, "voti_test");
    assert_eq!(config.window().unwrap(), chrono::Duration::hours(12));
    assert_eq!(config.roster().unwrap().required_ratings(), 4);
}

#[test]
fn test_missing_explicit_config_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = load_toml_config(Some(&missing));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_duplicate_participants_rejected() {
    let config = TomlConfig::from_toml_str(r#"participants = ["Marco", "Marco"]"#).unwrap();
    assert!(matches!(config.roster(), Err(Error::Config(_))));
}
