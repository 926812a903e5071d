use serde_json::json;
use stager_domain::config::{FetchSettings, LoaderSettings, TimingSettings};
use stager_domain::constants::DEFAULT_CONFIG_URL;
use std::time::Duration;

#[test]
fn settings_defaults_are_sane() {
    let fetch = FetchSettings::default();
    assert_eq!(fetch.timeout(), Duration::from_secs(15));
    assert_eq!(fetch.max_attempts, 3);
    assert_eq!(fetch.backoff_step(), Duration::from_secs(1));

    let timing = TimingSettings::default();
    assert_eq!(timing.settle_delay(), Duration::from_millis(200));
    assert_eq!(timing.reveal_delay(), Duration::from_millis(300));
    assert_eq!(timing.removal_delay(), Duration::from_millis(500));

    let settings = LoaderSettings::default();
    assert_eq!(settings.config_url, DEFAULT_CONFIG_URL);
    assert_eq!(settings.logging.level, "info");
    assert!(settings.surface.containers.is_empty());
}

#[test]
fn settings_deserialize_partially() {
    let raw = json!({
        "config_url": "https://cdn.example.test/site.json",
        "fetch": { "max_attempts": 5 },
        "logging": { "json": true, "directory": "/tmp/stager" }
    });

    let settings: LoaderSettings = serde_json::from_value(raw).expect("settings deserialize");
    assert_eq!(settings.config_url, "https://cdn.example.test/site.json");
    assert_eq!(settings.fetch.max_attempts, 5);
    assert_eq!(settings.fetch.timeout_ms, 15_000);
    assert!(settings.logging.json);
    assert_eq!(settings.logging.directory, Some(std::path::PathBuf::from("/tmp/stager")));
}

#[test]
fn settings_clone_on_write() {
    let shared = LoaderSettings::default();
    let mut tuned = shared.clone();
    tuned.fetch.max_attempts = 1;

    assert_eq!(shared.fetch.max_attempts, 3);
    assert_eq!(tuned.fetch.max_attempts, 1);
}
