use dupescan::actions::CollisionPolicy;
use dupescan::config::{Settings, SettingsOverrides};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

// Environment variables are process-global.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 5] = [
    "DUPESCAN_HASH_THREADS",
    "DUPESCAN_SKIP_HIDDEN",
    "DUPESCAN_IGNORE_PATTERNS",
    "DUPESCAN_ON_COLLISION",
    "DUPESCAN_USE_TRASH",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_config_load_defaults() {
    let figment = Figment::from(Serialized::defaults(Settings::default()));
    let settings: Settings = figment.extract().unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_config_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
hash_threads = 8
skip_hidden = true
ignore_patterns = ["*.tmp", "cache/"]
on_collision = "rename"
use_trash = true
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(&path), &SettingsOverrides::default()).unwrap();

    assert_eq!(settings.hash_threads, 8);
    assert!(settings.skip_hidden);
    assert_eq!(settings.ignore_patterns, vec!["*.tmp", "cache/"]);
    assert_eq!(settings.on_collision, CollisionPolicy::Rename);
    assert!(settings.use_trash);
}

#[test]
fn test_config_partial_toml_keeps_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "use_trash = true\n").unwrap();

    let settings = Settings::load(Some(&path), &SettingsOverrides::default()).unwrap();

    assert!(settings.use_trash);
    assert_eq!(settings.hash_threads, 1);
    assert_eq!(settings.on_collision, CollisionPolicy::Skip);
}

#[test]
fn test_config_hierarchy_file_env_cli() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "hash_threads = 2\non_collision = \"overwrite\"\nskip_hidden = true\n")
        .unwrap();

    std::env::set_var("DUPESCAN_HASH_THREADS", "6");
    std::env::set_var("DUPESCAN_ON_COLLISION", "rename");

    let overrides = SettingsOverrides {
        hash_threads: Some(3),
        ..SettingsOverrides::default()
    };
    let settings = Settings::load(Some(&path), &overrides);
    clear_env();
    let settings = settings.unwrap();

    // CLI beats env, env beats file, file beats defaults
    assert_eq!(settings.hash_threads, 3);
    assert_eq!(settings.on_collision, CollisionPolicy::Rename);
    assert!(settings.skip_hidden);
}

#[test]
fn test_config_missing_explicit_file_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let result = Settings::load(
        Some(&dir.path().join("absent.toml")),
        &SettingsOverrides::default(),
    );

    assert!(result.is_err());
}

#[test]
fn test_config_invalid_toml_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "invalid = toml").unwrap();

    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&path));
    let result: Result<Settings, _> = figment.extract();
    assert!(result.is_err());
}

#[test]
fn test_config_invalid_collision_policy_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "on_collision = \"explode\"\n").unwrap();

    assert!(Settings::load(Some(&path), &SettingsOverrides::default()).is_err());
}

#[test]
fn test_config_zero_threads_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "hash_threads = 0\n").unwrap();

    let err = Settings::load(Some(&path), &SettingsOverrides::default()).unwrap_err();
    assert!(err.to_string().contains("hash_threads"));
}

#[test]
fn test_config_toml_serialization() {
    let settings = Settings {
        hash_threads: 2,
        on_collision: CollisionPolicy::Overwrite,
        ..Settings::default()
    };

    let content = toml::to_string_pretty(&settings).unwrap();
    assert!(content.contains("hash_threads = 2"));
    assert!(content.contains("on_collision = \"overwrite\""));
}
