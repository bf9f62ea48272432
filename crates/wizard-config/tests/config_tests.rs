use wizard_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_keeps_name_minimums_distinct() {
    let cfg = Config::default();

    assert_eq!(cfg.validation.person_name_min, 2);
    assert_eq!(cfg.validation.host_name_min, 2);
    assert_eq!(cfg.validation.event_name_min, 3);
    assert_eq!(cfg.validation.mobile_digits, 10);
    assert_eq!(cfg.validation.min_age, 13);
    assert_eq!(cfg.validation.max_age, 120);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded, Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.ui_color_enabled = false;
    cfg.validation.mobile_digits = 9;
    cfg.validation.password.require_special_char = false;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert!(!loaded.ui_color_enabled);
    assert_eq!(loaded.validation.mobile_digits, 9);
    assert!(!loaded.validation.password.require_special_char);
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn partial_validation_section_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "validation": { "event_name_min": 4 } }"#,
    )
    .expect("write config");

    let loaded = ConfigManager::new(path).load().expect("load config");
    assert_eq!(loaded.validation.event_name_min, 4);
    assert_eq!(loaded.validation.person_name_min, 2);
    assert_eq!(loaded.validation.password.min_length, 8);
    assert!(loaded.ui_color_enabled);
}

#[test]
fn inverted_age_range_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.validation.min_age = 30;
    cfg.validation.max_age = 20;

    let err = manager.save(&cfg).expect_err("inverted range");
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn oversized_max_age_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.validation.max_age = u32::MAX;

    let err = manager.save(&cfg).expect_err("max age out of range");
    assert!(matches!(err, ConfigError::Invalid(_)));
}
