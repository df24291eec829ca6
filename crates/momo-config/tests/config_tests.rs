use momo_config::{Config, ConfigError, ConfigManager, MAX_HISTORY_MONTHS};
use rust_decimal_macros::dec;
use tempfile::tempdir;

#[test]
fn default_config_targets_ghana_cedis() {
    let cfg = Config::default();

    assert_eq!(cfg.currency, "GHS");
    assert!(!cfg.locale.is_empty());
    assert_eq!(cfg.near_limit_ratio, dec!(0.8));
    assert_eq!(cfg.trend_band, dec!(0.10));
    assert_eq!(cfg.default_budget_period, "monthly");
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert_eq!(manager.load().expect("defaults"), Config::default());

    let mut cfg = Config::default();
    cfg.set("near_limit_ratio", "0.75").expect("ratio");
    cfg.set("last_owner", "0244123456").expect("owner");
    cfg.set("ui_color_enabled", "off").expect("colour");

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.get("near_limit_ratio").unwrap().as_deref(), Some("0.75"));
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    std::fs::write(
        manager.config_path(),
        r#"{ "locale": "en-GB", "currency": "GHS" }"#,
    )
    .expect("write config");

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.locale, "en-GB");
    assert_eq!(loaded.history_months, 5);
    assert!(loaded.ui_color_enabled);
}

#[test]
fn setters_validate_values() {
    let mut cfg = Config::default();
    assert!(matches!(
        cfg.set("near_limit_ratio", "1.5"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        cfg.set("default_budget_period", "yearly"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::UnknownKey(_))));
    for months in ["121", "4000000000"] {
        assert!(matches!(
            cfg.set("history_months", months),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
    cfg.set("history_months", &MAX_HISTORY_MONTHS.to_string()).expect("longest history");
    assert_eq!(cfg.history_months, MAX_HISTORY_MONTHS);

    cfg.set("currency", "ghs").expect("currency");
    assert_eq!(cfg.currency, "GHS");
    cfg.set("data_root", "/tmp/momo").expect("root");
    cfg.set("data_root", "none").expect("clear root");
    assert_eq!(cfg.data_root, None);
}
