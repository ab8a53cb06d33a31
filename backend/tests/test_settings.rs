//! Business Settings Tests
//!
//! Load-or-create initialization, persistence and validation of the
//! settings file, plus environment-driven rule selection.

use delivery_commission_core_rs::config::{AppConfig, RULES_PATH_VAR, SETTINGS_PATH_VAR};
use delivery_commission_core_rs::settings::{
    BusinessSettings, SettingsError, SettingsLoader, DEFAULT_BASE_PAYOUT,
    DEFAULT_COMMISSION_PER_KM,
};
use delivery_commission_core_rs::RuleSet;
use std::collections::HashMap;
use std::path::PathBuf;

/// Unique scratch directory under the system temp dir
fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("commission-settings-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_load_missing_file_is_not_found() {
    let dir = temp_dir();
    let loader = SettingsLoader::new(dir.join("settings.json"));

    assert!(matches!(loader.load(), Err(SettingsError::NotFound(_))));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_or_create_writes_defaults_once() {
    let dir = temp_dir();
    let path = dir.join("nested").join("settings.json");
    let loader = SettingsLoader::new(&path);

    let created = loader.load_or_create().unwrap();
    assert!(path.exists());
    assert_eq!(created, BusinessSettings::default());

    let rule = &created.rule_set().rules()[0];
    assert_eq!(rule.base_payout(), DEFAULT_BASE_PAYOUT);
    assert_eq!(rule.commission_per_km(), DEFAULT_COMMISSION_PER_KM);
    assert!(rule.is_unbounded());

    // Second call reads the persisted file instead of recreating it
    let mut edited = created.clone();
    edited.business_name = "Night Owl Eats".to_string();
    loader.save(&edited).unwrap();

    let reloaded = loader.load_or_create().unwrap();
    assert_eq!(reloaded.business_name, "Night Owl Eats");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_corrupt_file_is_not_replaced() {
    let dir = temp_dir();
    let path = dir.join("settings.json");
    std::fs::write(&path, "{ broken").unwrap();

    let loader = SettingsLoader::new(&path);
    assert!(matches!(loader.load_or_create(), Err(SettingsError::Parse(_))));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_invalid_settings_rejected_on_save_and_load() {
    let dir = temp_dir();
    let path = dir.join("settings.json");
    let loader = SettingsLoader::new(&path);

    let bad = BusinessSettings {
        currency_code: "EURO".to_string(),
        ..BusinessSettings::default()
    };
    assert!(matches!(loader.save(&bad), Err(SettingsError::Invalid(_))));
    assert!(!path.exists());

    std::fs::write(&path, r#"{"currency_code": "eu"}"#).unwrap();
    assert!(matches!(loader.load(), Err(SettingsError::Invalid(_))));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_settings_with_custom_rules() {
    let dir = temp_dir();
    let path = dir.join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "business_name": "Quick Bites",
            "currency_code": "INR",
            "currency_symbol": "₹",
            "commission_rules": [
                {"id": "city", "min_distance": 0, "max_distance": 8,
                 "commission_per_km": 6, "base_payout": 25},
                {"id": "outskirts", "min_distance": 8, "max_distance": null,
                 "commission_per_km": 8, "base_payout": 25}
            ]
        }"#,
    )
    .unwrap();

    let settings = SettingsLoader::new(&path).load().unwrap();
    let result = settings.rule_set().calculate(10.0).unwrap();
    assert_eq!(result.rule.id(), "outskirts");
    assert_eq!(result.total_payout, 105.0);
    assert_eq!(settings.format_amount(result.total_payout), "₹105.00");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_rules_path_overrides_embedded_rules() {
    let dir = temp_dir();
    let rules_path = dir.join("rules.json");
    std::fs::write(
        &rules_path,
        r#"[{"id": "override", "min_distance": 0, "commission_per_km": 1, "base_payout": 1}]"#,
    )
    .unwrap();

    let mut vars = HashMap::new();
    vars.insert(SETTINGS_PATH_VAR.to_string(), dir.join("settings.json").display().to_string());
    vars.insert(RULES_PATH_VAR.to_string(), rules_path.display().to_string());
    let config = AppConfig::from_map(&vars).unwrap();

    let settings = SettingsLoader::new(&config.settings_path).load_or_create().unwrap();
    let rules: RuleSet = config.rule_set(&settings).unwrap();
    assert_eq!(rules.len(), 1);
    assert!(rules.get("override").is_some());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_rules_file_quote_leaves_settings_untouched() {
    let dir = temp_dir();
    let rules_path = dir.join("rules.json");
    let settings_path = dir.join("settings.json");
    std::fs::write(
        &rules_path,
        r#"[{"id": "override", "min_distance": 0, "commission_per_km": 1, "base_payout": 1}]"#,
    )
    .unwrap();

    let mut vars = HashMap::new();
    vars.insert(SETTINGS_PATH_VAR.to_string(), settings_path.display().to_string());
    vars.insert(RULES_PATH_VAR.to_string(), rules_path.display().to_string());
    let config = AppConfig::from_map(&vars).unwrap();

    let rules = config.load_rule_set().unwrap();
    assert!(rules.get("override").is_some());
    assert!(!settings_path.exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_embedded_rules_load_creates_settings() {
    let dir = temp_dir();
    let settings_path = dir.join("settings.json");

    let mut vars = HashMap::new();
    vars.insert(SETTINGS_PATH_VAR.to_string(), settings_path.display().to_string());
    let config = AppConfig::from_map(&vars).unwrap();

    let rules = config.load_rule_set().unwrap();
    assert_eq!(&rules, BusinessSettings::default().rule_set());
    assert!(settings_path.exists());

    std::fs::remove_dir_all(&dir).ok();
}
