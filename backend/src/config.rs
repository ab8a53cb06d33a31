//! Environment configuration
//!
//! Where settings and rules live, and how logs are emitted.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::rules::{RuleSet, RuleSetError};
use crate::settings::{BusinessSettings, SettingsError, SettingsLoader};

pub const SETTINGS_PATH_VAR: &str = "COMMISSION_SETTINGS_PATH";
pub const RULES_PATH_VAR: &str = "COMMISSION_RULES_PATH";
pub const LOG_JSON_VAR: &str = "COMMISSION_LOG_JSON";

const DEFAULT_SETTINGS_PATH: &str = "business_settings.json";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for env var {key}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Rules(#[from] RuleSetError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub settings_path: PathBuf,

    /// Standalone rules file; overrides the rules embedded in settings
    pub rules_path: Option<PathBuf>,

    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_map(&env_map())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self {
            settings_path: PathBuf::from(get(vars, SETTINGS_PATH_VAR, DEFAULT_SETTINGS_PATH)),
            rules_path: optional(vars, RULES_PATH_VAR).map(PathBuf::from),
            log_json: bool_var(vars, LOG_JSON_VAR, false)?,
        })
    }

    /// The rule set in effect: the rules file when configured, else the
    /// rules embedded in `settings`
    pub fn rule_set(&self, settings: &BusinessSettings) -> Result<RuleSet, RuleSetError> {
        match &self.rules_path {
            Some(path) => RuleSet::from_path(path),
            None => Ok(settings.rule_set().clone()),
        }
    }

    /// Load the rule set in effect without touching settings when a rules
    /// file is configured; otherwise load (or create) the settings file
    pub fn load_rule_set(&self) -> Result<RuleSet, ConfigError> {
        match &self.rules_path {
            Some(path) => Ok(RuleSet::from_path(path)?),
            None => {
                let settings = SettingsLoader::new(&self.settings_path).load_or_create()?;
                Ok(settings.rule_set().clone())
            }
        }
    }
}

fn env_map() -> HashMap<String, String> {
    env::vars().collect()
}

fn get(vars: &HashMap<String, String>, key: &str, default: &str) -> String {
    vars.get(key)
        .cloned()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).cloned().filter(|v| !v.is_empty())
}

fn bool_var(vars: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, ConfigError> {
    match optional(vars, key) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        },
    }
}
