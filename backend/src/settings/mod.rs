//! Business Settings
//!
//! Process-wide business configuration, loaded once at startup and handed to
//! consumers by reference.
//!
//! # Initialization Contract
//!
//! [`SettingsLoader::load_or_create`] either reads the settings file or, when
//! it does not exist yet, writes the defaults to it and returns them. There is
//! no global instance: the caller owns the returned [`BusinessSettings`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::CommissionRule;
use crate::rules::RuleSet;

/// Base payout of the default commission rule
pub const DEFAULT_BASE_PAYOUT: f64 = 20.0;

/// Per-kilometer rate of the default commission rule
pub const DEFAULT_COMMISSION_PER_KM: f64 = 5.0;

/// Errors raised while loading or saving settings
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Settings file not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Failed to serialize settings: {0}")]
    Serialization(String),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Global business configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    /// Display name of the platform
    pub business_name: String,

    /// ISO 4217 currency code payouts are denominated in
    pub currency_code: String,

    pub currency_symbol: String,

    /// Delivery-partner commission bands
    pub commission_rules: RuleSet,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            business_name: "Food Delivery".to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            commission_rules: RuleSet::from_trusted(vec![CommissionRule::new_unchecked(
                "default",
                0.0,
                None,
                DEFAULT_COMMISSION_PER_KM,
                DEFAULT_BASE_PAYOUT,
            )]),
        }
    }
}

impl BusinessSettings {
    /// Check the fields serde cannot check on its own
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.business_name.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "business_name must not be empty".to_string(),
            ));
        }
        let code = &self.currency_code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(SettingsError::Invalid(format!(
                "currency_code must be a 3-letter uppercase ISO code, got '{}'",
                code
            )));
        }
        Ok(())
    }

    /// The configured commission rules
    pub fn rule_set(&self) -> &RuleSet {
        &self.commission_rules
    }

    /// Format an amount with the configured currency symbol
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

/// Loads and persists [`BusinessSettings`] at a fixed path
///
/// # Example
/// ```no_run
/// use delivery_commission_core_rs::settings::SettingsLoader;
///
/// let loader = SettingsLoader::new("business_settings.json");
/// let settings = loader.load_or_create().unwrap();
/// let payout = settings.rule_set().calculate(3.2).unwrap();
/// println!("{}", settings.format_amount(payout.total_payout));
/// ```
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: PathBuf,
}

impl SettingsLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read existing settings
    ///
    /// # Errors
    /// `SettingsError::NotFound` when the file is missing; `Parse`/`Invalid`
    /// when its contents are malformed.
    pub fn load(&self) -> Result<BusinessSettings, SettingsError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SettingsError::NotFound(self.display_path()))
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let settings: BusinessSettings =
            serde_json::from_str(&json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;

        info!(
            path = %self.path.display(),
            rules = settings.commission_rules.len(),
            "Loaded business settings"
        );
        Ok(settings)
    }

    /// Read existing settings, or persist and return the defaults
    pub fn load_or_create(&self) -> Result<BusinessSettings, SettingsError> {
        match self.load() {
            Err(SettingsError::NotFound(_)) => {
                warn!(
                    path = %self.path.display(),
                    "Business settings missing, creating defaults"
                );
                let settings = BusinessSettings::default();
                self.save(&settings)?;
                Ok(settings)
            }
            other => other,
        }
    }

    /// Validate and write settings, creating parent directories as needed
    pub fn save(&self, settings: &BusinessSettings) -> Result<(), SettingsError> {
        settings.validate()?;

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), "Saved business settings");
        Ok(())
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, err: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.display_path(),
            message: err.to_string(),
        }
    }
}
