//! Module-wide tuning: enable flag, announcements, multiplier and bosses

use super::{BossConfig, ConfigError, DEFAULT_BOSS_ENTRIES};
use crate::formula::{StatFormula, DEFAULT_STAT_MULTIPLIER};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Settings as written in the TOML file
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    #[serde(default = "default_enable")]
    enable: bool,
    #[serde(default = "default_announce_on_kill")]
    announce_on_kill: bool,
    #[serde(default = "default_stat_multiplier")]
    stat_multiplier: f64,
    /// Creature entry (as a string key) → threshold level; only the
    /// entries in [`DEFAULT_BOSS_ENTRIES`] are honoured
    #[serde(default)]
    bosses: BTreeMap<String, i64>,
}

fn default_enable() -> bool {
    true
}
fn default_announce_on_kill() -> bool {
    true
}
fn default_stat_multiplier() -> f64 {
    DEFAULT_STAT_MULTIPLIER
}

/// Validated settings
///
/// Replaced wholesale on reload, never mutated field by field while events
/// are being handled.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeSettings {
    pub enabled: bool,
    pub announce_on_kill: bool,
    pub formula: StatFormula,
    pub bosses: BossConfig,
}

impl Default for UpgradeSettings {
    fn default() -> Self {
        UpgradeSettings {
            enabled: true,
            announce_on_kill: true,
            formula: StatFormula::default(),
            bosses: BossConfig::new(),
        }
    }
}

impl UpgradeSettings {
    /// Parse settings from a TOML string
    ///
    /// Syntax errors fail the whole parse. Bad individual values (a
    /// non-positive multiplier, a non-numeric or unsupported boss key, an
    /// out-of-range threshold) are logged and replaced by their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = super::parse_toml(content)?;
        Ok(Self::from_file(file))
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: SettingsFile = super::load_toml(path)?;
        Ok(Self::from_file(file))
    }

    /// Load settings, falling back to defaults if the file is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "using default upgrade settings");
            Self::default()
        })
    }

    /// Load a TOML file through [`UpgradeSettings::validate_toml_str`]
    pub fn load_strict(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::validate_toml_str(&content)
    }

    /// Settings from the config file bundled with the crate
    pub fn bundled() -> Self {
        let toml = include_str!("../../config/selfcraft_upgrade.toml");
        Self::from_toml_str(toml).unwrap_or_default()
    }

    /// Same as [`UpgradeSettings::from_toml_str`], but returns the value
    /// problems instead of logging and repairing them
    pub fn validate_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = super::parse_toml(content)?;
        if !is_valid_multiplier(file.stat_multiplier) {
            return Err(ConfigError::ValidationError(format!(
                "stat_multiplier must be a positive finite number, got {}",
                file.stat_multiplier
            )));
        }
        for (key, &threshold) in &file.bosses {
            let Ok(entry) = key.parse::<u32>() else {
                return Err(ConfigError::ValidationError(format!(
                    "boss key `{key}` is not a creature entry"
                )));
            };
            if !DEFAULT_BOSS_ENTRIES.contains(&entry) {
                return Err(ConfigError::ValidationError(format!(
                    "boss {entry} is not a supported boss"
                )));
            }
            if u32::try_from(threshold).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "boss {key} threshold {threshold} is out of range"
                )));
            }
        }
        Ok(Self::from_file(file))
    }

    fn from_file(file: SettingsFile) -> Self {
        let multiplier = if is_valid_multiplier(file.stat_multiplier) {
            file.stat_multiplier
        } else {
            warn!(
                value = file.stat_multiplier,
                fallback = DEFAULT_STAT_MULTIPLIER,
                "invalid stat_multiplier"
            );
            DEFAULT_STAT_MULTIPLIER
        };

        let entries = file.bosses.iter().filter_map(|(key, &threshold)| {
            let Ok(entry) = key.parse::<u32>() else {
                warn!(key = %key, "ignoring boss with non-numeric entry");
                return None;
            };
            if !DEFAULT_BOSS_ENTRIES.contains(&entry) {
                warn!(entry, "ignoring unsupported boss entry");
                return None;
            }
            let Ok(threshold) = u32::try_from(threshold) else {
                warn!(entry, threshold, "ignoring boss with out-of-range threshold");
                return None;
            };
            Some((entry, threshold))
        });

        UpgradeSettings {
            enabled: file.enable,
            announce_on_kill: file.announce_on_kill,
            formula: StatFormula::new(multiplier),
            bosses: BossConfig::from_entries(entries),
        }
    }
}

fn is_valid_multiplier(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
