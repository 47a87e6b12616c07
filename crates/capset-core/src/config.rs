//! TOML-based application configuration.
//!
//! Stores host preferences for the capabilities page:
//! - Category checkbox policy
//! - Whether to prompt before enabling capabilities on first use
//! - Page labels and the advanced per-activity editor switch
//!
//! Configuration is stored at `~/.config/capset/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CoreError, Result};
use crate::relations::CategoryPolicy;

/// Enablement behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnablementConfig {
    #[serde(default)]
    pub category_policy: CategoryPolicy,
    /// Ask before a capability is enabled on first use.
    #[serde(default = "default_true")]
    pub prompt_on_enable: bool,
}

/// Capabilities page options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_activity_name")]
    pub activity_name: String,
    #[serde(default = "default_category_name")]
    pub category_name: String,
    /// Offer the per-activity editor next to the category list.
    #[serde(default)]
    pub allow_advanced: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/capset/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub enablement: EnablementConfig,
    #[serde(default)]
    pub page: PageConfig,
}

fn default_true() -> bool {
    true
}
fn default_activity_name() -> String {
    "Capabilities".into()
}
fn default_category_name() -> String {
    "Categories".into()
}

impl Default for EnablementConfig {
    fn default() -> Self {
        Self {
            category_policy: CategoryPolicy::default(),
            prompt_on_enable: true,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            activity_name: default_activity_name(),
            category_name: default_category_name(),
            allow_advanced: false,
        }
    }
}

/// Returns `~/.config/capset[-dev]/` based on CAPSET_ENV.
///
/// Set CAPSET_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CAPSET_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("capset-dev")
    } else {
        base_dir.join("capset")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(format!("'{value}' is not a boolean: {e}")))?,
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole table".to_string()));
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location or create it with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the default config cannot be written. An unreadable file is never
    /// overwritten.
    pub fn load_from(path: &Path) -> Result<Self> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| load_failed(e.to_string()).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(load_failed(e.to_string()).into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.enablement.category_policy, CategoryPolicy::All);
        assert!(parsed.enablement.prompt_on_enable);
        assert_eq!(parsed.page.activity_name, "Capabilities");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[enablement]\ncategory_policy = \"any\"\n").unwrap();
        assert_eq!(parsed.enablement.category_policy, CategoryPolicy::Any);
        assert!(parsed.enablement.prompt_on_enable);
        assert!(!parsed.page.allow_advanced);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("enablement.category_policy").as_deref(), Some("all"));
        assert_eq!(cfg.get("page.allow_advanced").as_deref(), Some("false"));
        assert!(cfg.get("page.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_bool_string_and_enum() {
        let mut cfg = Config::default();
        cfg.set("page.allow_advanced", "true").unwrap();
        cfg.set("page.category_name", "Roles").unwrap();
        cfg.set("enablement.category_policy", "any").unwrap();
        assert!(cfg.page.allow_advanced);
        assert_eq!(cfg.page.category_name, "Roles");
        assert_eq!(cfg.enablement.category_policy, CategoryPolicy::Any);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("page.nonexistent", "x"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.set("page.allow_advanced", "not_a_bool"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            cfg.set("enablement.category_policy", "most"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            cfg.set("page", "x"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        // Failed sets leave the config untouched.
        assert_eq!(cfg.enablement.category_policy, CategoryPolicy::All);
    }

    #[test]
    fn load_from_creates_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.page.category_name, "Categories");

        let mut cfg = created;
        cfg.set("page.category_name", "Roles").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().page.category_name, "Roles");
    }

    #[test]
    fn load_from_reports_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "enablement = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn load_from_keeps_unreadable_files_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let bytes = b"[page]\ncategory_name = \"R\xe9les\"\n";
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }
}
