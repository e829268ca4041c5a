use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Add-on configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Settings shared between devices
    #[serde(default)]
    pub synced: SyncedConfig,

    /// Settings that only apply to this machine
    #[serde(default)]
    pub local: LocalConfig,
}

/// Settings shared between devices
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncedConfig {
    /// Names of the note types handled by the add-on
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Field names of the managed note types
    #[serde(default)]
    pub flds: FieldNames,

    /// Scheduling options
    #[serde(default)]
    pub sched: SchedConfig,
}

/// Field names used by the managed note types
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FieldNames {
    /// Field holding the original list
    #[serde(default = "default_original_field")]
    pub og: String,

    /// Title field
    #[serde(default = "default_title_field")]
    pub tt: String,

    /// Note-specific settings field
    #[serde(default = "default_settings_field")]
    pub st: String,

    /// Prefix of the numbered text fields (`Text1`, `Text2`, ...)
    #[serde(default = "default_text_prefix")]
    pub tx: String,

    /// Field holding the full cloze
    #[serde(default = "default_full_field")]
    pub fl: String,
}

/// Scheduling options
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedConfig {
    /// Bury new siblings
    #[serde(default = "default_no_sibling_new")]
    pub no_sibling_new: bool,

    /// Bury review siblings
    #[serde(default = "default_no_sibling_review")]
    pub no_sibling_review: bool,

    /// Suspend the full cloze card when a note is added
    #[serde(default = "default_suspend_full")]
    pub suspend_full: bool,
}

/// Machine-local settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LocalConfig {
    /// Key chord overrides, keyed by command id
    #[serde(default)]
    pub keybindings: HashMap<String, String>,
}

// Default values
fn default_models() -> Vec<String> {
    vec!["Cloze (overlapping)".to_string()]
}
fn default_original_field() -> String {
    "Original".to_string()
}
fn default_title_field() -> String {
    "Title".to_string()
}
fn default_settings_field() -> String {
    "Settings".to_string()
}
fn default_text_prefix() -> String {
    "Text".to_string()
}
fn default_full_field() -> String {
    "Full".to_string()
}
fn default_no_sibling_new() -> bool {
    true
}
fn default_no_sibling_review() -> bool {
    false
}
fn default_suspend_full() -> bool {
    true
}

impl Default for SyncedConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            flds: FieldNames::default(),
            sched: SchedConfig::default(),
        }
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            og: default_original_field(),
            tt: default_title_field(),
            st: default_settings_field(),
            tx: default_text_prefix(),
            fl: default_full_field(),
        }
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            no_sibling_new: default_no_sibling_new(),
            no_sibling_review: default_no_sibling_review(),
            suspend_full: default_suspend_full(),
        }
    }
}

/// Configuration manager
pub struct ConfigManager {
    /// The config
    config: Config,

    /// The path to the config file
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager
    pub fn new(config_dir: &Path) -> Self {
        let config_path = config_dir.join("config.json");

        Self {
            config: Config::default(),
            config_path,
        }
    }

    /// Directory used when no explicit one is given
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloze-overlapper")
    }

    /// Path of the config file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config
    pub fn load(&mut self) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Load config if it exists, otherwise use defaults
        if self.config_path.exists() {
            let config_str = fs::read_to_string(&self.config_path)
                .with_context(|| format!("Failed to read {}", self.config_path.display()))?;
            self.config = serde_json::from_str(&config_str)
                .map_err(|e| anyhow!("Failed to parse config: {}", e))?;
            tracing::info!("Loaded config from {}", self.config_path.display());
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
        }

        Ok(())
    }

    /// Load the config without blocking the runtime
    pub async fn load_async(&mut self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        match tokio::fs::read_to_string(&self.config_path).await {
            Ok(config_str) => {
                self.config = serde_json::from_str(&config_str)
                    .map_err(|e| anyhow!("Failed to parse config: {}", e))?;
                tracing::info!("Loaded config from {}", self.config_path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No config at {}, using defaults",
                    self.config_path.display()
                );
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.config_path.display()));
            }
        }

        Ok(())
    }

    /// Save the config
    pub fn save(&self) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_path, config_str)?;
        tracing::info!("Saved config to {}", self.config_path.display());
        Ok(())
    }

    /// Get the config
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the config
    pub fn get_config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Update a setting
    pub fn update_setting(&mut self, path: &str, value: serde_json::Value) -> Result<()> {
        let synced = &mut self.config.synced;
        match path {
            "sched.suspendFull" => {
                synced.sched.suspend_full =
                    value.as_bool().ok_or_else(|| anyhow!("Expected boolean"))?;
            }
            "sched.noSiblingNew" => {
                synced.sched.no_sibling_new =
                    value.as_bool().ok_or_else(|| anyhow!("Expected boolean"))?;
            }
            "sched.noSiblingReview" => {
                synced.sched.no_sibling_review =
                    value.as_bool().ok_or_else(|| anyhow!("Expected boolean"))?;
            }
            "fields.text" => {
                synced.flds.tx = value
                    .as_str()
                    .ok_or_else(|| anyhow!("Expected string"))?
                    .to_string();
            }
            "fields.full" => {
                synced.flds.fl = value
                    .as_str()
                    .ok_or_else(|| anyhow!("Expected string"))?
                    .to_string();
            }
            _ => {
                return Err(anyhow!("Unsupported setting path: {}", path));
            }
        }

        Ok(())
    }

    /// Get a setting by path
    pub fn get_setting(&self, path: &str) -> Result<serde_json::Value> {
        let synced = &self.config.synced;
        match path {
            "sched.suspendFull" => Ok(serde_json::json!(synced.sched.suspend_full)),
            "sched.noSiblingNew" => Ok(serde_json::json!(synced.sched.no_sibling_new)),
            "sched.noSiblingReview" => Ok(serde_json::json!(synced.sched.no_sibling_review)),
            "fields.text" => Ok(serde_json::json!(synced.flds.tx)),
            "fields.full" => Ok(serde_json::json!(synced.flds.fl)),
            _ => Err(anyhow!("Unsupported setting path: {}", path)),
        }
    }
}
