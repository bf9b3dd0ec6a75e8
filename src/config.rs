//! Configuration loading and management
//!
//! Handles parsing of `.mytasks.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::matcher::RuleSet;
use crate::task::COMPLETED_STATUS;

pub const CONFIG_FILENAME: &str = ".mytasks.toml";
pub const STATE_DIR: &str = ".mytasks";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fallback identity when nothing else is supplied
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Ownership rule toggles
    #[serde(default)]
    pub rules: RulesConfig,

    /// Tasks collection settings
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Document store locations
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Toggles for the fuzzy ownership rules that are known to misfire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// User name contains the field value (opt-in)
    #[serde(default)]
    pub name_contains_value: bool,

    /// Email prefix contains the field value
    #[serde(default = "default_true")]
    pub value_in_email_prefix: bool,

    /// Literal "nancy" exception
    #[serde(default = "default_true")]
    pub nancy_exception: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = RuleSet::default();
        Self {
            name_contains_value: rules.name_contains_value,
            value_in_email_prefix: rules.value_in_email_prefix,
            nancy_exception: rules.nancy_exception,
        }
    }
}

impl RulesConfig {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            name_contains_value: self.name_contains_value,
            value_in_email_prefix: self.value_in_email_prefix,
            nancy_exception: self.nancy_exception,
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Document-store collection holding tasks
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Status value that marks a task finished
    #[serde(default = "default_completed_status")]
    pub completed_status: String,
}

fn default_collection() -> String {
    "tasks".to_string()
}

fn default_completed_status() -> String {
    COMPLETED_STATUS.to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            completed_status: default_completed_status(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of `<collection>.json` files
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    /// JSON-lines audit log
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(STATE_DIR).join("store")
}

fn default_audit_log() -> PathBuf {
    PathBuf::from(STATE_DIR).join("audit.jsonl")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            audit_log: default_audit_log(),
        }
    }
}

impl StoreConfig {
    pub fn dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.dir)
    }

    pub fn audit_log_in(&self, root: &Path) -> PathBuf {
        root.join(&self.audit_log)
    }
}

impl Config {
    /// Load configuration from a `.mytasks.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the workspace root, or return defaults when
    /// no config file exists. A present but broken file is an error.
    pub fn load_from_root(root: &Path) -> crate::error::Result<Self> {
        let config_path = root.join(CONFIG_FILENAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.tasks.collection.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.collection cannot be empty".to_string(),
            ));
        }
        if self.tasks.completed_status.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.completed_status cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
