//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rowtree/rowtree.toml`
//! 3. Local config: `<project_dir>/.rowtree.toml`
//! 4. Environment variables: `ROWTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DanglingPolicy, RecordKey, RecordSchema};

/// Root sentinel as written in TOML, env vars or on the command line.
///
/// The string `"null"` means "no sentinel": only entities without a parent
/// (or with a `null` parent) are roots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RootValue {
    Int(i64),
    Text(String),
}

impl RootValue {
    pub const NONE: &'static str = "null";

    /// Integers win over strings: `"0"` becomes `Int(0)`.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => RootValue::Int(n),
            Err(_) => RootValue::Text(s.to_string()),
        }
    }

    pub fn none() -> Self {
        RootValue::Text(Self::NONE.to_string())
    }

    pub fn to_key(&self) -> Option<RecordKey> {
        match self {
            RootValue::Int(n) => Some(RecordKey::from(*n)),
            RootValue::Text(s) if s == Self::NONE => None,
            RootValue::Text(s) => Some(RecordKey::from(s.as_str())),
        }
    }
}

impl fmt::Display for RootValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootValue::Int(n) => write!(f, "{n}"),
            RootValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Raw settings for intermediate parsing (every field optional).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub id_field: Option<String>,
    pub parent_field: Option<String>,
    pub children_field: Option<String>,
    pub root: Option<RootValue>,
    pub on_dangling: Option<DanglingPolicy>,
    pub label_field: Option<String>,
    pub pretty: Option<bool>,
}

/// Unified configuration for rowtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Field holding the entity id (default: "id")
    pub id_field: String,
    /// Field holding the parent reference (default: "parentId")
    pub parent_field: String,
    /// Synthetic field carrying child nodes (default: "children")
    pub children_field: String,
    /// Parent value marking a root (default: 0)
    pub root: RootValue,
    /// Handling of unresolvable parent references (default: reject)
    pub on_dangling: DanglingPolicy,
    /// Field used to label nodes in `show` (default: "name")
    pub label_field: String,
    /// Pretty-print JSON output (default: true)
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id_field: "id".into(),
            parent_field: "parentId".into(),
            children_field: "children".into(),
            root: RootValue::Int(0),
            on_dangling: DanglingPolicy::Reject,
            label_field: "name".into(),
            pretty: true,
        }
    }
}

/// Get the XDG config directory for rowtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rowtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rowtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".rowtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Field names as understood by the record adapter.
    pub fn schema(&self) -> RecordSchema {
        RecordSchema {
            id_field: self.id_field.clone(),
            parent_field: self.parent_field.clone(),
            children_field: self.children_field.clone(),
        }
    }

    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            id_field: overlay
                .id_field
                .clone()
                .unwrap_or_else(|| self.id_field.clone()),
            parent_field: overlay
                .parent_field
                .clone()
                .unwrap_or_else(|| self.parent_field.clone()),
            children_field: overlay
                .children_field
                .clone()
                .unwrap_or_else(|| self.children_field.clone()),
            root: overlay.root.clone().unwrap_or_else(|| self.root.clone()),
            on_dangling: overlay.on_dangling.unwrap_or(self.on_dangling),
            label_field: overlay
                .label_field
                .clone()
                .unwrap_or_else(|| self.label_field.clone()),
            pretty: overlay.pretty.unwrap_or(self.pretty),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.rowtree.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = project_dir.map(local_config_path).filter(|p| p.exists());
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Layer explicit config files over the defaults, then apply env vars.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        for path in [global, local].into_iter().flatten() {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply ROWTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("ROWTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("id_field") {
            settings.id_field = val;
        }
        if let Ok(val) = config.get_string("parent_field") {
            settings.parent_field = val;
        }
        if let Ok(val) = config.get_string("children_field") {
            settings.children_field = val;
        }
        if let Ok(val) = config.get_string("root") {
            settings.root = RootValue::parse(&val);
        }
        if let Ok(val) = config.get_string("on_dangling") {
            settings.on_dangling = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("label_field") {
            settings.label_field = val;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rowtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rowtree/rowtree.toml
#   Local:  <project_dir>/.rowtree.toml
#   Env:    ROWTREE_* environment variables (explicit overrides)

# Field holding each record's id
# id_field = "id"

# Field holding the parent reference
# parent_field = "parentId"

# Synthetic field carrying nested children in tree documents
# children_field = "children"

# Parent value marking a root record; "null" disables the sentinel so only
# records with a missing or null parent are roots
# root = 0

# Unresolvable parent references: "reject" (error) or "drop" (omit subtree)
# on_dangling = "reject"

# Field used to label nodes in `rowtree show`
# label_field = "name"

# Pretty-print JSON output
# pretty = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
