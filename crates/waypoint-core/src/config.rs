use crate::error::Result;
use crate::manager::DEFAULT_HISTORY_LIMIT;
use crate::paths;
use crate::types::AgentMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// InventoryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Directory names skipped while walking the workspace. Hidden entries are
    /// always skipped.
    #[serde(default = "default_inventory_ignore")]
    pub ignore: Vec<String>,
}

fn default_inventory_ignore() -> Vec<String> {
    ["node_modules", "__pycache__", "target"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            ignore: default_inventory_ignore(),
        }
    }
}

// ---------------------------------------------------------------------------
// WatchConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Path fragments; an event is dropped when any path component contains one.
    #[serde(default = "default_watch_ignore")]
    pub ignore: Vec<String>,
}

fn default_watch_ignore() -> Vec<String> {
    [
        ".git",
        "__pycache__",
        ".pyc",
        paths::APP_DIR,
        "node_modules",
        ".venv",
        "venv",
        "target",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ignore: default_watch_ignore(),
        }
    }
}

impl WatchConfig {
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.components().any(|c| {
            let part = c.as_os_str().to_string_lossy();
            self.ignore.iter().any(|pat| part.contains(pat.as_str()))
        })
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub default_mode: AgentMode,
    /// Run the pipeline right after classifying natural-language input.
    #[serde(default = "default_auto_execute")]
    pub auto_execute: bool,
    /// Command-history entries kept in the state file; 0 keeps everything.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

fn default_version() -> u32 {
    1
}

fn default_auto_execute() -> bool {
    true
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_mode: AgentMode::default(),
            auto_execute: default_auto_execute(),
            history_limit: default_history_limit(),
            inventory: InventoryConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    /// Load `.waypoint/config.yaml`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`] but falls back to the defaults on a malformed file.
    pub fn load_or_default(root: &Path) -> Self {
        Self::load(root).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed config: {e}");
            Self::default()
        })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("unsupported config version {}", self.version),
            });
        }

        if self.inventory.ignore.iter().any(|s| s.trim().is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "empty entry in inventory.ignore".to_string(),
            });
        }

        // An empty fragment is a substring of every path and would mute the watcher.
        if self.watch.ignore.iter().any(|s| s.is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "empty entry in watch.ignore ignores every event".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.default_mode, AgentMode::Implementer);
        assert!(cfg.auto_execute);
        assert_eq!(cfg.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".waypoint")).unwrap();
        std::fs::write(
            dir.path().join(".waypoint/config.yaml"),
            "default_mode: ARCHITECT\nhistory_limit: 50\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.default_mode, AgentMode::Architect);
        assert_eq!(cfg.history_limit, 50);
        assert!(cfg.inventory.ignore.contains(&"node_modules".to_string()));
    }

    #[test]
    fn malformed_file_errors_but_load_or_default_recovers() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".waypoint")).unwrap();
        std::fs::write(dir.path().join(".waypoint/config.yaml"), "default_mode: [oops").unwrap();
        assert!(Config::load(dir.path()).is_err());
        let cfg = Config::load_or_default(dir.path());
        assert_eq!(cfg.default_mode, AgentMode::Implementer);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let cfg = Config {
            auto_execute: false,
            ..Config::default()
        };
        cfg.save(dir.path()).unwrap();
        assert!(!Config::load(dir.path()).unwrap().auto_execute);
    }

    #[test]
    fn watch_ignore_matches_components() {
        let watch = WatchConfig::default();
        assert!(watch.is_ignored(Path::new("/w/.git/index")));
        assert!(watch.is_ignored(Path::new("/w/.waypoint/state.json")));
        assert!(!watch.is_ignored(Path::new("/w/src/main.rs")));
    }

    #[test]
    fn validate_flags_empty_watch_entry() {
        let mut cfg = Config::default();
        cfg.watch.ignore.push(String::new());
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
    }
}
