pub mod checkpoint;
pub mod classify;
pub mod diagnose;
pub mod init;
pub mod modes;
pub mod plan;
pub mod resume;
pub mod run;
pub mod shell;
pub mod status;

use anyhow::Context;
use std::path::Path;
use waypoint_core::config::{Config, WarnLevel};
use waypoint_core::manager::StateManager;
use waypoint_core::WaypointError;

/// Load the workspace config, logging validation findings.
pub fn load_config(root: &Path) -> Config {
    let config = Config::load_or_default(root);
    for w in config.validate() {
        match w.level {
            WarnLevel::Error => tracing::error!("config: {}", w.message),
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
        }
    }
    config
}

pub fn open_manager(root: &Path, config: &Config) -> StateManager {
    StateManager::new(root).with_history_limit(config.history_limit)
}

/// Config plus a manager with the session loaded. A missing session is an
/// error here, as is a corrupted state file.
pub fn load_session(root: &Path) -> anyhow::Result<(Config, StateManager)> {
    let config = load_config(root);
    let mut manager = open_manager(root, &config);
    if manager
        .try_load()
        .context("failed to load session")?
        .is_none()
    {
        return Err(WaypointError::NoState.into());
    }
    Ok((config, manager))
}
