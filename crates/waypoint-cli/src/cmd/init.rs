use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use waypoint_core::paths;
use waypoint_core::types::AgentMode;

pub fn run(root: &Path, goal: &str, mode: Option<AgentMode>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root);
    if !paths::config_path(root).exists() {
        config.save(root).context("failed to write default config")?;
    }

    let mut manager = super::open_manager(root, &config);
    let state = manager
        .create_initial_state(goal, Some(mode.unwrap_or(config.default_mode)), None)
        .context("failed to create session")?;

    if json {
        return print_json(state);
    }
    println!("Session started: {} [{}]", state.goal, state.agent_mode);
    println!("State: {}", paths::state_path(root).display());
    Ok(())
}
