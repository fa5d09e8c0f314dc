use crate::console::print_resume;
use crate::output::print_json;
use serde::Serialize;
use std::path::Path;
use waypoint_core::state::ErrorRecord;
use waypoint_core::types::AgentMode;

#[derive(Serialize)]
struct ResumeOutput<'a> {
    goal: &'a str,
    agent_mode: AgentMode,
    last_successful_checkpoint: &'a str,
    next_action: &'a str,
    last_error: Option<&'a ErrorRecord>,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, manager) = super::load_session(root)?;
    let Some(state) = manager.state() else {
        return Ok(());
    };
    if json {
        return print_json(&ResumeOutput {
            goal: &state.goal,
            agent_mode: state.agent_mode,
            last_successful_checkpoint: &state.last_successful_checkpoint,
            next_action: &state.next_action,
            last_error: state.last_error.as_ref(),
        });
    }
    print_resume(state);
    Ok(())
}
