use crate::shell::{run_loop, Session};
use std::path::Path;
use waypoint_core::responses::RandomResponses;
use waypoint_core::types::AgentMode;

pub fn run(
    root: &Path,
    goal: Option<&str>,
    mode: Option<AgentMode>,
    no_auto: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root);
    let auto = config.auto_execute && !no_auto;
    let session = Session::start(root, config, goal, mode, auto, Box::new(RandomResponses))?;
    run_loop(session)
}
