use crate::console::print_plan;
use crate::output::print_json;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct PlanOutput<'a> {
    goal: &'a str,
    plan: &'a [String],
    checkpoints: &'a BTreeMap<String, bool>,
    current_plan_step: u32,
    done: usize,
    total: usize,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, manager) = super::load_session(root)?;
    let Some(state) = manager.state() else {
        return Ok(());
    };
    if json {
        let (done, total) = state.plan_progress();
        return print_json(&PlanOutput {
            goal: &state.goal,
            plan: &state.plan,
            checkpoints: &state.checkpoints,
            current_plan_step: state.current_plan_step,
            done,
            total,
        });
    }
    print_plan(state);
    Ok(())
}
