use crate::output::print_json;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CheckpointOutput<'a> {
    checkpoint: &'a str,
    success: bool,
    current_checkpoint: &'a str,
    last_successful_checkpoint: &'a str,
}

pub fn run(root: &Path, id: &str, success: bool, json: bool) -> anyhow::Result<()> {
    let (_, mut manager) = super::load_session(root)?;
    manager.update_checkpoint(id, success)?;
    let Some(state) = manager.state() else {
        return Ok(());
    };

    if json {
        return print_json(&CheckpointOutput {
            checkpoint: id,
            success,
            current_checkpoint: &state.current_checkpoint,
            last_successful_checkpoint: &state.last_successful_checkpoint,
        });
    }
    let verdict = if success { "ok" } else { "failed" };
    println!("Checkpoint {id}: {verdict}");
    println!("Last successful: {}", state.last_successful_checkpoint);
    Ok(())
}
