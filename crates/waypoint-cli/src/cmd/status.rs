use crate::console::print_status;
use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, manager) = super::load_session(root)?;
    let Some(state) = manager.state() else {
        return Ok(());
    };
    if json {
        return print_json(state);
    }
    print_status(state);
    Ok(())
}
