use crate::console::print_diagnosis;
use crate::output::print_json;
use std::path::Path;
use waypoint_core::diagnose::{diagnose, propose_fix};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, manager) = super::load_session(root)?;
    let Some(error) = manager.state().and_then(|s| s.last_error.as_ref()) else {
        if json {
            print_json(&serde_json::Value::Null)?;
        } else {
            println!("No recorded error.");
        }
        return Ok(());
    };

    let diagnosis = diagnose(error);
    if json {
        return print_json(&diagnosis);
    }
    println!("Error: {} ({})", error.message, error.location);
    print_diagnosis(&diagnosis);
    if let Some(fix) = propose_fix(&diagnosis) {
        println!("\nSuggested fix: {}", fix.fix_suggestion);
    }
    Ok(())
}
