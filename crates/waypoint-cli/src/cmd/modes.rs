use crate::console::print_modes;
use crate::output::print_json;
use waypoint_core::profile::all_profiles;

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&all_profiles());
    }
    print_modes();
    Ok(())
}
