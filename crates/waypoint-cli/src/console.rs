//! Human-readable rendering of sessions on stdout.

use crate::output::print_table;
use colored::Colorize;
use waypoint_core::diagnose::{Diagnosis, Likelihood};
use waypoint_core::profile::{all_profiles, profile_for};
use waypoint_core::report::{Level, Reporter};
use waypoint_core::state::RunState;

/// Prints pipeline output as it happens.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, level: Level, message: &str) {
        match level {
            Level::Stage => println!("\n{}", message.cyan().bold()),
            Level::Info => println!("  {message}"),
            Level::Success => println!("  {} {}", "✓".green(), message.green()),
            Level::Warning => println!("  {}", message.yellow()),
            Level::Error => println!("  {} {}", "✗".red(), message.red()),
        }
    }
}

pub fn print_status(state: &RunState) {
    let profile = profile_for(state.agent_mode);
    let (done, total) = state.plan_progress();
    println!("{}", "Session".bold());
    println!("  Workspace:   {}", state.workspace);
    println!(
        "  Mode:        {} ({})",
        state.agent_mode.to_string().cyan(),
        profile.description
    );
    println!("  Goal:        {}", state.goal);
    println!("  Checkpoint:  {}", state.current_checkpoint);
    println!("  Last good:   {}", state.last_successful_checkpoint);
    println!("  Plan:        {done}/{total} checkpoints, step {}", state.current_plan_step);
    println!("  Next action: {}", state.next_action);
    println!(
        "  Dry-run:     {}   Watch: {}",
        on_off(state.dry_run),
        on_off(state.watch_enabled)
    );

    if !state.files_touched.is_empty() {
        println!("  Files touched: {}", state.files_touched.len());
        for f in state.files_touched.iter().rev().take(5) {
            println!("    {f}");
        }
    }
    if !state.open_questions.is_empty() {
        println!("  Open questions:");
        for q in &state.open_questions {
            println!("    ? {q}");
        }
    }
    if let Some(cmd) = state.last_command() {
        println!("  Last command: {} [{}]", cmd.cmd, cmd.result);
    }
    if let Some(err) = &state.last_error {
        println!("  {} {} at {}", "Last error:".red(), err.message, err.location);
    }
}

pub fn print_plan(state: &RunState) {
    if state.plan.is_empty() {
        println!("No plan yet.");
        return;
    }
    let current = format!("{}. ", state.current_plan_step);
    println!("{} {}", "Plan for:".bold(), state.goal);
    for line in &state.plan {
        if RunState::is_checkpoint_line(line) {
            let mark = if state.is_checkpoint_done(line) {
                "[x]".green()
            } else {
                "[ ]".dimmed()
            };
            println!("     {mark} {line}");
        } else if state.current_plan_step > 0 && line.starts_with(&current) {
            println!("  {} {line}", ">".cyan().bold());
        } else {
            println!("    {line}");
        }
    }
    let (done, total) = state.plan_progress();
    println!("Progress: {done}/{total}");
}

pub fn print_resume(state: &RunState) {
    println!("{} {}", "Resuming:".bold(), state.goal);
    println!("  Last successful checkpoint: {}", state.last_successful_checkpoint);
    println!("  Next action: {}", state.next_action);
    match &state.last_error {
        Some(err) => {
            println!("  {} {} at {}", "Last error:".red(), err.message, err.location);
            println!("  Run 'waypoint diagnose' for hypotheses.");
        }
        None => println!("  No recorded error."),
    }
}

pub fn print_diagnosis(diagnosis: &Diagnosis) {
    println!("{} {}", "Diagnosis for".bold(), diagnosis.location);
    for (i, finding) in diagnosis.findings.iter().enumerate() {
        println!("  {}. {finding}", i + 1);
    }
    println!("\n{}", "Hypotheses:".bold());
    for (i, h) in diagnosis.hypotheses.iter().enumerate() {
        let tag = format!("[{}]", h.likelihood.as_str().to_uppercase());
        let tag = match h.likelihood {
            Likelihood::High => tag.red(),
            Likelihood::Medium => tag.yellow(),
            Likelihood::Low => tag.dimmed(),
        };
        println!("  {}. {tag} {}", i + 1, h.description);
        println!("     fix: {}", h.fix_suggestion);
    }
}

pub fn print_modes() {
    let rows = all_profiles()
        .iter()
        .map(|p| {
            vec![
                p.mode.to_string(),
                p.description.to_string(),
                p.focus.join(", "),
            ]
        })
        .collect();
    print_table(&["MODE", "DESCRIPTION", "FOCUS"], rows);
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}
