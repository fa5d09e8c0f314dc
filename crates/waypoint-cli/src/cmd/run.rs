use crate::console::ConsoleReporter;
use crate::output::print_json;
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use waypoint_core::classifier::{Classifier, Intent};
use waypoint_core::fs::{Filesystem, WorkspaceFs};
use waypoint_core::pipeline::{ExecutionPipeline, SimulatedExecutor};
use waypoint_core::playbook;
use waypoint_core::report::{RecordingReporter, Reporter};

#[derive(Serialize)]
struct RunOutput {
    #[serde(flatten)]
    intent: Intent,
    executed: bool,
    success: bool,
    log: Vec<String>,
}

/// Classify `text`, point the session at it and, with `auto`, run the default
/// plan. Creates the session when there is none.
pub fn run(root: &Path, text: &str, auto: bool, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root);
    let mut manager = super::open_manager(root, &config);
    let intent = Classifier::default().classify(text);

    if manager.try_load().context("failed to load session")?.is_none() {
        manager.create_initial_state(&intent.goal, Some(intent.mode), None)?;
    } else {
        manager.set_mode(intent.mode)?;
        manager.set_goal(&intent.goal)?;
    }

    if !auto {
        if json {
            return print_json(&RunOutput {
                intent,
                executed: false,
                success: true,
                log: Vec::new(),
            });
        }
        println!("{}: {}", intent.mode, intent.goal);
        return Ok(());
    }

    let dry_run = manager.state().is_some_and(|s| s.dry_run);
    let fs = WorkspaceFs::new(root)
        .dry_run(dry_run)
        .ignoring(&config.inventory.ignore);
    let next: Vec<String> = playbook::next_steps(intent.mode)
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut executor = SimulatedExecutor;
    let mut recorder = RecordingReporter::new();
    let mut console = ConsoleReporter;
    let reporter: &mut dyn Reporter = if json { &mut recorder } else { &mut console };

    if !json {
        println!("{}: {}", intent.mode, intent.goal);
        if fs.is_dry_run() {
            println!("dry-run: no file is written");
        }
    }
    let success = ExecutionPipeline::new(&mut manager, &fs, &mut executor, reporter).run(
        playbook::default_criteria(&intent.goal),
        playbook::default_plan(&intent.goal),
        &next,
    );

    if json {
        print_json(&RunOutput {
            intent,
            executed: true,
            success,
            log: recorder.lines.into_iter().map(|(_, line)| line).collect(),
        })?;
    }
    if !success {
        anyhow::bail!("pipeline failed; run 'waypoint diagnose' for hypotheses");
    }
    Ok(())
}
