//! Five-stage execution pipeline: criteria, inventory, plan, execute, close.
//!
//! The pipeline borrows the [`StateManager`] for its whole run, delegates the
//! work of each step to a [`StepExecutor`] and all output to a [`Reporter`].
//! The first failed step stops the run; whatever was persisted before the
//! failure stays persisted.

use crate::error::{Result, WaypointError};
use crate::fs::Filesystem;
use crate::manager::StateManager;
use crate::report::Reporter;
use crate::types::CommandOutcome;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Plan steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub number: u32,
    pub action: String,
    pub checkpoint: Option<String>,
    /// File the step is expected to produce or modify.
    pub file: Option<String>,
}

impl PlanStep {
    pub fn new(number: u32, action: impl Into<String>) -> Self {
        Self {
            number,
            action: action.into(),
            checkpoint: None,
            file: None,
        }
    }

    pub fn with_checkpoint(mut self, checkpoint: impl Into<String>) -> Self {
        self.checkpoint = Some(checkpoint.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// One `"<n>. <action>"` line per step, followed by the bare checkpoint id
/// when the step has one.
pub fn flatten_plan(steps: &[PlanStep]) -> Vec<String> {
    let mut lines = Vec::with_capacity(steps.len() * 2);
    for step in steps {
        lines.push(format!("{}. {}", step.number, step.action));
        if let Some(cp) = &step.checkpoint {
            lines.push(cp.clone());
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Step execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub success: bool,
    pub detail: String,
    pub modified: Vec<String>,
}

impl StepOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
            modified: Vec::new(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
            modified: Vec::new(),
        }
    }

    pub fn touching(mut self, file: impl Into<String>) -> Self {
        self.modified.push(file.into());
        self
    }
}

pub trait StepExecutor {
    /// `Ok` with `success == false` is an ordinary step failure; `Err` is an
    /// unexpected fault. The pipeline treats both as a failed step.
    fn execute(&mut self, step: &PlanStep, fs: &dyn Filesystem) -> Result<StepOutcome>;
}

/// Reports success for every step without touching disk. The step's `file`
/// is reported as modified.
#[derive(Debug, Default)]
pub struct SimulatedExecutor;

impl StepExecutor for SimulatedExecutor {
    fn execute(&mut self, step: &PlanStep, _fs: &dyn Filesystem) -> Result<StepOutcome> {
        let outcome = StepOutcome::ok(format!("simulated: {}", step.action));
        Ok(match &step.file {
            Some(file) => outcome.touching(file.clone()),
            None => outcome,
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub folders: usize,
    pub files: usize,
}

pub struct ExecutionPipeline<'a> {
    manager: &'a mut StateManager,
    fs: &'a dyn Filesystem,
    executor: &'a mut dyn StepExecutor,
    reporter: &'a mut dyn Reporter,
    criteria: Vec<String>,
    steps: Vec<PlanStep>,
    modified: Vec<String>,
}

impl<'a> ExecutionPipeline<'a> {
    pub fn new(
        manager: &'a mut StateManager,
        fs: &'a dyn Filesystem,
        executor: &'a mut dyn StepExecutor,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            manager,
            fs,
            executor,
            reporter,
            criteria: Vec::new(),
            steps: Vec::new(),
            modified: Vec::new(),
        }
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn modified(&self) -> &[String] {
        &self.modified
    }

    /// Stage A. Criteria live only in the pipeline.
    pub fn define_criteria(&mut self, criteria: Vec<String>) {
        self.reporter.stage("A - Success criteria");
        for (i, c) in criteria.iter().enumerate() {
            self.reporter.info(&format!("{}. {c}", i + 1));
        }
        self.criteria = criteria;
    }

    /// Stage B. Counts folders and files under the workspace.
    pub fn inventory(&mut self) -> Result<Inventory> {
        self.reporter.stage("B - Workspace inventory");
        let root = self.manager.workspace().to_path_buf();
        let entries = self.fs.list(&root, true)?;
        let folders = entries.iter().filter(|p| self.fs.is_dir(p)).count();
        let inventory = Inventory {
            folders,
            files: entries.len() - folders,
        };
        self.reporter.info(&format!("folders: {}", inventory.folders));
        self.reporter.info(&format!("files: {}", inventory.files));
        tracing::debug!(folders = inventory.folders, files = inventory.files, "inventory");
        self.manager.set_next_action("Create an execution plan")?;
        Ok(inventory)
    }

    /// Stage C.
    pub fn create_plan(&mut self, steps: Vec<PlanStep>) -> Result<()> {
        self.reporter.stage("C - Plan");
        self.manager.set_plan(flatten_plan(&steps))?;
        for step in &steps {
            match &step.checkpoint {
                Some(cp) => self
                    .reporter
                    .info(&format!("{}. {} (checkpoint {cp})", step.number, step.action)),
                None => self.reporter.info(&format!("{}. {}", step.number, step.action)),
            }
        }
        self.steps = steps;
        Ok(())
    }

    /// Stage D for a single step. Returns whether the step succeeded; a
    /// failure is recorded as the session's last error.
    pub fn execute_step(&mut self, step: &PlanStep) -> Result<bool> {
        self.reporter
            .stage(&format!("D - Step {}: {}", step.number, step.action));
        self.manager.set_plan_step(step.number)?;

        let outcome = match self.executor.execute(step, self.fs) {
            Ok(outcome) => outcome,
            Err(e) => StepOutcome::failed(e.to_string()),
        };
        self.manager.add_command(
            &format!("step {}: {}", step.number, step.action),
            CommandOutcome::from_success(outcome.success),
            &outcome.detail,
        )?;

        if let Some(cp) = &step.checkpoint {
            self.manager.update_checkpoint(cp, outcome.success)?;
        }

        if outcome.success {
            self.reporter.info(&outcome.detail);
            if let Some(cp) = &step.checkpoint {
                self.reporter.success(&format!("checkpoint saved: {cp}"));
            }
            self.modified.extend(outcome.modified);
            Ok(true)
        } else {
            let location = format!("step {}", step.number);
            self.manager.set_error(&location, &step.action, &outcome.detail)?;
            self.reporter.error(&format!("{location} failed: {}", outcome.detail));
            tracing::warn!(step = step.number, detail = %outcome.detail, "step failed");
            Ok(false)
        }
    }

    /// Stage D over the whole plan, stopping at the first failure.
    pub fn execute_all(&mut self) -> Result<()> {
        let steps = self.steps.clone();
        for step in &steps {
            if !self.execute_step(step)? {
                return Err(WaypointError::StepFailed {
                    step: step.number,
                    reason: step.action.clone(),
                });
            }
        }
        Ok(())
    }

    /// Stage E.
    pub fn close(&mut self, next_steps: &[String]) -> Result<()> {
        self.reporter.stage("E - Close");
        if self.fs.is_dry_run() {
            if !self.modified.is_empty() {
                self.reporter.warning(&format!(
                    "dry-run: {} file(s) not recorded as touched",
                    self.modified.len()
                ));
            }
        } else {
            for file in &self.modified {
                self.manager.add_file_touched(file)?;
            }
        }
        if let Some(first) = next_steps.first() {
            self.manager.set_next_action(first)?;
        }
        if !self.modified.is_empty() {
            self.reporter.info("files modified:");
            for file in &self.modified {
                self.reporter.info(&format!("  {file}"));
            }
        }
        self.reporter.success("execution complete");
        Ok(())
    }

    /// Drive all five stages. Any error is reported and turned into `false`.
    pub fn run(
        &mut self,
        criteria: Vec<String>,
        steps: Vec<PlanStep>,
        next_steps: &[String],
    ) -> bool {
        match self.try_run(criteria, steps, next_steps) {
            Ok(()) => true,
            Err(e) => {
                self.reporter.error(&format!("pipeline stopped: {e}"));
                false
            }
        }
    }

    fn try_run(
        &mut self,
        criteria: Vec<String>,
        steps: Vec<PlanStep>,
        next_steps: &[String],
    ) -> Result<()> {
        if self.manager.state().is_none() {
            return Err(WaypointError::NoState);
        }
        self.define_criteria(criteria);
        self.inventory()?;
        self.create_plan(steps)?;
        self.execute_all()?;
        self.close(next_steps)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
