//! Interactive shell: natural-language requests plus slash commands over one
//! session.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};
use std::sync::{MutexGuard, PoisonError};

use anyhow::Context as _;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use waypoint_core::classifier::Classifier;
use waypoint_core::command::{self, SlashCommand, COMMANDS};
use waypoint_core::config::Config;
use waypoint_core::diagnose::diagnose;
use waypoint_core::fs::{Filesystem, WorkspaceFs};
use waypoint_core::manager::{SharedManager, StateManager};
use waypoint_core::pipeline::{ExecutionPipeline, SimulatedExecutor};
use waypoint_core::playbook;
use waypoint_core::profile::profile_for;
use waypoint_core::responses::{is_greeting, is_thanks, ResponseKind, ResponseSource};
use waypoint_core::state::RunState;
use waypoint_core::types::{AgentMode, Toggle};

use crate::console::{self, ConsoleReporter};
use crate::watch::WorkspaceWatcher;

pub const DEFAULT_GOAL: &str = "Interactive session";

const EXIT_WORDS: &[&str] = &["exit", "quit", "sair", "q"];

// ---------------------------------------------------------------------------
// Line editor helper
// ---------------------------------------------------------------------------

/// Slash-command completion, hints and highlighting for rustyline.
#[derive(Clone)]
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = command::names().map(String::from).collect();
        commands.push("/quit".to_string());
        Self { commands }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ShellHelper {}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session {
    manager: SharedManager,
    config: Config,
    classifier: Classifier,
    responses: Box<dyn ResponseSource>,
    auto: bool,
    watcher: Option<WorkspaceWatcher>,
}

impl Session {
    /// Load the workspace session, creating it when absent. A given `goal`
    /// (and `mode`) replaces the stored one.
    pub fn start(
        root: &Path,
        config: Config,
        goal: Option<&str>,
        mode: Option<AgentMode>,
        auto: bool,
        responses: Box<dyn ResponseSource>,
    ) -> anyhow::Result<Self> {
        let mut manager = StateManager::new(root).with_history_limit(config.history_limit);
        if manager.load().is_none() {
            manager
                .create_initial_state(
                    goal.unwrap_or(DEFAULT_GOAL),
                    Some(mode.unwrap_or(config.default_mode)),
                    None,
                )
                .context("failed to create session")?;
        } else {
            if let Some(goal) = goal {
                manager.set_goal(goal)?;
            }
            if let Some(mode) = mode {
                manager.set_mode(mode)?;
            }
        }

        let watching = manager.state().is_some_and(|s| s.watch_enabled);
        let mut session = Self {
            manager: manager.into_shared(),
            config,
            classifier: Classifier::default(),
            responses,
            auto,
            watcher: None,
        };
        if watching {
            session.start_watcher();
        }
        Ok(session)
    }

    fn manager(&self) -> MutexGuard<'_, StateManager> {
        self.manager.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Process one line of input. Errors are printed, never returned.
    pub fn handle(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        if EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w)) {
            return Flow::Exit;
        }

        let result = if command::is_slash(line) {
            self.slash(line)
        } else {
            self.request(line).map(|_| Flow::Continue)
        };
        match result {
            Ok(flow) => flow,
            Err(e) => {
                println!("{} {e:#}", "error:".red());
                Flow::Continue
            }
        }
    }

    /// Print file changes seen by the watcher since the last call.
    pub fn drain_watch_events(&self) {
        let Some(watcher) = &self.watcher else {
            return;
        };
        for change in watcher.poll_events() {
            println!("  {}", format!("{}: {}", change.kind, change.path).dimmed());
        }
    }

    // -----------------------------------------------------------------------
    // Natural-language requests
    // -----------------------------------------------------------------------

    fn request(&mut self, text: &str) -> anyhow::Result<()> {
        if is_greeting(text) {
            println!("{}", self.responses.pick(ResponseKind::Greeting));
            return Ok(());
        }
        if is_thanks(text) {
            println!("{}", self.responses.pick(ResponseKind::Thanks));
            return Ok(());
        }

        let intent = self.classifier.classify(text);
        {
            let mut m = self.manager();
            m.set_mode(intent.mode)?;
            m.set_goal(&intent.goal)?;
        }
        tracing::info!(mode = %intent.mode, goal = %intent.goal, "classified request");
        println!(
            "{} {}",
            format!("[{}]", intent.mode).cyan(),
            self.responses.pick(ResponseKind::Confirmation(intent.mode))
        );

        if !self.auto {
            println!("Goal set. Auto-execution is off; use /auto on to run plans.");
            return Ok(());
        }

        println!("{}", self.responses.pick(ResponseKind::Working).dimmed());
        let next: Vec<String> = playbook::next_steps(intent.mode)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ok = self.run_pipeline(&intent.goal, &next);
        if ok {
            println!("\n{}", self.responses.pick(ResponseKind::Completion).green());
            println!("{}", self.responses.pick(ResponseKind::SuggestionIntro));
            for (i, step) in next.iter().enumerate() {
                println!("  {}. {step}", i + 1);
            }
        } else {
            println!("\nUse /diagnose for hypotheses or /resume to see where to continue.");
        }
        Ok(())
    }

    /// Holds the manager lock for the whole run.
    fn run_pipeline(&self, goal: &str, next: &[String]) -> bool {
        let mut m = self.manager();
        let dry_run = m.state().is_some_and(|s| s.dry_run);
        let fs = WorkspaceFs::new(m.workspace())
            .dry_run(dry_run)
            .ignoring(&self.config.inventory.ignore);
        if fs.is_dry_run() {
            println!("{}", "dry-run: no file is written".yellow());
        }
        let mut executor = SimulatedExecutor;
        let mut reporter = ConsoleReporter;
        ExecutionPipeline::new(&mut m, &fs, &mut executor, &mut reporter).run(
            playbook::default_criteria(goal),
            playbook::default_plan(goal),
            next,
        )
    }

    // -----------------------------------------------------------------------
    // Slash commands
    // -----------------------------------------------------------------------

    fn slash(&mut self, line: &str) -> anyhow::Result<Flow> {
        match SlashCommand::parse(line)? {
            SlashCommand::Agent(None) => {
                let mode = self.current_mode();
                let profile = profile_for(mode);
                println!("Mode: {} - {}", mode.to_string().cyan(), profile.description);
                println!("Focus: {}", profile.focus.join(", "));
                println!(
                    "Modes: {}",
                    AgentMode::all()
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            SlashCommand::Agent(Some(mode)) => {
                self.manager().set_mode(mode)?;
                println!("Mode set to {}", mode.to_string().cyan());
            }
            SlashCommand::Workspace(None) => {
                println!("Workspace: {}", self.manager().workspace().display());
            }
            SlashCommand::Workspace(Some(path)) => self.change_workspace(&path)?,
            SlashCommand::Status => self.with_state(console::print_status),
            SlashCommand::Plan => self.with_state(console::print_plan),
            SlashCommand::Resume => {
                // Pick up changes made by another writer.
                self.manager().reload();
                self.with_state(console::print_resume);
            }
            SlashCommand::DryRun(toggle) => {
                let on = self.apply_toggle(toggle, |s| s.dry_run, StateManager::set_dry_run)?;
                println!("Dry-run: {}", if on { "on" } else { "off" });
            }
            SlashCommand::Watch(toggle) => {
                let on = self.apply_toggle(toggle, |s| s.watch_enabled, StateManager::set_watch)?;
                match (on, self.watcher.is_some()) {
                    (true, false) => self.start_watcher(),
                    (false, true) => self.watcher = None,
                    _ => {}
                }
                println!("Watch: {}", if on { "on" } else { "off" });
            }
            SlashCommand::Auto(toggle) => {
                match toggle {
                    Toggle::On => self.auto = true,
                    Toggle::Off => self.auto = false,
                    Toggle::Query => {}
                }
                println!("Auto-execute: {}", if self.auto { "on" } else { "off" });
            }
            SlashCommand::Apply(_) | SlashCommand::Undo => {
                println!("{}", "Patch application is not supported.".yellow());
            }
            SlashCommand::Diagnose => {
                let error = self.manager().state().and_then(|s| s.last_error.clone());
                match error {
                    Some(error) => console::print_diagnosis(&diagnose(&error)),
                    None => println!("No recorded error."),
                }
            }
            SlashCommand::Help => print_help(),
            SlashCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn current_mode(&self) -> AgentMode {
        self.manager()
            .state()
            .map(|s| s.agent_mode)
            .unwrap_or(self.config.default_mode)
    }

    fn with_state(&self, render: impl FnOnce(&RunState)) {
        match self.manager().state() {
            Some(state) => render(state),
            None => println!("No active session."),
        }
    }

    /// Set or query a boolean session flag; returns the resulting value.
    fn apply_toggle(
        &self,
        toggle: Toggle,
        get: impl Fn(&RunState) -> bool,
        set: impl Fn(&mut StateManager, bool) -> waypoint_core::Result<()>,
    ) -> anyhow::Result<bool> {
        let mut m = self.manager();
        match toggle {
            Toggle::On => set(&mut *m, true)?,
            Toggle::Off => set(&mut *m, false)?,
            Toggle::Query => {}
        }
        Ok(m.state().is_some_and(get))
    }

    fn change_workspace(&mut self, arg: &str) -> anyhow::Result<()> {
        let target = PathBuf::from(arg);
        let resolved = self.manager().set_workspace(&target)?;
        println!("Workspace: {}", resolved.display());
        if self.watcher.is_some() {
            self.watcher = None;
            self.start_watcher();
        }
        Ok(())
    }

    fn start_watcher(&mut self) {
        match WorkspaceWatcher::start(self.manager.clone(), self.config.watch.clone()) {
            Ok(w) => self.watcher = Some(w),
            Err(e) => println!("{} could not watch workspace: {e}", "warning:".yellow()),
        }
    }
}

fn print_help() {
    println!("{}", "Commands".bold());
    for (usage, summary) in COMMANDS {
        println!("  {:<20} {summary}", usage.cyan());
    }
    println!("\nAnything else is read as a request, e.g. \"criar uma API REST\".");
    println!("exit, quit, sair or q leave the shell.");
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

pub fn run_loop(mut session: Session) -> anyhow::Result<()> {
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    {
        let m = session.manager();
        if let Some(state) = m.state() {
            println!("{}", "=== waypoint ===".bright_magenta().bold());
            println!(
                "{} | {} | {}",
                state.agent_mode.to_string().cyan(),
                state.goal,
                m.workspace().display()
            );
        }
    }
    println!("{}", "Type a request, /help for commands, or exit to leave.".bright_black());

    loop {
        session.drain_watch_events();
        match rl.readline("waypoint> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                if session.handle(&line) == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", "Bye!".bright_green());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use waypoint_core::responses::FixedResponses;

    fn session(dir: &TempDir, auto: bool) -> Session {
        Session::start(
            dir.path(),
            Config::default(),
            None,
            None,
            auto,
            Box::new(FixedResponses),
        )
        .unwrap()
    }

    fn goal(s: &Session) -> String {
        s.manager().state().unwrap().goal.clone()
    }

    #[test]
    fn start_creates_default_session() {
        let dir = TempDir::new().unwrap();
        let s = session(&dir, false);
        assert_eq!(goal(&s), DEFAULT_GOAL);
        assert_eq!(s.current_mode(), AgentMode::Implementer);
        assert!(dir.path().join(".waypoint/state.json").exists());
    }

    #[test]
    fn start_replaces_goal_of_existing_session() {
        let dir = TempDir::new().unwrap();
        drop(session(&dir, false));
        let s = Session::start(
            dir.path(),
            Config::default(),
            Some("Ship v2"),
            Some(AgentMode::Ops),
            false,
            Box::new(FixedResponses),
        )
        .unwrap();
        assert_eq!(goal(&s), "Ship v2");
        assert_eq!(s.current_mode(), AgentMode::Ops);
    }

    #[test]
    fn request_classifies_and_runs_plan() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, true);
        assert_eq!(s.handle("quero corrigir bug no login"), Flow::Continue);

        let m = s.manager();
        let state = m.state().unwrap();
        assert_eq!(state.agent_mode, AgentMode::Debugger);
        assert_eq!(state.goal, "Corrigir bug no login");
        assert_eq!(state.plan_progress(), (3, 3));
        assert_eq!(state.next_action, "Run the tests");
    }

    #[test]
    fn request_without_auto_only_classifies() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, false);
        s.handle("documentar a API");
        let m = s.manager();
        let state = m.state().unwrap();
        assert_eq!(state.agent_mode, AgentMode::Documenter);
        assert!(state.plan.is_empty());
    }

    #[test]
    fn small_talk_leaves_session_alone() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, true);
        s.handle("oi");
        s.handle("valeu!");
        assert_eq!(goal(&s), DEFAULT_GOAL);
    }

    #[test]
    fn exit_words_and_commands() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, false);
        assert_eq!(s.handle("sair"), Flow::Exit);
        assert_eq!(s.handle("Q"), Flow::Exit);
        assert_eq!(s.handle("/quit"), Flow::Exit);
        assert_eq!(s.handle("   "), Flow::Continue);
    }

    #[test]
    fn slash_commands_update_session() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, false);
        s.handle("/agent reviewer");
        s.handle("/dry-run on");
        s.handle("/auto on");
        let m = s.manager();
        let state = m.state().unwrap();
        assert_eq!(state.agent_mode, AgentMode::Reviewer);
        assert!(state.dry_run);
        drop(m);
        assert!(s.auto);
    }

    #[test]
    fn bad_commands_are_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir, false);
        assert_eq!(s.handle("/frobnicate"), Flow::Continue);
        assert_eq!(s.handle("/agent wizard"), Flow::Continue);
        assert_eq!(s.handle("/workspace /definitely/not/here"), Flow::Continue);
        assert_eq!(s.current_mode(), AgentMode::Implementer);
        assert_eq!(s.manager().workspace(), dir.path());
    }

    #[test]
    fn workspace_switch_moves_state() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let mut s = session(&dir, false);
        s.handle(&format!("/workspace {}", other.path().display()));
        assert_eq!(s.manager().workspace(), other.path().canonicalize().unwrap());
        assert!(other.path().join(".waypoint/state.json").exists());
    }

    #[test]
    fn helper_completes_slash_commands() {
        let helper = ShellHelper::new();
        assert!(helper.commands.iter().any(|c| c == "/dry-run"));
        assert!(helper.commands.iter().any(|c| c == "/quit"));
    }
}
