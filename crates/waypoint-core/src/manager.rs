//! The state manager: sole reader and writer of `.waypoint/state.json`.
//!
//! Every mutation persists immediately. The file on disk is the authority and
//! "last writer wins": there is no locking and no merge. A manager caches the
//! state it last loaded or saved and never refreshes it on its own; call
//! [`StateManager::reload`] to pick up another writer's changes. Run one
//! writer per workspace at a time.
//!
//! Inside one process, share a manager across threads as a [`SharedManager`]
//! and hold the lock for the duration of each operation.

use crate::error::{Result, WaypointError};
use crate::paths;
use crate::state::RunState;
use crate::types::{AgentMode, CommandOutcome};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const DEFAULT_HISTORY_LIMIT: usize = 200;

pub type SharedManager = Arc<Mutex<StateManager>>;

#[derive(Debug)]
pub struct StateManager {
    workspace: PathBuf,
    state: Option<RunState>,
    history_limit: usize,
}

impl StateManager {
    /// Bind a manager to `workspace`. A relative path is made absolute against
    /// the current directory.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        Self {
            workspace: std::path::absolute(&workspace).unwrap_or(workspace),
            state: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn into_shared(self) -> SharedManager {
        Arc::new(Mutex::new(self))
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn state_file(&self) -> PathBuf {
        paths::state_path(&self.workspace)
    }

    pub fn state(&self) -> Option<&RunState> {
        self.state.as_ref()
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Read the state file. `Ok(None)` when it does not exist; an error when it
    /// exists but cannot be parsed. Does not touch the cached state.
    pub fn read(&self) -> Result<Option<RunState>> {
        let path = self.state_file();
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let state: RunState =
            serde_json::from_str(&data).map_err(|e| WaypointError::MalformedState {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Some(state))
    }

    /// Load the session into the cache. A missing file means "no prior
    /// session". A corrupted or empty file is logged and also yields `None`;
    /// it never reaches the caller as an error. Either way the cache follows
    /// the file.
    pub fn load(&mut self) -> Option<&RunState> {
        if let Err(e) = self.try_load() {
            tracing::warn!("could not load session state: {e}");
            self.state = None;
            return None;
        }
        self.state.as_ref()
    }

    /// Like [`StateManager::load`] but a corrupted file is returned as an error.
    /// A missing file clears the cache.
    pub fn try_load(&mut self) -> Result<Option<&RunState>> {
        self.state = self.read()?;
        if self.state.is_some() {
            tracing::debug!(path = %self.state_file().display(), "loaded session state");
        }
        Ok(self.state.as_ref())
    }

    /// Drop the cached state and read the file again.
    pub fn reload(&mut self) -> Option<&RunState> {
        self.state = None;
        self.load()
    }

    /// Persist the cached state. Fails with [`WaypointError::NoState`] when no
    /// state has been created or loaded.
    pub fn save(&self) -> Result<()> {
        let state = self.state.as_ref().ok_or(WaypointError::NoState)?;
        self.write(state)
    }

    /// Adopt `state` as the cached state and persist it.
    pub fn save_state(&mut self, state: RunState) -> Result<()> {
        self.write(&state)?;
        self.state = Some(state);
        Ok(())
    }

    fn write(&self, state: &RunState) -> Result<()> {
        let path = self.state_file();
        let data = serde_json::to_string_pretty(state)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        tracing::debug!(path = %path.display(), "saved session state");
        Ok(())
    }

    /// Start a fresh session, replacing any existing file.
    pub fn create_initial_state(
        &mut self,
        goal: &str,
        mode: Option<AgentMode>,
        workspace: Option<&str>,
    ) -> Result<&RunState> {
        let workspace = workspace
            .map(str::to_string)
            .unwrap_or_else(|| self.workspace.to_string_lossy().into_owned());
        let state = RunState::new(workspace, mode.unwrap_or_default(), goal);
        self.save_state(state)?;
        self.state.as_ref().ok_or(WaypointError::NoState)
    }

    // ---------------------------------------------------------------------------
    // Mutations
    //
    // Each is a no-op returning Ok(()) when no state is loaded.
    // ---------------------------------------------------------------------------

    fn mutate(&mut self, f: impl FnOnce(&mut RunState) -> bool) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        if f(state) {
            self.save()?;
        }
        Ok(())
    }

    pub fn update_checkpoint(&mut self, checkpoint: &str, success: bool) -> Result<()> {
        self.mutate(|s| {
            s.record_checkpoint(checkpoint, success);
            true
        })
    }

    pub fn set_error(&mut self, location: &str, message: &str, log_excerpt: &str) -> Result<()> {
        self.mutate(|s| {
            s.set_error(location, message, log_excerpt);
            true
        })
    }

    pub fn clear_error(&mut self) -> Result<()> {
        self.mutate(|s| {
            s.clear_error();
            true
        })
    }

    /// Persists only when the path is new.
    pub fn add_file_touched(&mut self, path: &str) -> Result<()> {
        self.mutate(|s| s.add_file_touched(path))
    }

    pub fn add_command(&mut self, cmd: &str, result: CommandOutcome, output: &str) -> Result<()> {
        let limit = self.history_limit;
        self.mutate(|s| {
            s.record_command(cmd, result, output, limit);
            true
        })
    }

    pub fn set_mode(&mut self, mode: AgentMode) -> Result<()> {
        self.mutate(|s| {
            s.agent_mode = mode;
            true
        })
    }

    pub fn set_goal(&mut self, goal: &str) -> Result<()> {
        self.mutate(|s| {
            s.goal = goal.to_string();
            true
        })
    }

    pub fn set_next_action(&mut self, next_action: &str) -> Result<()> {
        self.mutate(|s| {
            s.next_action = next_action.to_string();
            true
        })
    }

    pub fn set_plan(&mut self, plan: Vec<String>) -> Result<()> {
        self.mutate(|s| {
            s.plan = plan;
            s.current_plan_step = 0;
            true
        })
    }

    pub fn set_plan_step(&mut self, step: u32) -> Result<()> {
        self.mutate(|s| {
            s.current_plan_step = step;
            true
        })
    }

    pub fn set_dry_run(&mut self, on: bool) -> Result<()> {
        self.mutate(|s| {
            s.dry_run = on;
            true
        })
    }

    pub fn set_watch(&mut self, on: bool) -> Result<()> {
        self.mutate(|s| {
            s.watch_enabled = on;
            true
        })
    }

    pub fn add_open_question(&mut self, question: &str) -> Result<()> {
        self.mutate(|s| s.add_open_question(question))
    }

    pub fn resolve_open_question(&mut self, question: &str) -> Result<()> {
        self.mutate(|s| s.resolve_open_question(question))
    }

    /// Point the session at another directory. The target must exist and be a
    /// directory; the manager is rebound and the state is saved under the new
    /// workspace.
    pub fn set_workspace(&mut self, target: &Path) -> Result<PathBuf> {
        if !target.exists() {
            return Err(WaypointError::WorkspaceNotFound(target.to_path_buf()));
        }
        if !target.is_dir() {
            return Err(WaypointError::NotADirectory(target.to_path_buf()));
        }
        let resolved = target.canonicalize()?;
        self.workspace = resolved.clone();
        self.mutate(|s| {
            s.workspace = resolved.to_string_lossy().into_owned();
            true
        })?;
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{INITIAL_CHECKPOINT, MAX_COMMAND_OUTPUT, MAX_LOG_EXCERPT};
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> StateManager {
        StateManager::new(dir.path())
    }

    #[test]
    fn create_initial_state_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        let state = m.create_initial_state("Teste", None, None).unwrap();
        assert_eq!(state.goal, "Teste");
        assert_eq!(state.agent_mode, AgentMode::Implementer);
        assert_eq!(state.workspace, dir.path().to_string_lossy());
        assert!(dir.path().join(".waypoint").is_dir());
        assert!(dir.path().join(".waypoint/state.json").exists());
    }

    #[test]
    fn create_initial_state_with_explicit_mode_and_workspace() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        let state = m
            .create_initial_state("Teste", Some(AgentMode::Debugger), Some("/custom/path"))
            .unwrap();
        assert_eq!(state.agent_mode, AgentMode::Debugger);
        assert_eq!(state.workspace, "/custom/path");
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        assert!(m.load().is_none());
        assert!(m.state().is_none());
    }

    #[test]
    fn load_corrupted_file_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".waypoint")).unwrap();
        std::fs::write(dir.path().join(".waypoint/state.json"), "{ invalid json").unwrap();
        let mut m = manager(&dir);
        assert!(m.load().is_none());
        assert!(matches!(m.read(), Err(WaypointError::MalformedState { .. })));
    }

    #[test]
    fn try_load_surfaces_corruption() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".waypoint")).unwrap();
        std::fs::write(dir.path().join(".waypoint/state.json"), "[1, 2").unwrap();
        let mut m = manager(&dir);
        assert!(matches!(
            m.try_load(),
            Err(WaypointError::MalformedState { .. })
        ));
        assert!(m.state().is_none());
    }

    #[test]
    fn load_after_external_delete_is_none() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        std::fs::remove_file(m.state_file()).unwrap();

        assert!(m.load().is_none());
        assert!(m.state().is_none());
        m.set_goal("revived").unwrap();
        assert!(!m.state_file().exists());
    }

    #[test]
    fn load_after_external_corruption_clears_cache() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        std::fs::write(m.state_file(), "{ broken").unwrap();

        assert!(m.load().is_none());
        assert!(m.state().is_none());
        m.set_goal("revived").unwrap();
        assert_eq!(std::fs::read_to_string(m.state_file()).unwrap(), "{ broken");
    }

    #[test]
    fn relative_workspace_is_stored_absolute() {
        let m = StateManager::new("some/relative/dir");
        assert!(m.workspace().is_absolute());
        assert!(m.workspace().ends_with("some/relative/dir"));
    }

    #[test]
    fn open_questions_persist() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        m.add_open_question("Which database?").unwrap();
        m.add_open_question("Which database?").unwrap();
        m.add_open_question("Auth provider?").unwrap();
        let s = manager(&dir).reload().cloned().unwrap();
        assert_eq!(s.open_questions, vec!["Which database?", "Auth provider?"]);

        m.resolve_open_question("Which database?").unwrap();
        let s = manager(&dir).reload().cloned().unwrap();
        assert_eq!(s.open_questions, vec!["Auth provider?"]);
    }

    #[test]
    fn load_empty_file_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".waypoint")).unwrap();
        std::fs::write(dir.path().join(".waypoint/state.json"), "").unwrap();
        assert!(manager(&dir).load().is_none());
    }

    #[test]
    fn save_without_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(manager(&dir).save(), Err(WaypointError::NoState)));
    }

    #[test]
    fn mutations_without_state_are_noops() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.update_checkpoint("CP1:x", true).unwrap();
        m.set_error("here", "boom", "").unwrap();
        m.clear_error().unwrap();
        m.add_file_touched("a.rs").unwrap();
        m.add_command("ls", CommandOutcome::Ok, "").unwrap();
        assert!(!dir.path().join(".waypoint/state.json").exists());
    }

    #[test]
    fn roundtrip_reproduces_every_field() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        let mut state = m
            .create_initial_state("Construir módulo de autenticação 🔐", Some(AgentMode::Ops), None)
            .unwrap()
            .clone();
        state.files_touched = (0..100).map(|i| format!("src/file_{i}.rs")).collect();
        state.open_questions = Vec::new();
        state.plan = vec!["1. Preparar".into(), "CP1:prepare".into()];
        state.current_plan_step = 1;
        state.dry_run = true;
        state.record_checkpoint("CP1:prepare", true);
        state.record_command("cargo test", CommandOutcome::Ok, "all green", 0);
        state.set_error("build", "linker failed", "ld: cannot find -lfoo");
        m.save_state(state.clone()).unwrap();

        let mut fresh = manager(&dir);
        let loaded = fresh.load().unwrap();
        assert_eq!(*loaded, state);
    }

    #[test]
    fn state_file_is_pretty_and_keeps_unicode_literal() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("Documentação", None, None).unwrap();
        let raw = std::fs::read_to_string(m.state_file()).unwrap();
        assert!(raw.contains("Documentação"));
        assert!(raw.contains("\n  \"workspace\""));
    }

    #[test]
    fn scenario_checkpoint_advances() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        let state = m
            .create_initial_state("Build a REST API", Some(AgentMode::Architect), None)
            .unwrap();
        assert_eq!(state.current_checkpoint, INITIAL_CHECKPOINT);

        m.update_checkpoint("CP1:structure", true).unwrap();
        let s = m.state().unwrap();
        assert_eq!(s.current_checkpoint, "CP1:structure");
        assert_eq!(s.last_successful_checkpoint, "CP1:structure");
        assert_eq!(s.checkpoints.get("CP1:structure"), Some(&true));
    }

    #[test]
    fn last_success_tracks_latest_successful_call() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        let calls = [
            ("CP1:a", true),
            ("CP2:b", false),
            ("CP3:c", true),
            ("CP4:d", false),
            ("CP5:e", false),
        ];
        for (cp, ok) in calls {
            m.update_checkpoint(cp, ok).unwrap();
        }
        let s = manager(&dir).reload().cloned().unwrap();
        assert_eq!(s.last_successful_checkpoint, "CP3:c");
        assert_eq!(s.current_checkpoint, "CP5:e");
    }

    #[test]
    fn add_file_touched_twice_keeps_one_entry() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        m.add_file_touched("src/auth.py").unwrap();
        m.add_file_touched("src/auth.py").unwrap();
        let s = manager(&dir).reload().cloned().unwrap();
        assert_eq!(s.files_touched, vec!["src/auth.py"]);
    }

    #[test]
    fn add_command_truncates_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        let out = "z".repeat(900);
        m.add_command("make", CommandOutcome::Fail, &out).unwrap();
        let s = manager(&dir).reload().cloned().unwrap();
        assert_eq!(s.commands_run.len(), 1);
        assert_eq!(s.commands_run[0].output, out[..MAX_COMMAND_OUTPUT]);
    }

    #[test]
    fn history_limit_is_applied() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir).with_history_limit(3);
        m.create_initial_state("g", None, None).unwrap();
        for i in 0..5 {
            m.add_command(&format!("c{i}"), CommandOutcome::Ok, "").unwrap();
        }
        let cmds: Vec<&str> = m
            .state()
            .unwrap()
            .commands_run
            .iter()
            .map(|c| c.cmd.as_str())
            .collect();
        assert_eq!(cmds, vec!["c2", "c3", "c4"]);
    }

    #[test]
    fn set_and_clear_error() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        m.set_error("tests", "2 failed", &"L".repeat(2000)).unwrap();
        let s = manager(&dir).reload().cloned().unwrap();
        let err = s.last_error.unwrap();
        assert_eq!(err.location, "tests");
        assert_eq!(err.log_excerpt, "L".repeat(MAX_LOG_EXCERPT));

        m.clear_error().unwrap();
        let s = manager(&dir).reload().cloned().unwrap();
        assert!(s.last_error.is_none());
    }

    #[test]
    fn cached_state_is_not_refreshed_until_reload() {
        let dir = TempDir::new().unwrap();
        let mut a = manager(&dir);
        a.create_initial_state("first", None, None).unwrap();
        let mut b = manager(&dir);
        b.load().unwrap();

        a.set_goal("second").unwrap();
        assert_eq!(b.state().unwrap().goal, "first");
        assert_eq!(b.reload().unwrap().goal, "second");
    }

    #[test]
    fn set_workspace_validates_target() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();

        let missing = dir.path().join("nope");
        assert!(matches!(
            m.set_workspace(&missing),
            Err(WaypointError::WorkspaceNotFound(_))
        ));

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            m.set_workspace(&file),
            Err(WaypointError::NotADirectory(_))
        ));

        let other = TempDir::new().unwrap();
        let resolved = m.set_workspace(other.path()).unwrap();
        assert_eq!(m.workspace(), resolved.as_path());
        assert!(other.path().join(".waypoint/state.json").exists());
        assert_eq!(m.state().unwrap().workspace, resolved.to_string_lossy());
    }

    #[test]
    fn toggles_and_plan_persist() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir);
        m.create_initial_state("g", None, None).unwrap();
        m.set_dry_run(true).unwrap();
        m.set_watch(true).unwrap();
        m.set_mode(AgentMode::Reviewer).unwrap();
        m.set_plan(vec!["1. a".into(), "CP1:a".into()]).unwrap();
        m.set_plan_step(1).unwrap();
        m.set_next_action("Run tests").unwrap();

        let s = manager(&dir).reload().cloned().unwrap();
        assert!(s.dry_run && s.watch_enabled);
        assert_eq!(s.agent_mode, AgentMode::Reviewer);
        assert_eq!(s.plan.len(), 2);
        assert_eq!(s.current_plan_step, 1);
        assert_eq!(s.next_action, "Run tests");
    }
}
