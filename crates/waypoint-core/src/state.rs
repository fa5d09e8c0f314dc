use crate::io::truncate_chars;
use crate::types::{AgentMode, CommandOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const INITIAL_CHECKPOINT: &str = "CP0:init";
pub const CHECKPOINT_TAG: &str = "CP";
pub const MAX_COMMAND_OUTPUT: usize = 500;
pub const MAX_LOG_EXCERPT: usize = 1000;
pub const STATE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub cmd: String,
    pub result: CommandOutcome,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub output: String,
}

/// A user-domain failure the session is tracking (a failed build step, a
/// broken test run). Not an error of this tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub when: DateTime<Utc>,
    #[serde(rename = "where")]
    pub location: String,
    pub message: String,
    #[serde(default)]
    pub log_excerpt: String,
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default = "default_version")]
    pub version: u32,
    pub workspace: String,
    pub agent_mode: AgentMode,
    pub goal: String,
    #[serde(default)]
    pub current_plan_step: u32,
    #[serde(default = "default_checkpoint")]
    pub current_checkpoint: String,
    #[serde(default = "default_checkpoint")]
    pub last_successful_checkpoint: String,
    #[serde(default)]
    pub open_questions: Vec<String>,
    #[serde(default)]
    pub files_touched: Vec<String>,
    #[serde(default)]
    pub commands_run: Vec<CommandRecord>,
    #[serde(default)]
    pub last_error: Option<ErrorRecord>,
    #[serde(default)]
    pub next_action: String,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub checkpoints: BTreeMap<String, bool>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub watch_enabled: bool,
}

fn default_version() -> u32 {
    STATE_VERSION
}

fn default_checkpoint() -> String {
    INITIAL_CHECKPOINT.to_string()
}

impl RunState {
    pub fn new(workspace: impl Into<String>, agent_mode: AgentMode, goal: impl Into<String>) -> Self {
        Self {
            version: STATE_VERSION,
            workspace: workspace.into(),
            agent_mode,
            goal: goal.into(),
            current_plan_step: 0,
            current_checkpoint: default_checkpoint(),
            last_successful_checkpoint: default_checkpoint(),
            open_questions: Vec::new(),
            files_touched: Vec::new(),
            commands_run: Vec::new(),
            last_error: None,
            next_action: "Create an execution plan".to_string(),
            plan: Vec::new(),
            checkpoints: BTreeMap::new(),
            dry_run: false,
            watch_enabled: false,
        }
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Record an attempt at `checkpoint`. Only a successful attempt moves
    /// `last_successful_checkpoint` and marks the checkpoint complete; a failed
    /// attempt never clears an earlier completion.
    pub fn record_checkpoint(&mut self, checkpoint: &str, success: bool) {
        self.current_checkpoint = checkpoint.to_string();
        if success {
            self.last_successful_checkpoint = checkpoint.to_string();
            self.checkpoints.insert(checkpoint.to_string(), true);
        }
    }

    /// Append a command to the history, keeping at most `limit` entries
    /// (oldest dropped first). A `limit` of 0 keeps everything.
    pub fn record_command(&mut self, cmd: &str, result: CommandOutcome, output: &str, limit: usize) {
        self.commands_run.push(CommandRecord {
            cmd: cmd.to_string(),
            result,
            timestamp: Utc::now(),
            output: truncate_chars(output, MAX_COMMAND_OUTPUT),
        });
        if limit > 0 && self.commands_run.len() > limit {
            let excess = self.commands_run.len() - limit;
            self.commands_run.drain(..excess);
        }
    }

    pub fn set_error(&mut self, location: &str, message: &str, log_excerpt: &str) {
        self.last_error = Some(ErrorRecord {
            when: Utc::now(),
            location: location.to_string(),
            message: message.to_string(),
            log_excerpt: truncate_chars(log_excerpt, MAX_LOG_EXCERPT),
        });
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Returns true if `path` was not already recorded.
    pub fn add_file_touched(&mut self, path: &str) -> bool {
        if self.files_touched.iter().any(|p| p == path) {
            return false;
        }
        self.files_touched.push(path.to_string());
        true
    }

    /// Returns true if the question was new.
    pub fn add_open_question(&mut self, question: &str) -> bool {
        if self.open_questions.iter().any(|q| q == question) {
            return false;
        }
        self.open_questions.push(question.to_string());
        true
    }

    /// Returns true if the question was present and has been removed.
    pub fn resolve_open_question(&mut self, question: &str) -> bool {
        let before = self.open_questions.len();
        self.open_questions.retain(|q| q != question);
        self.open_questions.len() != before
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn is_checkpoint_line(line: &str) -> bool {
        line.starts_with(CHECKPOINT_TAG)
    }

    pub fn is_checkpoint_done(&self, checkpoint: &str) -> bool {
        self.checkpoints.get(checkpoint).copied().unwrap_or(false)
    }

    /// (completed, total) over the checkpoint lines of the current plan.
    pub fn plan_progress(&self) -> (usize, usize) {
        let checkpoint_lines: Vec<&String> = self
            .plan
            .iter()
            .filter(|line| Self::is_checkpoint_line(line))
            .collect();
        let done = checkpoint_lines
            .iter()
            .filter(|line| self.is_checkpoint_done(line))
            .count();
        (done, checkpoint_lines.len())
    }

    pub fn last_command(&self) -> Option<&CommandRecord> {
        self.commands_run.last()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RunState {
        RunState::new("/tmp/proj", AgentMode::Architect, "Build a REST API")
    }

    #[test]
    fn new_state_starts_at_initial_checkpoint() {
        let s = state();
        assert_eq!(s.current_checkpoint, INITIAL_CHECKPOINT);
        assert_eq!(s.last_successful_checkpoint, INITIAL_CHECKPOINT);
        assert_eq!(s.current_plan_step, 0);
        assert!(s.files_touched.is_empty() && s.commands_run.is_empty());
        assert!(s.checkpoints.is_empty());
    }

    #[test]
    fn failed_checkpoint_does_not_advance_success() {
        let mut s = state();
        s.record_checkpoint("CP1:structure", true);
        s.record_checkpoint("CP2:impl", false);
        assert_eq!(s.current_checkpoint, "CP2:impl");
        assert_eq!(s.last_successful_checkpoint, "CP1:structure");
        assert!(s.is_checkpoint_done("CP1:structure"));
        assert!(!s.checkpoints.contains_key("CP2:impl"));
    }

    #[test]
    fn failed_retry_keeps_completion_flag() {
        let mut s = state();
        s.record_checkpoint("CP1:structure", true);
        s.record_checkpoint("CP1:structure", false);
        assert!(s.is_checkpoint_done("CP1:structure"));
    }

    #[test]
    fn file_touched_is_idempotent() {
        let mut s = state();
        assert!(s.add_file_touched("src/lib.rs"));
        assert!(!s.add_file_touched("src/lib.rs"));
        assert!(s.add_file_touched("src/main.rs"));
        assert_eq!(s.files_touched, vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn command_output_is_truncated() {
        let mut s = state();
        let long = "x".repeat(750);
        s.record_command("cargo build", CommandOutcome::Fail, &long, 0);
        let rec = s.last_command().unwrap();
        assert_eq!(rec.output.len(), MAX_COMMAND_OUTPUT);
        assert_eq!(rec.output, long[..MAX_COMMAND_OUTPUT]);
        assert_eq!(rec.result, CommandOutcome::Fail);
    }

    #[test]
    fn command_history_is_bounded() {
        let mut s = state();
        for i in 0..12 {
            s.record_command(&format!("cmd {i}"), CommandOutcome::Ok, "", 10);
        }
        assert_eq!(s.commands_run.len(), 10);
        assert_eq!(s.commands_run[0].cmd, "cmd 2");
        assert_eq!(s.last_command().unwrap().cmd, "cmd 11");
    }

    #[test]
    fn error_overwrites_and_truncates() {
        let mut s = state();
        s.set_error("build", "first", "");
        s.set_error("test", "second", &"y".repeat(1500));
        let err = s.last_error.as_ref().unwrap();
        assert_eq!(err.location, "test");
        assert_eq!(err.message, "second");
        assert_eq!(err.log_excerpt, "y".repeat(MAX_LOG_EXCERPT));
        s.clear_error();
        assert!(s.last_error.is_none());
    }

    #[test]
    fn open_questions() {
        let mut s = state();
        assert!(s.add_open_question("Which database?"));
        assert!(!s.add_open_question("Which database?"));
        assert!(s.resolve_open_question("Which database?"));
        assert!(!s.resolve_open_question("Which database?"));
    }

    #[test]
    fn plan_progress_counts_checkpoint_lines() {
        let mut s = state();
        s.plan = vec![
            "1. Prepare".to_string(),
            "CP1:prepare".to_string(),
            "2. Execute".to_string(),
            "CP2:execute".to_string(),
        ];
        assert_eq!(s.plan_progress(), (0, 2));
        s.record_checkpoint("CP1:prepare", true);
        assert_eq!(s.plan_progress(), (1, 2));
    }

    #[test]
    fn error_record_serializes_where_key() {
        let mut s = state();
        s.set_error("step 2", "boom", "trace");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["last_error"]["where"], "step 2");
        assert_eq!(json["agent_mode"], "ARCHITECT");
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = r#"{"workspace":"/w","agent_mode":"OPS","goal":"ship"}"#;
        let s: RunState = serde_json::from_str(json).unwrap();
        assert_eq!(s.version, STATE_VERSION);
        assert_eq!(s.current_checkpoint, INITIAL_CHECKPOINT);
        assert!(s.plan.is_empty());
    }
}
