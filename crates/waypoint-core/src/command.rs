//! Slash commands typed into the interactive shell.

use crate::error::{Result, WaypointError};
use crate::types::{AgentMode, Toggle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// `None` shows the current mode.
    Agent(Option<AgentMode>),
    /// `None` shows the current workspace.
    Workspace(Option<String>),
    Status,
    Plan,
    Resume,
    DryRun(Toggle),
    Apply(String),
    Watch(Toggle),
    Undo,
    Help,
    Exit,
    Auto(Toggle),
    Diagnose,
}

/// `(usage, summary)` for every command, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/agent [MODE]", "show or switch the agent mode"),
    ("/workspace [PATH]", "show or change the workspace directory"),
    ("/status", "show the session state"),
    ("/plan", "show the current plan"),
    ("/resume", "show where to pick up from"),
    ("/dry-run [on|off]", "simulate writes without touching disk"),
    ("/apply [PATCH]", "apply a patch"),
    ("/watch [on|off]", "record files changed in the workspace"),
    ("/undo", "revert the last change"),
    ("/auto [on|off]", "run the plan automatically after each request"),
    ("/diagnose", "diagnose the last recorded error"),
    ("/help", "show this help"),
    ("/exit", "leave the shell (also /quit)"),
];

/// Bare command names, for completion.
pub fn names() -> impl Iterator<Item = &'static str> {
    COMMANDS
        .iter()
        .map(|(usage, _)| usage.split_whitespace().next().unwrap_or(usage))
}

pub fn is_slash(line: &str) -> bool {
    line.trim_start().starts_with('/')
}

impl SlashCommand {
    /// Parse `/name [argument...]`. The argument is everything after the
    /// first run of whitespace, trimmed.
    pub fn parse(line: &str) -> Result<Self> {
        let body = line.trim().trim_start_matches('/');
        let (name, arg) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let optional = |arg: &str| (!arg.is_empty()).then(|| arg.to_string());

        let cmd = match name.to_ascii_lowercase().as_str() {
            "agent" => SlashCommand::Agent(if arg.is_empty() {
                None
            } else {
                Some(arg.parse::<AgentMode>()?)
            }),
            "workspace" => SlashCommand::Workspace(optional(arg)),
            "status" => SlashCommand::Status,
            "plan" => SlashCommand::Plan,
            "resume" => SlashCommand::Resume,
            "dry-run" => SlashCommand::DryRun(arg.parse()?),
            "apply" => SlashCommand::Apply(arg.to_string()),
            "watch" => SlashCommand::Watch(arg.parse()?),
            "undo" => SlashCommand::Undo,
            "help" => SlashCommand::Help,
            "exit" | "quit" => SlashCommand::Exit,
            "auto" => SlashCommand::Auto(arg.parse()?),
            "diagnose" => SlashCommand::Diagnose,
            _ => return Err(WaypointError::UnknownCommand(name.to_string())),
        };
        Ok(cmd)
    }
}
