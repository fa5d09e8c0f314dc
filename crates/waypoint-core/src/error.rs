use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaypointError {
    #[error("no session state: create one with 'waypoint init <goal>'")]
    NoState,

    #[error("unknown mode '{0}': expected one of ARCHITECT, IMPLEMENTER, DEBUGGER, REVIEWER, DOCUMENTER, OPS")]
    UnknownMode(String),

    #[error("unknown command: /{0}")]
    UnknownCommand(String),

    #[error("invalid toggle '{0}': expected on or off")]
    InvalidToggle(String),

    #[error("workspace not found: {0}")]
    WorkspaceNotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("malformed state file {path}: {reason}")]
    MalformedState { path: PathBuf, reason: String },

    #[error("step {step} failed: {reason}")]
    StepFailed { step: u32, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WaypointError>;
