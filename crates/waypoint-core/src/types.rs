use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AgentMode
// ---------------------------------------------------------------------------

/// The six fixed work modes. Declaration order matters: the classifier
/// breaks score ties in favour of the earlier variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentMode {
    Architect,
    #[default]
    Implementer,
    Debugger,
    Reviewer,
    Documenter,
    Ops,
}

impl AgentMode {
    pub fn all() -> &'static [AgentMode] {
        &[
            AgentMode::Architect,
            AgentMode::Implementer,
            AgentMode::Debugger,
            AgentMode::Reviewer,
            AgentMode::Documenter,
            AgentMode::Ops,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentMode::Architect => "ARCHITECT",
            AgentMode::Implementer => "IMPLEMENTER",
            AgentMode::Debugger => "DEBUGGER",
            AgentMode::Reviewer => "REVIEWER",
            AgentMode::Documenter => "DOCUMENTER",
            AgentMode::Ops => "OPS",
        }
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentMode {
    type Err = crate::error::WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AgentMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| crate::error::WaypointError::UnknownMode(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CommandOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    Ok,
    Fail,
}

impl CommandOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            CommandOutcome::Ok
        } else {
            CommandOutcome::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandOutcome::Ok => "ok",
            CommandOutcome::Fail => "fail",
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Toggle
// ---------------------------------------------------------------------------

/// Argument of an on/off session switch. `Query` means "show the current value".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Query,
}

impl std::str::FromStr for Toggle {
    type Err = crate::error::WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Ok(Toggle::On),
            "off" | "false" | "0" => Ok(Toggle::Off),
            "" => Ok(Toggle::Query),
            _ => Err(crate::error::WaypointError::InvalidToggle(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaypointError;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("debugger".parse::<AgentMode>().unwrap(), AgentMode::Debugger);
        assert_eq!(" Ops ".parse::<AgentMode>().unwrap(), AgentMode::Ops);
        for mode in AgentMode::all() {
            assert_eq!(mode.as_str().parse::<AgentMode>().unwrap(), *mode);
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(matches!(
            "WIZARD".parse::<AgentMode>(),
            Err(WaypointError::UnknownMode(m)) if m == "WIZARD"
        ));
        assert!("".parse::<AgentMode>().is_err());
    }

    #[test]
    fn mode_serializes_upper_case() {
        let json = serde_json::to_string(&AgentMode::Documenter).unwrap();
        assert_eq!(json, "\"DOCUMENTER\"");
        let back: AgentMode = serde_json::from_str("\"ARCHITECT\"").unwrap();
        assert_eq!(back, AgentMode::Architect);
    }

    #[test]
    fn default_mode_is_implementer() {
        assert_eq!(AgentMode::default(), AgentMode::Implementer);
    }

    #[test]
    fn toggle_values() {
        assert_eq!("ON".parse::<Toggle>().unwrap(), Toggle::On);
        assert_eq!("1".parse::<Toggle>().unwrap(), Toggle::On);
        assert_eq!("false".parse::<Toggle>().unwrap(), Toggle::Off);
        assert_eq!("".parse::<Toggle>().unwrap(), Toggle::Query);
        assert!("maybe".parse::<Toggle>().is_err());
    }
}
