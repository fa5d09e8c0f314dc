//! Static per-mode profiles shown by `/agent`, `/help` and `waypoint modes`.

use crate::types::AgentMode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub mode: AgentMode,
    pub description: &'static str,
    pub focus: &'static [&'static str],
    pub typical_actions: &'static [&'static str],
}

static PROFILES: [AgentProfile; 6] = [
    AgentProfile {
        mode: AgentMode::Architect,
        description: "Defines architecture, splits work, picks patterns and structure",
        focus: &[
            "Folder layout",
            "Design patterns",
            "Separation of responsibilities",
            "Interface definitions",
        ],
        typical_actions: &[
            "Create the directory structure",
            "Define modules and packages",
            "Specify API contracts",
            "Choose libraries and frameworks",
        ],
    },
    AgentProfile {
        mode: AgentMode::Implementer,
        description: "Implements code and file changes",
        focus: &["Writing code", "Feature work", "Refactoring", "Optimization"],
        typical_actions: &[
            "Create or modify files",
            "Implement functions",
            "Add tests",
            "Fix simple bugs",
        ],
    },
    AgentProfile {
        mode: AgentMode::Debugger,
        description: "Investigates errors, reproduces them, forms hypotheses and fixes",
        focus: &[
            "Stack trace analysis",
            "Bug reproduction",
            "Systematic diagnosis",
            "Minimal fixes",
        ],
        typical_actions: &[
            "Analyze error logs",
            "Write reproduction cases",
            "Propose hypotheses",
            "Apply surgical fixes",
        ],
    },
    AgentProfile {
        mode: AgentMode::Reviewer,
        description: "Reviews diffs for quality, consistency and security",
        focus: &["Code quality", "Conventions", "Edge cases", "Security"],
        typical_actions: &[
            "Review diffs",
            "Check tests",
            "Flag security problems",
            "Suggest improvements",
        ],
    },
    AgentProfile {
        mode: AgentMode::Documenter,
        description: "Updates README, docs, comments and examples",
        focus: &[
            "Technical documentation",
            "Usage examples",
            "Code comments",
            "Guides and tutorials",
        ],
        typical_actions: &[
            "Write or update the README",
            "Create examples",
            "Document APIs",
            "Add doc comments",
        ],
    },
    AgentProfile {
        mode: AgentMode::Ops,
        description: "Scripts, CI, containers, automation and packaging",
        focus: &["CI/CD", "Containers", "Automation", "Deployment and distribution"],
        typical_actions: &[
            "Configure GitHub Actions",
            "Write Dockerfiles",
            "Build scripts",
            "Set up git hooks",
        ],
    },
];

pub fn profile_for(mode: AgentMode) -> &'static AgentProfile {
    // PROFILES is laid out in AgentMode declaration order.
    &PROFILES[mode as usize]
}

pub fn all_profiles() -> &'static [AgentProfile] {
    &PROFILES
}
