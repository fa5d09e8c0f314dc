//! Advisory diagnosis of the session's recorded error.
//!
//! Runs at most two cheap checks over the [`ErrorRecord`] and ranks a short
//! list of hypotheses. Nothing here changes the workspace.

use crate::state::ErrorRecord;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

impl Likelihood {
    pub fn as_str(self) -> &'static str {
        match self {
            Likelihood::High => "high",
            Likelihood::Medium => "medium",
            Likelihood::Low => "low",
        }
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hypothesis {
    pub description: String,
    pub likelihood: Likelihood,
    pub fix_suggestion: String,
}

impl Hypothesis {
    fn new(description: &str, likelihood: Likelihood, fix_suggestion: &str) -> Self {
        Self {
            description: description.to_string(),
            likelihood,
            fix_suggestion: fix_suggestion.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub location: String,
    pub findings: Vec<String>,
    /// Most likely first.
    pub hypotheses: Vec<Hypothesis>,
}

const TRACE_MARKERS: &[&str] = &["Traceback", "panicked at", "stack backtrace", "Error", "at line"];

const DEPENDENCY_HINTS: &[&str] = &[
    "not found",
    "no module named",
    "cannot find",
    "unresolved import",
    "modulenotfounderror",
    "importerror",
    "version",
];

const CONFIG_HINTS: &[&str] = &[
    "permission denied",
    "environment",
    "env var",
    "no such file",
    "config",
    "path",
];

fn mentions(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(&n.to_lowercase()))
}

pub fn diagnose(error: &ErrorRecord) -> Diagnosis {
    let mut findings = Vec::with_capacity(2);

    let has_trace = TRACE_MARKERS.iter().any(|m| error.log_excerpt.contains(m));
    findings.push(if has_trace {
        "Stack trace present in the log".to_string()
    } else {
        "No clear stack trace".to_string()
    });

    let dependency = mentions(&error.message, DEPENDENCY_HINTS)
        || mentions(&error.log_excerpt, DEPENDENCY_HINTS);
    let config = mentions(&error.message, CONFIG_HINTS);
    findings.push(match (dependency, config) {
        (true, _) => "Message points at a missing or mismatched dependency".to_string(),
        (false, true) => "Message points at configuration or environment".to_string(),
        (false, false) => "No dependency or configuration hint".to_string(),
    });

    let mut hypotheses = vec![
        Hypothesis::new(
            "Syntax error or missing import",
            if has_trace { Likelihood::High } else { Likelihood::Medium },
            "Check the imports and syntax of the failing code",
        ),
        Hypothesis::new(
            "Configuration or environment problem",
            if config { Likelihood::High } else { Likelihood::Medium },
            "Check environment variables and paths",
        ),
    ];
    if dependency {
        hypotheses.push(Hypothesis::new(
            "Missing or incompatible dependency",
            Likelihood::High,
            "Install the dependency or align its version",
        ));
    } else {
        hypotheses.push(Hypothesis::new(
            "Logic error in the step itself",
            Likelihood::Low,
            "Re-run the step with more logging and inspect its inputs",
        ));
    }
    // Stable: equal likelihoods keep their listed order.
    hypotheses.sort_by_key(|h| h.likelihood);

    Diagnosis {
        location: error.location.clone(),
        findings,
        hypotheses,
    }
}

pub fn propose_fix(diagnosis: &Diagnosis) -> Option<&Hypothesis> {
    diagnosis.hypotheses.first()
}
