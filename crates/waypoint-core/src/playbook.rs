//! Canned plans and follow-up suggestions used when the shell executes a goal
//! on its own.

use crate::pipeline::PlanStep;
use crate::types::AgentMode;

pub fn default_criteria(goal: &str) -> Vec<String> {
    vec![
        format!("Complete: {goal}"),
        "Working code".to_string(),
        "Tests pass".to_string(),
    ]
}

pub fn default_plan(goal: &str) -> Vec<PlanStep> {
    vec![
        PlanStep::new(1, format!("Prepare: {goal}"))
            .with_checkpoint("CP1:prepare")
            .with_file("preparation"),
        PlanStep::new(2, format!("Execute: {goal}"))
            .with_checkpoint("CP2:execute")
            .with_file("implementation"),
        PlanStep::new(3, "Validate result")
            .with_checkpoint("CP3:validate")
            .with_file("validation"),
    ]
}

pub fn next_steps(mode: AgentMode) -> &'static [&'static str] {
    match mode {
        AgentMode::Architect => &["Implement the architecture", "Review the structure"],
        AgentMode::Implementer => &["Add tests", "Document the code"],
        AgentMode::Debugger => &["Run the tests", "Verify the fixes"],
        AgentMode::Reviewer => &["Apply the suggested improvements", "Validate quality"],
        AgentMode::Documenter => &["Review the docs", "Add examples"],
        AgentMode::Ops => &["Test the pipeline", "Deploy"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_carries_checkpoints() {
        let plan = default_plan("Criar uma API");
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].action, "Prepare: Criar uma API");
        let ids: Vec<&str> = plan.iter().filter_map(|s| s.checkpoint.as_deref()).collect();
        assert_eq!(ids, vec!["CP1:prepare", "CP2:execute", "CP3:validate"]);
    }

    #[test]
    fn every_mode_has_next_steps() {
        for mode in AgentMode::all() {
            assert!(!next_steps(*mode).is_empty());
        }
    }
}
