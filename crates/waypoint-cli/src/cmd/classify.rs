use crate::output::print_json;
use serde::Serialize;
use waypoint_core::classifier::{Classifier, Intent};
use waypoint_core::types::AgentMode;

#[derive(Serialize)]
struct ClassifyOutput {
    #[serde(flatten)]
    intent: Intent,
    scores: Vec<Score>,
}

#[derive(Serialize)]
struct Score {
    mode: AgentMode,
    hits: usize,
}

pub fn run(text: &str, json: bool) -> anyhow::Result<()> {
    let classifier = Classifier::default();
    let intent = classifier.classify(text);

    if json {
        let scores = classifier
            .scores(text)
            .into_iter()
            .map(|(mode, hits)| Score { mode, hits })
            .collect();
        return print_json(&ClassifyOutput { intent, scores });
    }
    println!("{}: {}", intent.mode, intent.goal);
    Ok(())
}
