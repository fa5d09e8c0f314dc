//! Conversational phrases. The shell asks a [`ResponseSource`] for a phrase of
//! a given kind; production uses [`RandomResponses`], tests use
//! [`FixedResponses`].

use crate::types::AgentMode;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Greeting,
    Confirmation(AgentMode),
    Working,
    Completion,
    SuggestionIntro,
    Thanks,
}

pub trait ResponseSource {
    fn pick(&mut self, kind: ResponseKind) -> String;
}

const GREETINGS: &[&str] = &[
    "Hi! How can I help today?",
    "Hello! Ready to work. What do you need?",
    "Hi! Ready to start. What's the task?",
    "Hey! Shall we build something together?",
    "Hello! Tell me what you need and I'll take care of the rest.",
];

const WORKING: &[&str] = &[
    "Let me look at the workspace and get ready...",
    "Analyzing the project and drafting a plan...",
    "Getting the tools ready...",
    "Lining up the steps...",
    "Checking the context and working out a strategy...",
];

const COMPLETIONS: &[&str] = &[
    "Done!",
    "Finished. Have a look.",
    "All set.",
    "Complete. What's next?",
];

const SUGGESTION_INTROS: &[&str] = &[
    "Some ideas for what to do next:",
    "Recommended next steps:",
    "You could continue with:",
];

const THANKS: &[&str] = &[
    "You're welcome! Happy to help.",
    "Anytime!",
    "Glad it helped. Call me whenever.",
];

fn confirmations(mode: AgentMode) -> &'static [&'static str] {
    match mode {
        AgentMode::Architect => &[
            "Got it! I'll structure this for you.",
            "Understood. I'll define the architecture.",
            "Right! Let me plan the structure.",
        ],
        AgentMode::Implementer => &[
            "Got it! I'll implement this now.",
            "Perfect. Let me code this for you.",
            "On it. I'll make this work.",
        ],
        AgentMode::Debugger => &[
            "Got it! I'll investigate the problem.",
            "Okay. Let me analyze and fix this.",
            "Right! I'll find the bug and fix it.",
        ],
        AgentMode::Reviewer => &[
            "Got it! I'll review everything carefully.",
            "Right. Let me check the code quality.",
            "Okay. I'll analyze it and give feedback.",
        ],
        AgentMode::Documenter => &[
            "Got it! I'll document this in detail.",
            "Right. Let me write clear documentation.",
            "Okay. I'll explain it all plainly.",
        ],
        AgentMode::Ops => &[
            "Got it! I'll set up the infrastructure.",
            "Right. Let me automate this.",
            "Okay. I'll prepare the deploy pipeline.",
        ],
    }
}

fn table(kind: ResponseKind) -> &'static [&'static str] {
    match kind {
        ResponseKind::Greeting => GREETINGS,
        ResponseKind::Confirmation(mode) => confirmations(mode),
        ResponseKind::Working => WORKING,
        ResponseKind::Completion => COMPLETIONS,
        ResponseKind::SuggestionIntro => SUGGESTION_INTROS,
        ResponseKind::Thanks => THANKS,
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RandomResponses;

impl ResponseSource for RandomResponses {
    fn pick(&mut self, kind: ResponseKind) -> String {
        let mut rng = rand::thread_rng();
        table(kind)
            .choose(&mut rng)
            .copied()
            .unwrap_or_default()
            .to_string()
    }
}

/// Always the first phrase of each table.
#[derive(Debug, Default)]
pub struct FixedResponses;

impl ResponseSource for FixedResponses {
    fn pick(&mut self, kind: ResponseKind) -> String {
        table(kind).first().copied().unwrap_or_default().to_string()
    }
}

// ---------------------------------------------------------------------------
// Small-talk detection
// ---------------------------------------------------------------------------

const GREETING_WORDS: &[&str] = &[
    "oi", "olá", "ola", "hey", "opa", "e ai", "e aí", "bom dia", "boa tarde", "boa noite",
    "hello", "hi",
];

const THANKS_WORDS: &[&str] = &[
    "obrigado", "obrigada", "valeu", "vlw", "thanks", "thank you", "graças", "brigado",
];

/// True when the whole input is a greeting ("oi", "hello agent"). Matching is
/// word-based so "history" or "choice" do not count.
pub fn is_greeting(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() || words.len() > 3 {
        return false;
    }
    let joined = words.join(" ");
    GREETING_WORDS
        .iter()
        .any(|g| joined == *g || joined.starts_with(&format!("{g} ")))
}

pub fn is_thanks(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    THANKS_WORDS.iter().any(|t| lower.contains(t))
}
