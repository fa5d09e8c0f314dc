use crate::types::AgentMode;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Intent (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub mode: AgentMode,
    pub goal: String,
}

// ---------------------------------------------------------------------------
// KeywordRule
// ---------------------------------------------------------------------------

/// Keywords are matched as substrings of the lower-cased input, so every
/// entry here must already be lower case.
pub struct KeywordRule {
    pub mode: AgentMode,
    pub keywords: &'static [&'static str],
}

pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule {
            mode: AgentMode::Architect,
            keywords: &[
                "arquitetura",
                "estrutura",
                "organizar",
                "planejar",
                "design",
                "padrão",
                "padrões",
                "modelar",
                "módulos",
                "componentes",
                "camadas",
                "dividir",
                "responsabilidades",
                "escolher",
                "architecture",
                "scaffold",
            ],
        },
        KeywordRule {
            mode: AgentMode::Implementer,
            keywords: &[
                "implementar",
                "criar",
                "adicionar",
                "desenvolver",
                "codificar",
                "construir",
                "feature",
                "funcionalidade",
                "endpoint",
                "função",
                "classe",
                "método",
                "api",
                "rota",
                "serviço",
                "controller",
                "escrever código",
            ],
        },
        KeywordRule {
            mode: AgentMode::Debugger,
            keywords: &[
                "corrigir",
                "bug",
                "erro",
                "problema",
                "falha",
                "debug",
                "investigar",
                "exception",
                "exceção",
                "stacktrace",
                "traceback",
                "não funciona",
                "quebrado",
                "crash",
                "travando",
                "consertar",
                "panic",
            ],
        },
        KeywordRule {
            mode: AgentMode::Reviewer,
            keywords: &[
                "revisar",
                "review",
                "verificar",
                "checar",
                "validar",
                "analisar código",
                "qualidade",
                "melhorar",
                "refatorar",
                "refactor",
                "otimizar",
                "pull request",
                "diff",
                "lint",
            ],
        },
        KeywordRule {
            mode: AgentMode::Documenter,
            keywords: &[
                "document",
                "documentar",
                "documentação",
                "docs",
                "readme",
                "explicar",
                "comentar",
                "comentário",
                "docstring",
                "exemplo",
                "tutorial",
                "guia",
                "manual",
                "how-to",
                "changelog",
            ],
        },
        KeywordRule {
            mode: AgentMode::Ops,
            keywords: &[
                "deploy",
                "ci/cd",
                "docker",
                "dockerfile",
                "container",
                "kubernetes",
                "k8s",
                "github actions",
                "pipeline",
                "build",
                "automatizar",
                "script",
                "infraestrutura",
                "devops",
                "automation",
            ],
        },
    ]
}

/// Filler openers stripped by `extract_goal`. Checked in order; the first
/// match wins.
const FILLER_PREFIXES: &[&str] = &[
    "quero ",
    "preciso ",
    "gostaria de ",
    "pode ",
    "poderia ",
    "vou ",
    "vamos ",
    "me ajude a ",
    "ajude-me a ",
];

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<KeywordRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Per-mode score: how many of the mode's keywords occur in `text`.
    /// Each keyword counts once regardless of how often it appears.
    pub fn scores(&self, text: &str) -> Vec<(AgentMode, usize)> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .map(|rule| {
                let hits = rule
                    .keywords
                    .iter()
                    .filter(|kw| lower.contains(*kw))
                    .count();
                (rule.mode, hits)
            })
            .collect()
    }

    /// Highest-scoring mode. Ties go to the first rule in declaration order;
    /// no match at all yields the default mode.
    pub fn detect_mode(&self, text: &str) -> AgentMode {
        let mut best: Option<(AgentMode, usize)> = None;
        for (mode, score) in self.scores(text) {
            if score == 0 {
                continue;
            }
            match best {
                Some((_, top)) if top >= score => {}
                _ => best = Some((mode, score)),
            }
        }
        best.map(|(mode, _)| mode).unwrap_or_default()
    }

    pub fn classify(&self, text: &str) -> Intent {
        Intent {
            mode: self.detect_mode(text),
            goal: extract_goal(text),
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions over the default rule set
// ---------------------------------------------------------------------------

pub fn detect_mode(text: &str) -> AgentMode {
    Classifier::default().detect_mode(text)
}

pub fn detect_intent(text: &str) -> Intent {
    Classifier::default().classify(text)
}

/// Strip one leading filler phrase (case-insensitive) and capitalize the first
/// character of what remains. Never fails; empty input yields empty output.
pub fn extract_goal(text: &str) -> String {
    let mut rest = text;
    for prefix in FILLER_PREFIXES {
        // Prefixes are ASCII, so a case-insensitive match on the leading bytes
        // also lands on a char boundary.
        let matches = rest
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            rest = &rest[prefix.len()..];
            break;
        }
    }

    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_input_use_default_mode() {
        assert_eq!(detect_mode(""), AgentMode::Implementer);
        assert_eq!(detect_mode("   "), AgentMode::Implementer);
        assert_eq!(detect_mode("fazer algo"), AgentMode::Implementer);
    }

    #[test]
    fn scoring_is_case_insensitive_and_deterministic() {
        assert_eq!(detect_mode("CRIAR API"), detect_mode("criar api"));
        let first = detect_mode("corrigir bug no auth.py");
        for _ in 0..5 {
            assert_eq!(detect_mode("corrigir bug no auth.py"), first);
        }
    }

    #[test]
    fn detects_each_mode() {
        let cases = [
            ("corrigir bug no auth.py", AgentMode::Debugger),
            ("investigar crash", AgentMode::Debugger),
            ("não funciona", AgentMode::Debugger),
            ("documentar a API", AgentMode::Documenter),
            ("gerar documentação", AgentMode::Documenter),
            ("escrever README", AgentMode::Documenter),
            ("planejar arquitetura", AgentMode::Architect),
            ("escolher padrão de design", AgentMode::Architect),
            ("revisar o código", AgentMode::Reviewer),
            ("code review", AgentMode::Reviewer),
            ("configurar CI/CD", AgentMode::Ops),
            ("criar Dockerfile", AgentMode::Ops),
            ("script de deploy", AgentMode::Ops),
            ("criar uma API REST", AgentMode::Implementer),
            ("desenvolver endpoint", AgentMode::Implementer),
        ];
        for (text, expected) in cases {
            assert_eq!(detect_mode(text), expected, "input: {text}");
        }
    }

    #[test]
    fn ties_go_to_declaration_order() {
        // "criar" (IMPLEMENTER) and "tutorial" (DOCUMENTER) score one each.
        assert_eq!(detect_mode("criar tutorial"), AgentMode::Implementer);
        // "estrutura" (ARCHITECT) and "bug" (DEBUGGER) score one each.
        assert_eq!(detect_mode("estrutura com bug"), AgentMode::Architect);
    }

    #[test]
    fn unicode_and_emoji_input() {
        assert_eq!(
            detect_mode("criação de módulo de autenticação com ç e ã"),
            AgentMode::Implementer
        );
        assert_eq!(detect_mode("criar uma API 🚀 com auth 🔐"), AgentMode::Implementer);
    }

    #[test]
    fn custom_rules() {
        let classifier = Classifier::new(vec![KeywordRule {
            mode: AgentMode::Ops,
            keywords: &["ship"],
        }]);
        assert_eq!(classifier.detect_mode("ship it"), AgentMode::Ops);
        assert_eq!(classifier.detect_mode("nothing"), AgentMode::Implementer);
    }

    #[test]
    fn extract_goal_strips_filler() {
        let cases = [
            ("quero criar uma API", "Criar uma API"),
            ("preciso adicionar testes", "Adicionar testes"),
            ("gostaria de implementar login", "Implementar login"),
            ("pode criar documentação", "Criar documentação"),
            ("ajude-me a corrigir bug", "Corrigir bug"),
            ("Quero criar uma API", "Criar uma API"),
            ("criar uma API", "Criar uma API"),
        ];
        for (input, expected) in cases {
            assert_eq!(extract_goal(input), expected, "input: {input}");
        }
    }

    #[test]
    fn extract_goal_strips_only_one_prefix() {
        assert_eq!(extract_goal("vamos pode fazer"), "Pode fazer");
    }

    #[test]
    fn extract_goal_edge_cases() {
        assert_eq!(extract_goal(""), "");
        assert_eq!(extract_goal("quero "), "");
        assert_eq!(extract_goal("ótimo"), "Ótimo");
        assert_eq!(extract_goal("q"), "Q");
    }

    #[test]
    fn classify_combines_mode_and_goal() {
        let intent = detect_intent("quero corrigir bug no login");
        assert_eq!(intent.mode, AgentMode::Debugger);
        assert_eq!(intent.goal, "Corrigir bug no login");
    }
}
