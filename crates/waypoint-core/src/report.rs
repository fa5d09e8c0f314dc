//! Output sink injected into components that talk to the user.

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Stage,
    Info,
    Success,
    Warning,
    Error,
}

pub trait Reporter {
    fn report(&mut self, level: Level, message: &str);

    fn stage(&mut self, message: &str) {
        self.report(Level::Stage, message);
    }

    fn info(&mut self, message: &str) {
        self.report(Level::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.report(Level::Success, message);
    }

    fn warning(&mut self, message: &str) {
        self.report(Level::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub lines: Vec<(Level, String)>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(_, line)| line.contains(needle))
    }

    pub fn at(&self, level: Level) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, level: Level, message: &str) {
        self.lines.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_keeps_levels() {
        let mut r = RecordingReporter::new();
        r.stage("A - Success criteria");
        r.error("step 2 failed");
        assert!(r.contains("step 2"));
        assert_eq!(r.at(Level::Error), vec!["step 2 failed"]);
        assert!(r.at(Level::Info).is_empty());
    }
}
