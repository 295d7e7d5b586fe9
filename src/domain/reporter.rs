//! Sinks for user-facing resolution messages.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::{info, warn};

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
}

/// Receives the lines produced while restricting packages.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);

    fn warning(&self, message: &str);
}

/// Writes lines to stderr, next to the host's own output.
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        info!("{}", message);
        if !self.quiet {
            let _ = writeln!(io::stderr(), "{}", message);
        }
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
        let _ = writeln!(io::stderr(), "<warning>{}</warning>", message);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines recorded so far, in order.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Messages only, warnings rendered with their markup.
    pub fn output(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|(level, message)| match level {
                Level::Info => message,
                Level::Warning => format!("<warning>{}</warning>", message),
            })
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_keeps_order() {
        let reporter = MemoryReporter::new();
        reporter.info("first");
        reporter.warning("second");

        assert_eq!(
            reporter.lines(),
            vec![
                (Level::Info, "first".to_string()),
                (Level::Warning, "second".to_string())
            ]
        );
        assert_eq!(reporter.output(), vec!["first", "<warning>second</warning>"]);
    }
}
