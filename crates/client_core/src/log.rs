//! Terminal log collaborator.

use shared::domain::{LogKind, LogLine};

pub trait LogSink {
    fn append(&mut self, line: LogLine);
}

impl<L: LogSink + ?Sized> LogSink for Box<L> {
    fn append(&mut self, line: LogLine) {
        (**self).append(line);
    }
}

/// Append-only, unbounded in-memory log.
#[derive(Debug, Clone, Default)]
pub struct TerminalLog {
    lines: Vec<LogLine>,
}

impl TerminalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn count(&self, kind: LogKind) -> usize {
        self.lines.iter().filter(|line| line.kind == kind).count()
    }

    pub fn rendered(&self) -> impl Iterator<Item = String> + '_ {
        self.lines.iter().map(LogLine::render)
    }

    pub fn contains(&self, rendered: &str) -> bool {
        self.rendered().any(|line| line == rendered)
    }
}

impl LogSink for TerminalLog {
    fn append(&mut self, line: LogLine) {
        self.lines.push(line);
    }
}
