//! Logging capability handed to the generator.

use std::cell::RefCell;

/// Sink for generator diagnostics.
pub trait EventLog {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards events to the `tracing` subscriber installed by the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "invitations", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "invitations", "{message}");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Keeps every event in memory so callers can inspect what was reported.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: RefCell<Vec<LogEntry>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(Severity::Info)
    }

    fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.severity == severity)
            .map(|entry| entry.message.clone())
            .collect()
    }

    fn push(&self, severity: Severity, message: &str) {
        self.entries.borrow_mut().push(LogEntry {
            severity,
            message: message.to_owned(),
        });
    }
}

impl EventLog for RecordingLog {
    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }
}
