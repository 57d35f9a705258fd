//! Progress and log reporting for a configuration run.
//!
//! The orchestrator only talks to a [`RunSink`]. The stock sink is an unbounded tokio channel
//! of [`RunEvent`]s, whoever holds the receiver decides how events are rendered.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Progress { completed: usize, total: usize },
    Log(LogLine),
}

pub trait RunSink: Send + Sync {
    fn progress(&self, completed: usize, total: usize);
    fn log(&self, line: LogLine);
}

impl RunSink for UnboundedSender<RunEvent> {
    fn progress(&self, completed: usize, total: usize) {
        let _ = self.send(RunEvent::Progress { completed, total });
    }

    fn log(&self, line: LogLine) {
        let _ = self.send(RunEvent::Log(line));
    }
}
