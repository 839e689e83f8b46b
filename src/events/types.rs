//! Event type definitions for progress and log reporting.

use crate::error::FailureKind;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All events emitted by long-running operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Percentage progress of the running operation
    Progress(ProgressUpdate),
    /// A log line from the running operation
    Log(LogEntry),
}

/// The part of the system an event originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Scan,
    Catalog,
    Discovery,
    FaceMatch,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Scan => write!(f, "SCAN"),
            Component::Catalog => write!(f, "Catalog"),
            Component::Discovery => write!(f, "Discovery"),
            Component::FaceMatch => write!(f, "FaceMatch"),
        }
    }
}

/// Progress information, always within 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub component: Component,
    pub percent: f64,
}

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A structured log line.
///
/// Entries carry their own timestamp; consumers must not rely on
/// delivery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub component: Component,
    pub message: String,
    /// Set on warnings and errors that map to a failure class
    pub kind: Option<FailureKind>,
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: Component, message: impl Into<String>) -> Self {
        Self {
            level,
            component,
            message: message.into(),
            kind: None,
            timestamp: Local::now(),
        }
    }

    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Progress(ProgressUpdate {
            component: Component::Scan,
            percent: 42.5,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Progress(p) => {
                assert_eq!(p.component, Component::Scan);
                assert_eq!(p.percent, 42.5);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn log_entry_displays_component_prefix() {
        let entry = LogEntry::new(LogLevel::Info, Component::FaceMatch, "Completed scanning.");
        assert_eq!(entry.to_string(), "[FaceMatch] Completed scanning.");
    }

    #[test]
    fn log_entry_kind_survives_serialization() {
        let entry = LogEntry::new(LogLevel::Warn, Component::Catalog, "corrupt")
            .with_kind(FailureKind::StateCorrupt);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("state_corrupt"));
    }
}
