//! Observer interfaces passed into long-running operations.
//!
//! Operations call observers synchronously from whatever thread they run
//! on. Marshalling onto a UI thread is the caller's concern; the
//! [`EventSender`](super::EventSender) implementation does it with a channel.

use super::{Component, LogEntry, LogLevel, ProgressUpdate};
use crate::error::FailureKind;

/// Receives percentage progress from a running operation
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

/// Receives log entries from a running operation
pub trait LogObserver: Send + Sync {
    fn on_log(&self, entry: LogEntry);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: ProgressUpdate) {
        self(update)
    }
}

impl<F> LogObserver for F
where
    F: Fn(LogEntry) + Send + Sync,
{
    fn on_log(&self, entry: LogEntry) {
        self(entry)
    }
}

/// Bundles the optional observers of one operation with the component
/// name used for its log lines.
///
/// Every log line is also mirrored to `tracing`, so running without a log
/// observer still leaves a trail.
#[derive(Clone, Copy)]
pub struct Reporter<'a> {
    component: Component,
    progress: Option<&'a dyn ProgressObserver>,
    log: Option<&'a dyn LogObserver>,
}

impl<'a> Reporter<'a> {
    pub fn new(
        progress: Option<&'a dyn ProgressObserver>,
        log: Option<&'a dyn LogObserver>,
    ) -> Self {
        Self {
            component: Component::Discovery,
            progress,
            log,
        }
    }

    /// A reporter with no observers attached
    pub fn silent() -> Reporter<'static> {
        Reporter {
            component: Component::Discovery,
            progress: None,
            log: None,
        }
    }

    /// A reporter that forwards to a single object observing both streams
    pub fn observing<O>(observer: &'a O) -> Self
    where
        O: ProgressObserver + LogObserver,
    {
        Self::new(Some(observer), Some(observer))
    }

    /// Same observers, different component tag
    pub fn with_component(mut self, component: Component) -> Self {
        self.component = component;
        self
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn has_progress(&self) -> bool {
        self.progress.is_some()
    }

    /// Report progress, clamped to 0..=100
    pub fn progress(&self, percent: f64) {
        if let Some(observer) = self.progress {
            let percent = if percent.is_nan() {
                0.0
            } else {
                percent.clamp(0.0, 100.0)
            };
            observer.on_progress(ProgressUpdate {
                component: self.component,
                percent,
            });
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Debug, self.component, message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Info, self.component, message));
    }

    pub fn warn(&self, kind: FailureKind, message: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Warn, self.component, message).with_kind(kind));
    }

    pub fn error(&self, kind: FailureKind, message: impl Into<String>) {
        self.emit(LogEntry::new(LogLevel::Error, self.component, message).with_kind(kind));
    }

    fn emit(&self, entry: LogEntry) {
        let component = entry.component;
        match entry.level {
            LogLevel::Debug => tracing::debug!(%component, "{}", entry.message),
            LogLevel::Info => tracing::info!(%component, "{}", entry.message),
            LogLevel::Warn => tracing::warn!(%component, kind = ?entry.kind, "{}", entry.message),
            LogLevel::Error => tracing::error!(%component, kind = ?entry.kind, "{}", entry.message),
        }

        if let Some(observer) = self.log {
            observer.on_log(entry);
        }
    }
}
