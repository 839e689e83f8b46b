//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to move progress and log events from a
//! worker running a scan to whichever thread presents them.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::{Event, LogEntry, LogObserver, ProgressObserver, ProgressUpdate};

/// Sends events from the core library.
///
/// Cheap to clone and safe to share across threads. Implements both
/// observer traits, so it can be handed straight to a [`Reporter`](super::Reporter).
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Create a new EventSender from a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Send an event. Blocks only when a bounded channel is full.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

impl ProgressObserver for EventSender {
    fn on_progress(&self, update: ProgressUpdate) {
        self.send(Event::Progress(update));
    }
}

impl LogObserver for EventSender {
    fn on_log(&self, entry: LogEntry) {
        self.send(Event::Log(entry));
    }
}

/// Receives events from the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events, ending when every
    /// sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Create a bounded event channel with the specified capacity.
    ///
    /// Crawls can emit one progress event per file; a bounded channel
    /// applies backpressure instead of buffering millions of events.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}
