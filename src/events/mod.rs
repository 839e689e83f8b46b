//! # Events Module
//!
//! Observer-based progress and log reporting, GUI-ready.
//!
//! ## Design
//! Long-running operations take a [`Reporter`] that wraps an optional
//! [`ProgressObserver`] and an optional [`LogObserver`]. Any closure of
//! the right shape is an observer; [`EventSender`] forwards both streams
//! through a crossbeam channel so a UI thread can render them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::bounded(1024);
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Progress(p) => println!("{:.0}%", p.percent),
//!             Event::Log(entry) => println!("{entry}"),
//!         }
//!     }
//! });
//!
//! discovery.run(&root, Reporter::observing(&sender), &CancellationToken::new());
//! ```

mod channel;
mod observer;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender};
pub use observer::{LogObserver, ProgressObserver, Reporter};
pub use types::*;
