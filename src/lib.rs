//! # Media Tools
//!
//! Catalogs the photos and videos under a folder tree and finds the photos
//! that show particular people.
//!
//! ## Core Philosophy
//! - **Never lose data** - Catalogs are replaced atomically, copies never overwrite
//! - **Keep going** - One unreadable file never aborts a scan of thousands
//! - **Report everything** - Progress and log lines flow to any observer
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Discovery and face matching
//! - `events` - Observer-driven progress and log reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MediaToolsError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// over the default level. Calling it again is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_twice_does_not_panic() {
        init_tracing(false);
        init_tracing(true);
    }
}
