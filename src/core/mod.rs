//! # Core Module
//!
//! The UI-agnostic media engine.
//!
//! ## Modules
//! - `scanner` - Classifies paths and crawls directory trees
//! - `catalog` - Persists the merged set of discovered media
//! - `history` - Append-only log of completed scans
//! - `pipeline` - Orchestrates a discovery scan end to end
//! - `faces` - Finds and copies photos showing target faces
//! - `cancel` - Cooperative cancellation shared by long operations

pub mod cancel;
pub mod catalog;
pub mod faces;
pub mod history;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use catalog::MediaCatalog;
pub use faces::{FaceEmbedder, FaceEncoding, MatchConfig, MatchReport, MatchScanner};
pub use history::ScanRecord;
pub use pipeline::{Discovery, DiscoveryOutcome};
pub use scanner::{ClassificationTables, Crawler, FileClass};
