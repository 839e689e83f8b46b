//! # Pipeline Module
//!
//! Orchestrates one discovery scan.
//!
//! ## Pipeline Stages
//! 1. **Lock** - Take the single-writer lock on the catalog file
//! 2. **Crawl** - Walk the root, prune skipped folders, classify files
//! 3. **Merge** - Union new findings into the previously saved catalog
//! 4. **Persist** - Atomically replace the catalog, append a scan record
//!
//! Only an invalid root, a held lock or cancellation end a scan early, and
//! none of them mutates persisted state.

mod executor;

pub use executor::{
    format_elapsed, Discovery, DiscoveryBuilder, DiscoveryConfig, DiscoveryOutcome,
    DiscoverySummary, DEFAULT_CATALOG_FILE, DEFAULT_HISTORY_FILE,
};
