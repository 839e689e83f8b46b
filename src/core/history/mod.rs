//! # Scan History Module
//!
//! Append-only log of discovery scans, stored as a JSON array.
//!
//! History is diagnostic: the catalog never reads it back. A corrupt
//! history file is treated as empty and replaced on the next append.
//! Entries that no longer parse are kept verbatim on rewrite and skipped
//! when listing.

use crate::core::catalog::{read_json_or_default, write_json_atomic, LoadStatus};
use crate::error::CatalogError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use uuid::Uuid;

/// One completed discovery scan. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub root: String,
    pub timestamp: DateTime<Local>,
    /// Media found by this scan, not the merged catalog size
    pub image_count: usize,
    pub video_count: usize,
    pub elapsed_seconds: f64,
    pub image_extensions: BTreeSet<String>,
    pub video_extensions: BTreeSet<String>,
}

impl ScanRecord {
    /// Generate a new unique ID
    pub fn generate_id() -> Uuid {
        Uuid::new_v4()
    }
}

/// Append `record`, rewriting the whole file.
///
/// Returns how the existing history was found so callers can report
/// corruption.
pub fn append_history(record: &ScanRecord, path: &Path) -> Result<LoadStatus, CatalogError> {
    let loaded = read_json_or_default::<Vec<Value>>(path);
    let mut entries = loaded.value;

    let value = serde_json::to_value(record).map_err(|e| CatalogError::Serialize(e.to_string()))?;
    entries.push(value);

    write_json_atomic(path, &entries)?;
    Ok(loaded.status)
}

/// Read every parseable record, oldest first
pub fn read_history(path: &Path) -> Vec<ScanRecord> {
    read_json_or_default::<Vec<Value>>(path)
        .value
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect()
}
