//! # Error Module
//!
//! User-friendly error types for media discovery and face matching.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Recovery hints** - suggest how to fix when possible
//! - **Item errors never escalate** - long scans log them and keep going

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MediaToolsError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("Face match error: {0}")]
    Match(#[from] MatchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that occur while walking a directory tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid directory path: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors that occur while reading or writing persisted scan state
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog is in use by another scan ({lock_path}). Delete this file if no scan is running.")]
    Busy { lock_path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize scan state: {0}")]
    Serialize(String),
}

/// Errors reported by a face embedding backend
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("No face descriptor file for {path}. Run the face detector on this folder first.")]
    MissingDescriptor { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed face descriptors for {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Embedding failed: {0}")]
    Failed(String),
}

/// Errors that occur while copying face matches
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Output directory {path} is unavailable: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors in user-supplied configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Extension {extension} is listed as both image and video")]
    OverlappingExtensions { extension: String },

    #[error("Empty entries are not allowed in classification tables")]
    EmptyEntry,

    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Failure classes surfaced to observers alongside log messages.
///
/// `InvalidRoot`, `NoUsableInput` and `StateUnavailable` end an operation
/// early; the others are absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The operation's root is not a directory; nothing was mutated
    InvalidRoot,
    /// A single file, directory, embedding or copy failed
    ItemError,
    /// Persisted state was unreadable and treated as empty
    StateCorrupt,
    /// Nothing to work on (no target faces, no candidates)
    NoUsableInput,
    /// Persisted state is locked by another scan, or state or output
    /// could not be written
    StateUnavailable,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaToolsError>;
