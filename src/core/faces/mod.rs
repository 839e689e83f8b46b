//! # Faces Module
//!
//! Finds photos of particular people and copies them out.
//!
//! ## Flow
//! 1. **Targets** - Embed each target photo, keep one reference face per photo
//! 2. **Candidates** - Walk the source folder for whitelisted image files
//! 3. **Match** - First face and target pair within the threshold wins
//! 4. **Copy** - Copy the candidate under a name that never overwrites
//!
//! Detection and embedding live behind [`FaceEmbedder`]; the shipped
//! [`SidecarEmbedder`] reads descriptors precomputed by an external detector.

mod encodings;
mod naming;
mod scanner;
mod sidecar;
mod traits;

pub use encodings::EncodingStore;
pub use naming::copy_to_unique;
pub use scanner::{
    CandidateOutcome, MatchConfig, MatchEvent, MatchReport, MatchScanner, ScanState,
    DEFAULT_MATCH_THRESHOLD, MATCH_EXTENSIONS,
};
pub use sidecar::{SidecarEmbedder, DEFAULT_SIDECAR_SUFFIX};
pub use traits::{FaceEmbedder, FaceEncoding, TargetEncoding};

/// Name of the folder created under the destination for copied matches
pub const MATCHED_FOLDER: &str = "Matched";
