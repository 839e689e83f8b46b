//! The embedding capability seam and the vectors it produces.

use crate::error::EmbedError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A fixed-length face descriptor. Opaque to everything but distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceEncoding(Vec<f64>);

impl FaceEncoding {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean distance; descriptors of different length never match
    pub fn euclidean_distance(&self, other: &Self) -> f64 {
        if self.0.len() != other.0.len() {
            return f64::INFINITY;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f64>> for FaceEncoding {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// A reference encoding and the target image it was taken from
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEncoding {
    pub source: PathBuf,
    pub encoding: FaceEncoding,
}

/// External face detection and embedding capability.
///
/// Implement this trait to plug in a recognizer (or a fake for tests).
/// Implementations must be shareable across the worker threads that
/// embed targets in parallel.
pub trait FaceEmbedder: Send + Sync {
    /// Every face found in the image, in detection order (possibly none)
    fn embed(&self, image: &Path) -> Result<Vec<FaceEncoding>, EmbedError>;

    /// Dissimilarity of two faces; lower is more alike
    fn distance(&self, a: &FaceEncoding, b: &FaceEncoding) -> f64 {
        a.euclidean_distance(b)
    }
}
