//! Embedder backed by precomputed descriptor files.
//!
//! Each image `photo.jpg` has a companion `photo.jpg.faces.json` holding a
//! JSON array of face descriptors, each an array of numbers. An empty array
//! means the detector found no faces.

use super::traits::{FaceEmbedder, FaceEncoding};
use crate::error::EmbedError;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_SIDECAR_SUFFIX: &str = ".faces.json";

#[derive(Debug, Clone)]
pub struct SidecarEmbedder {
    suffix: String,
}

impl SidecarEmbedder {
    pub fn new() -> Self {
        Self {
            suffix: DEFAULT_SIDECAR_SUFFIX.to_string(),
        }
    }

    /// Where the descriptors for `image` are expected
    pub fn descriptor_path(&self, image: &Path) -> PathBuf {
        let mut name = OsString::from(image.as_os_str());
        name.push(&self.suffix);
        PathBuf::from(name)
    }
}

impl Default for SidecarEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceEmbedder for SidecarEmbedder {
    fn embed(&self, image: &Path) -> Result<Vec<FaceEncoding>, EmbedError> {
        let path = self.descriptor_path(image);
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EmbedError::MissingDescriptor {
                path: image.to_path_buf(),
            },
            _ => EmbedError::Io {
                path: path.clone(),
                source: e,
            },
        })?;

        let faces: Vec<Vec<f64>> =
            serde_json::from_str(&contents).map_err(|e| EmbedError::Malformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if faces.iter().any(Vec::is_empty) {
            return Err(EmbedError::Malformed {
                path,
                reason: "empty face descriptor".to_string(),
            });
        }

        Ok(faces.into_iter().map(FaceEncoding::new).collect())
    }
}
