//! Reference encodings built from user-chosen target photos.

use super::traits::{FaceEmbedder, TargetEncoding};
use crate::core::cancel::CancellationToken;
use crate::error::FailureKind;
use crate::events::{Component, Reporter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Builds one reference encoding per usable target image
pub struct EncodingStore<'e> {
    embedder: &'e dyn FaceEmbedder,
    require_single_face: bool,
}

impl<'e> EncodingStore<'e> {
    pub fn new(embedder: &'e dyn FaceEmbedder) -> Self {
        Self {
            embedder,
            require_single_face: false,
        }
    }

    /// Skip targets showing more than one face instead of using the first
    pub fn with_single_face(mut self, require: bool) -> Self {
        self.require_single_face = require;
        self
    }

    /// Embed every target, in parallel.
    ///
    /// The result keeps input order minus skipped targets. It may be empty;
    /// the caller decides whether that ends the operation.
    pub fn build(
        &self,
        targets: &[PathBuf],
        reporter: Reporter<'_>,
        cancel: &CancellationToken,
    ) -> Vec<TargetEncoding> {
        let reporter = reporter.with_component(Component::FaceMatch);

        targets
            .par_iter()
            .filter_map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                self.encode_target(path, reporter)
            })
            .collect()
    }

    fn encode_target(&self, path: &Path, reporter: Reporter<'_>) -> Option<TargetEncoding> {
        let faces = match self.embedder.embed(path) {
            Ok(faces) => faces,
            Err(e) => {
                reporter.warn(
                    FailureKind::ItemError,
                    format!("Error loading target {}: {}", path.display(), e),
                );
                return None;
            }
        };

        let count = faces.len();
        if count > 1 {
            if self.require_single_face {
                reporter.warn(
                    FailureKind::ItemError,
                    format!(
                        "Skipping target {}: {} faces found, expected exactly one",
                        path.display(),
                        count
                    ),
                );
                return None;
            }
            reporter.warn(
                FailureKind::ItemError,
                format!(
                    "{} faces found in target {}; using the first",
                    count,
                    path.display()
                ),
            );
        }

        match faces.into_iter().next() {
            Some(encoding) => {
                reporter.info(format!("Loaded target face: {}", path.display()));
                Some(TargetEncoding {
                    source: path.to_path_buf(),
                    encoding,
                })
            }
            None => {
                reporter.warn(
                    FailureKind::ItemError,
                    format!("No face found in target image: {} (0 faces)", path.display()),
                );
                None
            }
        }
    }
}
