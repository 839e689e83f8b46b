//! # Catalog Module
//!
//! The persisted set of known image and video paths, merged across scans.
//!
//! ## File Format
//! ```json
//! { "images": ["/photos/a.jpg"], "videos": ["/photos/b.mp4"] }
//! ```
//! Arrays are sorted. Missing or unparsable files load as an empty
//! catalog. Writes replace the file atomically.

mod lock;
mod store;

pub use lock::CatalogLock;
pub use store::{LoadStatus, Loaded};

pub(crate) use store::{read_json_or_default, write_json_atomic};

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Known media paths. A path is never in both sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCatalog {
    #[serde(default)]
    pub images: BTreeSet<String>,
    #[serde(default)]
    pub videos: BTreeSet<String>,
}

impl MediaCatalog {
    /// Union newly discovered paths into the catalog.
    ///
    /// A path that changed class since the last scan moves to its new set.
    pub fn absorb(&mut self, images: &[String], videos: &[String]) {
        for image in images {
            self.videos.remove(image);
        }
        for video in videos {
            self.images.remove(video);
        }
        self.images = merge(&self.images, images).into_iter().collect();
        self.videos = merge(&self.videos, videos).into_iter().collect();
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}

/// Set union of old and new, sorted lexicographically, without duplicates
pub fn merge(old: &BTreeSet<String>, new: &[String]) -> Vec<String> {
    let mut combined = old.clone();
    combined.extend(new.iter().cloned());
    combined.into_iter().collect()
}

/// Load a catalog; never fails
pub fn load_catalog(path: &Path) -> Loaded<MediaCatalog> {
    let mut loaded: Loaded<MediaCatalog> = read_json_or_default(path);

    // Hand-edited files may list a path twice; keep it as an image
    let MediaCatalog { images, videos } = &mut loaded.value;
    videos.retain(|video| !images.contains(video));

    loaded
}

/// Overwrite the catalog file with `catalog`
pub fn persist_catalog(catalog: &MediaCatalog, path: &Path) -> Result<(), CatalogError> {
    write_json_atomic(path, catalog)
}

/// The catalog key of a path, if it is representable as UTF-8
pub fn path_key(path: &Path) -> Option<String> {
    path.to_str().map(str::to_owned)
}
