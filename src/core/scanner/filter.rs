//! Path classification tables and the pure classifier built on them.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".heic", ".bmp", ".gif", ".tif", ".tiff", ".heif", ".raw", ".arw",
    ".cr2", ".nef", ".orf", ".sr2", ".dng", ".psd", ".jp2",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv", ".webm", ".3gp", ".mpeg", ".mpg", ".m4v",
    ".mts", ".m2ts", ".ts", ".ogv", ".divx",
];

/// Directory name fragments that prune a whole subtree
const SKIP_SUBSTRINGS: &[&str] = &[
    "TECHTOOLS",
    ".Applications",
    ".Trash",
    "com.apple",
    ".spotlight-V100",
    ".fseventsd",
    ".documentRevisions-V100",
    "$Recyle.Bin",
    "Program Files",
    "Program Files (x86)",
    "AppData",
    "Temp",
    "ProgramData",
    "_MACOSX",
    ".cache",
    ".config",
    ".local",
    "Library",
    "node_modules",
    "venv",
    ".venv",
    ".git",
    ".svn",
    ".hg",
    ".OneDriveTemp",
    "OneDrive - Personal",
    "Recycle.Bin",
    ".thumbnails",
    "lost+found",
    "$WinREAgent",
];

const JUNK_SUFFIXES: &[&str] = &[
    ".ds_store", ".tmp", ".log", ".ini", ".plist", ".db", ".thumbnails", ".lnk", ".exe", ".dll",
    ".sys", ".bak", ".swp", ".crdownload", ".part", ".icloud", ".trashinfo", ".desktop.ini",
    ".thumbs.db", ".msi", ".cab", ".gx", ".xz", ".tar", ".zip", ".nfo", ".sfv", ".apk", ".obb",
    ".ipa", ".torrent", ".aria2", ".idx", ".sub", ".srt", ".lock", ".old", ".db-journal",
    ".log1", ".log2",
];

/// What a file name classifies as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileClass {
    Image,
    Video,
    /// Explicitly excluded, even if it also carries a media extension
    Junk,
    Unclassified,
}

/// Immutable skip/junk/extension tables.
///
/// All entries are stored lower-case; every lookup is a case-insensitive
/// match. Image and video extensions never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationTables {
    skip_substrings: Vec<String>,
    junk_suffixes: Vec<String>,
    image_extensions: BTreeSet<String>,
    video_extensions: BTreeSet<String>,
}

/// On-disk shape of a tables override file. Missing fields keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TablesFile {
    skip_substrings: Option<Vec<String>>,
    junk_suffixes: Option<Vec<String>>,
    image_extensions: Option<Vec<String>>,
    video_extensions: Option<Vec<String>>,
}

impl ClassificationTables {
    /// Build validated tables from arbitrary entries
    pub fn new<S: AsRef<str>>(
        skip_substrings: &[S],
        junk_suffixes: &[S],
        image_extensions: &[S],
        video_extensions: &[S],
    ) -> Result<Self, ConfigError> {
        let image_extensions: BTreeSet<String> = normalize(image_extensions)?.into_iter().collect();
        let video_extensions: BTreeSet<String> = normalize(video_extensions)?.into_iter().collect();

        if let Some(extension) = image_extensions.intersection(&video_extensions).next() {
            return Err(ConfigError::OverlappingExtensions {
                extension: extension.clone(),
            });
        }

        Ok(Self {
            skip_substrings: normalize(skip_substrings)?,
            junk_suffixes: normalize(junk_suffixes)?,
            image_extensions,
            video_extensions,
        })
    }

    /// Load tables from a JSON file; absent fields fall back to the defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: TablesFile = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let own = |list: Option<Vec<String>>, fallback: &[&str]| {
            list.unwrap_or_else(|| fallback.iter().map(|s| s.to_string()).collect())
        };

        Self::new(
            &own(file.skip_substrings, SKIP_SUBSTRINGS),
            &own(file.junk_suffixes, JUNK_SUFFIXES),
            &own(file.image_extensions, IMAGE_EXTENSIONS),
            &own(file.video_extensions, VIDEO_EXTENSIONS),
        )
    }

    /// True if any skip substring occurs anywhere in the path.
    ///
    /// Once a directory is skipped none of its descendants are visited.
    pub fn is_skipped_directory(&self, path: &Path) -> bool {
        let lower = path.to_string_lossy().to_lowercase();
        self.skip_substrings.iter().any(|skip| lower.contains(skip))
    }

    /// Junk wins over image, image over video
    pub fn classify_file(&self, name: &str) -> FileClass {
        let lower = name.to_lowercase();

        if self.junk_suffixes.iter().any(|junk| lower.ends_with(junk)) {
            FileClass::Junk
        } else if self.image_extensions.iter().any(|ext| lower.ends_with(ext)) {
            FileClass::Image
        } else if self.video_extensions.iter().any(|ext| lower.ends_with(ext)) {
            FileClass::Video
        } else {
            FileClass::Unclassified
        }
    }

    pub fn image_extensions(&self) -> &BTreeSet<String> {
        &self.image_extensions
    }

    pub fn video_extensions(&self) -> &BTreeSet<String> {
        &self.video_extensions
    }
}

impl Default for ClassificationTables {
    fn default() -> Self {
        let own = |list: &[&str]| list.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();
        Self {
            skip_substrings: own(SKIP_SUBSTRINGS),
            junk_suffixes: own(JUNK_SUFFIXES),
            image_extensions: own(IMAGE_EXTENSIONS).into_iter().collect(),
            video_extensions: own(VIDEO_EXTENSIONS).into_iter().collect(),
        }
    }
}

fn normalize<S: AsRef<str>>(entries: &[S]) -> Result<Vec<String>, ConfigError> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                Err(ConfigError::EmptyEntry)
            } else {
                Ok(entry.to_lowercase())
            }
        })
        .collect()
}
