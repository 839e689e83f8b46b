//! Fail-soft JSON reads and atomic JSON writes for flat-file scan state.

use crate::error::CatalogError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// How a persisted state file was found at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    /// No file yet; the empty value is used
    Missing,
    /// Unreadable or unparsable; the empty value is used
    Corrupt { reason: String },
}

/// A value read from disk together with how it was read
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub status: LoadStatus,
}

/// Read a JSON file, falling back to `T::default()` on any problem
pub(crate) fn read_json_or_default<T>(path: &Path) -> Loaded<T>
where
    T: DeserializeOwned + Default,
{
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Loaded {
                value: T::default(),
                status: LoadStatus::Missing,
            }
        }
        Err(e) => {
            return Loaded {
                value: T::default(),
                status: LoadStatus::Corrupt {
                    reason: e.to_string(),
                },
            }
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => Loaded {
            value,
            status: LoadStatus::Loaded,
        },
        Err(e) => Loaded {
            value: T::default(),
            status: LoadStatus::Corrupt {
                reason: e.to_string(),
            },
        },
    }
}

/// Replace `path` with pretty-printed JSON.
///
/// The content goes to a temporary file in the same directory which is
/// then renamed over the target, so a crash never leaves a truncated file.
pub(crate) fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), CatalogError>
where
    T: Serialize + ?Sized,
{
    let write_error = |source: std::io::Error| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(write_error)?;

    let mut file = NamedTempFile::new_in(&parent).map_err(write_error)?;
    serde_json::to_writer_pretty(&mut file, value)
        .map_err(|e| CatalogError::Serialize(e.to_string()))?;
    file.write_all(b"\n").map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Loaded<Vec<String>> = read_json_or_default(&temp_dir.path().join("none.json"));

        assert!(loaded.value.is_empty());
        assert_eq!(loaded.status, LoadStatus::Missing);
    }

    #[test]
    fn garbage_reads_as_corrupt_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let loaded: Loaded<Vec<String>> = read_json_or_default(&path);

        assert!(loaded.value.is_empty());
        assert!(matches!(loaded.status, LoadStatus::Corrupt { .. }));
    }

    #[test]
    fn atomic_write_replaces_content_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");

        let mut first = BTreeMap::new();
        first.insert("a", 1);
        write_json_atomic(&path, &first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("b", 2);
        write_json_atomic(&path, &second).unwrap();

        let loaded: Loaded<BTreeMap<String, i32>> = read_json_or_default(&path);
        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value.get("b"), Some(&2));

        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
