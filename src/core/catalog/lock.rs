//! Single-writer guard for a catalog file.

use crate::error::CatalogError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive `<catalog>.lock` file, removed when dropped.
///
/// Two scans targeting the same catalog cannot both hold it. A lock left
/// behind by a crashed process must be deleted by hand.
#[derive(Debug)]
pub struct CatalogLock {
    path: PathBuf,
}

impl CatalogLock {
    pub fn acquire(catalog_path: &Path) -> Result<Self, CatalogError> {
        let path = Self::lock_path(catalog_path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CatalogError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(CatalogError::Busy { lock_path: path })
            }
            Err(source) => return Err(CatalogError::Write { path, source }),
        };

        // Owner pid, for whoever finds a stale lock
        let _ = writeln!(file, "{}", std::process::id());

        Ok(Self { path })
    }

    pub fn lock_path(catalog_path: &Path) -> PathBuf {
        let mut name = catalog_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
