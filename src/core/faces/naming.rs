//! Collision-free destination names for copied matches.
//!
//! A taken name `photo.jpg` becomes `photo_1.jpg`, then `photo_2.jpg`, and
//! so on. Destinations are claimed with an exclusive create, so an existing
//! file is never overwritten even if another process races us.

use crate::error::MatchError;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// `{stem}_{counter}.{ext}`, or `{stem}_{counter}` without an extension
fn numbered_name(stem: &OsStr, extension: Option<&OsStr>, counter: usize) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!("_{}", counter));
    if let Some(ext) = extension {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Name to try on the given attempt; attempt 0 is the original name
fn candidate_name(file_name: &OsStr, attempt: usize) -> OsString {
    if attempt == 0 {
        return file_name.to_os_string();
    }
    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().unwrap_or(file_name);
    numbered_name(stem, as_path.extension(), attempt)
}

/// Copy `source` into `dir` under a fresh name, returning where it landed.
///
/// Contents, permissions and modification time are carried over. A copy
/// that fails halfway is removed again.
pub fn copy_to_unique(source: &Path, dir: &Path) -> Result<PathBuf, MatchError> {
    let copy_error = |to: &Path, source_err: io::Error| MatchError::Copy {
        from: source.to_path_buf(),
        to: to.to_path_buf(),
        source: source_err,
    };

    let file_name = source.file_name().ok_or_else(|| {
        copy_error(
            dir,
            io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
        )
    })?;

    let reader = File::open(source).map_err(|e| copy_error(dir, e))?;
    let metadata = reader.metadata().map_err(|e| copy_error(dir, e))?;

    let mut attempt = 0;
    let (destination, file) = loop {
        let destination = dir.join(candidate_name(file_name, attempt));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
        {
            Ok(file) => break (destination, file),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(copy_error(&destination, e)),
        }
    };

    if let Err(e) = copy_contents(reader, &metadata, file) {
        let _ = fs::remove_file(&destination);
        return Err(copy_error(&destination, e));
    }

    Ok(destination)
}

fn copy_contents(
    mut reader: File,
    metadata: &fs::Metadata,
    mut destination: File,
) -> io::Result<()> {
    io::copy(&mut reader, &mut destination)?;
    destination.set_modified(metadata.modified()?)?;
    destination.sync_all()?;
    destination.set_permissions(metadata.permissions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn free_name_is_kept() {
        let src_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("photo.jpg");
        fs::write(&source, b"a").unwrap();

        let dest = copy_to_unique(&source, out_dir.path()).unwrap();
        assert_eq!(dest, out_dir.path().join("photo.jpg"));
    }

    #[test]
    fn taken_names_get_the_next_free_counter() {
        let src_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("photo.jpg");
        fs::write(&source, b"c").unwrap();
        fs::write(out_dir.path().join("photo.jpg"), b"a").unwrap();
        fs::write(out_dir.path().join("photo_1.jpg"), b"b").unwrap();

        let dest = copy_to_unique(&source, out_dir.path()).unwrap();
        assert_eq!(dest, out_dir.path().join("photo_2.jpg"));
    }

    #[test]
    fn counter_goes_before_last_extension() {
        assert_eq!(
            candidate_name(OsStr::new("scan.tar.gz"), 3),
            OsString::from("scan.tar_3.gz")
        );
        assert_eq!(candidate_name(OsStr::new("README"), 1), OsString::from("README_1"));
    }

    #[test]
    fn copy_never_overwrites() {
        let src_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("photo.jpg");
        fs::write(&source, b"new").unwrap();
        fs::write(out_dir.path().join("photo.jpg"), b"old").unwrap();

        let dest = copy_to_unique(&source, out_dir.path()).unwrap();

        assert_eq!(dest, out_dir.path().join("photo_1.jpg"));
        assert_eq!(fs::read(out_dir.path().join("photo.jpg")).unwrap(), b"old");
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn copy_preserves_modification_time() {
        let src_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("old.png");
        fs::write(&source, b"pixels").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let dest = copy_to_unique(&source, out_dir.path()).unwrap();
        assert_eq!(fs::metadata(dest).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn missing_source_leaves_no_partial_copy() {
        let out_dir = TempDir::new().unwrap();
        let result = copy_to_unique(&out_dir.path().join("ghost.jpg"), out_dir.path());

        assert!(matches!(result, Err(MatchError::Copy { .. })));
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_source_elsewhere_claims_no_name() {
        let src_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        fs::write(out_dir.path().join("ghost.jpg"), b"kept").unwrap();

        let result = copy_to_unique(&src_dir.path().join("ghost.jpg"), out_dir.path());

        assert!(matches!(result, Err(MatchError::Copy { .. })));
        assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 1);
        assert_eq!(fs::read(out_dir.path().join("ghost.jpg")).unwrap(), b"kept");
    }
}
