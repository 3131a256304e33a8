//! Atomic output writes.
//!
//! Files are written next to their target under a hidden temporary name and
//! renamed into place, so the dev server never reads a half-written file.
//! Every write gets its own temporary name, so two sources mapped to the
//! same output (`a.md` and `a.html`) cannot trip over each other.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::{BuildError, BuildResult};

/// Write `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &[u8]) -> BuildResult<()> {
    let tmp = temp_path(path);
    if let Err(err) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(BuildError::io(path, err));
    }
    commit(&tmp, path)
}

/// Copy `source` to `dest` atomically.
pub fn copy_atomic(source: &Path, dest: &Path) -> BuildResult<()> {
    let tmp = temp_path(dest);
    if let Err(err) = fs::copy(source, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(BuildError::io(source, err));
    }
    commit(&tmp, dest)
}

fn commit(tmp: &Path, path: &Path) -> BuildResult<()> {
    fs::rename(tmp, path).map_err(|err| {
        let _ = fs::remove_file(tmp);
        BuildError::io(path, err)
    })
}

/// `dir/page.html` → `dir/.page.html.<pid>.<seq>.tmp`
fn temp_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");

        // no temp file left behind
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_copy_atomic() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.bin");
        let dest = dir.path().join("b.bin");
        fs::write(&src, [0u8, 1, 2, 255]).unwrap();

        copy_atomic(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), vec![0u8, 1, 2, 255]);
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = copy_atomic(&dir.path().join("missing"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = write_atomic(&dir.path().join("no/such/dir/a.html"), b"x").unwrap_err();
        assert!(err.to_string().contains("a.html"));
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let tmp = temp_path(Path::new("/out/blog/post.html"));
        assert_eq!(tmp.parent(), Some(Path::new("/out/blog")));
        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".post.html."));
        assert!(name.ends_with(".tmp"));

        assert_ne!(temp_path(Path::new("/out/a.html")), temp_path(Path::new("/out/a.html")));
    }

    #[test]
    fn test_concurrent_writes_to_one_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.html");

        std::thread::scope(|scope| {
            for writer in 0..8 {
                let path = &path;
                scope.spawn(move || {
                    for round in 0..25 {
                        write_atomic(path, format!("{writer}:{round}").as_bytes()).unwrap();
                    }
                });
            }
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with(":24"), "{content}");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
