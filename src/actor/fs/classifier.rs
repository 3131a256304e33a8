use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::debouncer::is_temp_file;
use super::types::{ChangeKind, WatchScope};
use crate::actor::messages::RebuildMsg;
use crate::compiler::VARIABLES_FILE;
use crate::utils::path::normalize_path;

/// Outcome of one debounced batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Classified {
    /// Rebuilds to request, at most one `Full`
    pub(super) messages: Vec<RebuildMsg>,
    /// Directories that appeared and need a watch of their own
    pub(super) new_dirs: Vec<PathBuf>,
}

/// Classifies raw debounced events into rebuild requests.
///
/// Pipeline: correct_by_existence → drop removals → expand created dirs → route by scope
pub(super) struct EventClassifier;

impl EventClassifier {
    pub(super) fn classify(raw: FxHashMap<PathBuf, ChangeKind>, scope: WatchScope) -> Classified {
        let mut changes = raw;
        Self::correct_by_existence(&mut changes);
        // Deleted sources leave their output in place; nothing to rebuild.
        changes.retain(|_, kind| *kind != ChangeKind::Removed);

        let mut paths: Vec<_> = changes.into_iter().collect();
        paths.sort_by(|a, b| a.0.cmp(&b.0));

        let mut result = Classified::default();
        let mut files = Vec::new();
        for (path, kind) in paths {
            if path.is_dir() {
                if kind == ChangeKind::Created {
                    Self::expand_created_dir(&path, &mut result.new_dirs, &mut files);
                }
            } else if path.is_file() {
                files.push(path);
            }
        }

        let full = match scope {
            WatchScope::Full => !files.is_empty() || !result.new_dirs.is_empty(),
            WatchScope::SingleFile => files.iter().any(|p| is_variables_file(p)),
        };
        result.messages = if full {
            vec![RebuildMsg::Full]
        } else {
            files.into_iter().map(RebuildMsg::File).collect()
        };
        result
    }

    /// Reconcile event kinds with actual filesystem state.
    ///
    /// The watcher may report stale events (e.g., Created for a file that's already
    /// been deleted, or Removed for a file that still exists after an atomic save).
    fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        let paths: Vec<_> = changes.keys().cloned().collect();
        for path in paths {
            let kind = changes[&path];
            let exists = path.exists();
            match kind {
                ChangeKind::Created if !exists => {
                    crate::debug!("watch"; "discard created (gone): {}", path.display());
                    changes.remove(&path);
                }
                ChangeKind::Modified if !exists => {
                    changes.insert(path, ChangeKind::Removed);
                }
                ChangeKind::Removed if exists => {
                    crate::debug!("watch"; "downgrade removed->modified: {}", path.display());
                    changes.insert(path, ChangeKind::Modified);
                }
                _ => {}
            }
        }
    }

    /// A new directory may already hold files (copied trees, `mkdir -p`
    /// followed by a write) whose events fired before it was watched.
    fn expand_created_dir(dir: &Path, new_dirs: &mut Vec<PathBuf>, files: &mut Vec<PathBuf>) {
        new_dirs.push(dir.to_path_buf());
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        let mut entries: Vec<_> = entries.flatten().map(|e| normalize_path(&e.path())).collect();
        entries.sort();

        for path in entries {
            if is_temp_file(&path) {
                continue;
            }
            if path.is_dir() {
                Self::expand_created_dir(&path, new_dirs, files);
            } else if path.is_file() {
                crate::debug!("watch"; "dir-scan found: {}", path.display());
                files.push(path);
            }
        }
    }
}

/// A variable file changes the cascade of a whole subtree.
fn is_variables_file(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == VARIABLES_FILE)
}
