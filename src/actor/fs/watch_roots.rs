use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Watch-root consistency manager.
///
/// Every directory root is watched non-recursively; subdirectories are
/// roots of their own, so directories created later are attached as they
/// appear. Single files are watched through their parent directory: a watch
/// on the file itself would die with its inode when an editor saves by
/// renaming a fresh copy over it.
///
/// Responsibility:
/// - Attach existing roots at startup
/// - Attach roots added while running
/// - Re-attach roots that were removed and recreated
/// - Tell which event paths belong to the roots
pub(super) struct WatchRoots {
    /// Directories whose direct children are watched
    dirs: Vec<PathBuf>,
    /// Files watched through their parent directory
    files: FxHashSet<PathBuf>,
    /// Directories with a live watch
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    /// Paths that are not directories right now are treated as files.
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        let mut roots = Self {
            dirs: Vec::new(),
            files: FxHashSet::default(),
            attached: FxHashSet::default(),
        };
        for path in paths {
            if path.is_dir() {
                roots.add(path);
            } else {
                roots.files.insert(path);
            }
        }
        roots
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for target in self.targets() {
            if self.attached.contains(&target) {
                continue;
            }
            watcher.watch(&target, RecursiveMode::NonRecursive)?;
            self.attached.insert(target);
        }

        Ok(())
    }

    /// Remember a new directory root; it is attached on the next `maintain`.
    pub(super) fn add(&mut self, path: PathBuf) {
        if !self.dirs.contains(&path) {
            self.dirs.push(path);
        }
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for target in self.targets() {
            if self.attached.contains(&target) {
                continue;
            }

            if watcher.watch(&target, RecursiveMode::NonRecursive).is_ok() {
                crate::debug!("watch"; "attached watch: {}", target.display());
                self.attached.insert(target);
            }
        }
    }

    /// Whether a reported path is one of ours.
    ///
    /// Parent-directory watches of single files also report their siblings.
    pub(super) fn covers(&self, path: &Path) -> bool {
        self.files.contains(path)
            || self
                .dirs
                .iter()
                .any(|dir| dir == path || path.parent() == Some(dir.as_path()))
    }

    /// Existing directories to hand to the watcher.
    fn targets(&self) -> Vec<PathBuf> {
        let parents = self.files.iter().filter_map(|file| file.parent());
        let mut targets: Vec<PathBuf> = self
            .dirs
            .iter()
            .map(PathBuf::as_path)
            .chain(parents)
            .filter(|dir| dir.is_dir())
            .map(Path::to_path_buf)
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    #[cfg(test)]
    pub(super) fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    #[cfg(test)]
    pub(super) fn watch_targets(&self) -> Vec<PathBuf> {
        self.targets()
    }
}
