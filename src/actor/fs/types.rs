/// What happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Which rebuild a watcher triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchScope {
    /// Source directories: rebuild the changed file alone
    SingleFile,
    /// Variable files, config file, template directories: rebuild everything
    Full,
}

impl WatchScope {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::SingleFile => "single-file",
            Self::Full => "full",
        }
    }
}
