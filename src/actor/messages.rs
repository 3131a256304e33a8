//! Actor message definitions.
//!
//! ```text
//! FsActor --RebuildMsg--> RebuildActor
//! ```

use std::path::PathBuf;

/// Messages to the rebuild actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildMsg {
    /// Rebuild exactly this source file
    File(PathBuf),
    /// Rebuild the whole source tree
    Full,
}

/// What one rebuild run does after queued messages are collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildBatch {
    Full,
    /// Distinct files in arrival order
    Files(Vec<PathBuf>),
}

impl RebuildBatch {
    /// Collapse queued messages: any `Full` wins, files are deduplicated.
    ///
    /// Returns `None` for an empty queue.
    pub fn collapse(messages: impl IntoIterator<Item = RebuildMsg>) -> Option<Self> {
        let mut files: Vec<PathBuf> = Vec::new();
        let mut any = false;
        for msg in messages {
            any = true;
            match msg {
                RebuildMsg::Full => return Some(Self::Full),
                RebuildMsg::File(path) => {
                    if !files.contains(&path) {
                        files.push(path);
                    }
                }
            }
        }
        any.then_some(Self::Files(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_empty() {
        assert_eq!(RebuildBatch::collapse(Vec::new()), None);
    }

    #[test]
    fn test_collapse_dedups_files() {
        let batch = RebuildBatch::collapse(vec![
            RebuildMsg::File("/s/b.html".into()),
            RebuildMsg::File("/s/a.md".into()),
            RebuildMsg::File("/s/b.html".into()),
        ]);
        assert_eq!(
            batch,
            Some(RebuildBatch::Files(vec!["/s/b.html".into(), "/s/a.md".into()]))
        );
    }

    #[test]
    fn test_collapse_full_wins() {
        let batch = RebuildBatch::collapse(vec![
            RebuildMsg::File("/s/a.md".into()),
            RebuildMsg::Full,
            RebuildMsg::File("/s/b.md".into()),
        ]);
        assert_eq!(batch, Some(RebuildBatch::Full));
    }
}
