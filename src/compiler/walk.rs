//! Full-tree build.
//!
//! Listing a directory is all-or-nothing: if any directory cannot be read
//! the whole build fails before a single file is processed. Failures of
//! individual files are logged and counted, and the walk goes on.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::{BuildContext, FileOutcome, process_file};
use crate::core::{BuildError, BuildResult};
use crate::logger::error_chain;
use crate::utils::plural::plural_count;
use crate::log;

/// OS metadata files never worth copying.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Outcome counts of one full build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub built: usize,
    pub skipped: usize,
    /// Source path and rendered error of every failed file.
    pub failed: Vec<(PathBuf, String)>,
}

impl BuildReport {
    pub fn errors(&self) -> usize {
        self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn record(&mut self, source: PathBuf, result: BuildResult<FileOutcome>) {
        match result {
            Ok(FileOutcome::Built { .. }) => self.built += 1,
            Ok(FileOutcome::Skipped { .. }) => self.skipped += 1,
            Err(err) => {
                let message = error_chain(&err);
                log!("error"; "{}: {}", source.display(), message);
                self.failed.push((source, message));
            }
        }
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "built {}, skipped {}, {}",
            plural_count(self.built, "file"),
            self.skipped,
            plural_count(self.errors(), "error")
        )
    }
}

/// Build every file below the source root.
///
/// Files are processed in parallel; the report lists them in walk order.
pub fn build_all(ctx: &BuildContext) -> BuildResult<BuildReport> {
    let mut files = Vec::new();
    collect_files(&ctx.config.build.source, &mut files)?;

    let results: Vec<_> = files
        .into_par_iter()
        .map(|file| {
            let result = process_file(&file, ctx);
            (file, result)
        })
        .collect();

    for (dest, sources) in shared_outputs(&results) {
        let sources: Vec<_> = sources.iter().map(|s| s.display().to_string()).collect();
        log!("warning"; "{} is written by {}", dest.display(), sources.join(" and "));
    }

    let mut report = BuildReport::default();
    for (file, result) in results {
        report.record(file, result);
    }
    Ok(report)
}

/// Outputs built from more than one source, in walk order.
fn shared_outputs(results: &[(PathBuf, BuildResult<FileOutcome>)]) -> Vec<(&Path, Vec<&Path>)> {
    let mut writers: FxHashMap<&Path, Vec<&Path>> = FxHashMap::default();
    let mut order = Vec::new();
    for (source, result) in results {
        if let Ok(FileOutcome::Built { dest, .. }) = result {
            let sources = writers.entry(dest.as_path()).or_default();
            if sources.is_empty() {
                order.push(dest.as_path());
            }
            sources.push(source.as_path());
        }
    }

    order
        .into_iter()
        .filter_map(|dest| {
            let sources = writers.remove(dest)?;
            (sources.len() > 1).then_some((dest, sources))
        })
        .collect()
}

/// Recursively list regular files, sorted per directory.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> BuildResult<()> {
    let mut entries = fs::read_dir(dir)
        .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
        .map_err(|err| BuildError::io(dir, err))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| BuildError::io(&path, err))?;

        if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() && !is_ignored(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| IGNORED_FILES.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::tests::fixture;

    #[test]
    fn test_build_all_mirrors_tree() {
        let site = fixture("[variables]\nsite = \"Docs\"\n");
        site.write("templates/post.html", "<article>{{ content | safe }}</article>");
        site.write("src/index.html", "<h1>{{ variables.site }}</h1>");
        site.write("src/variables.yaml", "section: home\n");
        site.write("src/blog/post.md", "---\ntemplate: post.html\n---\n# Hi\n");
        site.write("src/blog/page.json", "{\"title\": \"Blog\"}");
        site.write("src/img/logo.svg", "<svg/>");
        site.write("src/css/_base.scss", "$x: 1;");
        site.write("src/.DS_Store", "junk");

        let ctx = site.context();
        let report = build_all(&ctx).unwrap();

        assert_eq!(report.built, 4);
        // variables.yaml and the scss partial
        assert_eq!(report.skipped, 2);
        assert!(report.is_success());

        assert!(site.path("public/index.html").is_file());
        assert!(site.path("public/blog/post.html").is_file());
        assert!(site.path("public/blog/page.json").is_file());
        assert!(site.path("public/img/logo.svg").is_file());
        assert!(!site.path("public/variables.yaml").exists());
        assert!(!site.path("public/css/_base.css").exists());
        assert!(!site.path("public/.DS_Store").exists());
    }

    #[test]
    fn test_file_errors_do_not_stop_the_walk() {
        let site = fixture("");
        site.write("src/a.html", "{{ variables.nope }}");
        site.write("src/b.html", "<p>fine</p>");
        site.write("src/c/d.html", "{% endif %}");

        let ctx = site.context();
        let report = build_all(&ctx).unwrap();

        assert_eq!(report.built, 1);
        assert_eq!(report.errors(), 2);
        assert_eq!(report.failed[0].0, site.path("src/a.html"));
        assert_eq!(report.failed[1].0, site.path("src/c/d.html"));
        assert!(site.path("public/b.html").is_file());
        assert_eq!(report.to_string(), "built 1 file, skipped 0, 2 errors");
    }

    #[test]
    fn test_missing_source_is_hard_error() {
        let site = fixture("");
        std::fs::remove_dir_all(site.path("src")).unwrap();

        let ctx = site.context();
        let err = build_all(&ctx).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let site = fixture("");
        site.write("src/a.html", "<p>a</p>");
        site.write("src/locked/b.html", "<p>b</p>");
        let locked = site.path("src/locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permissions; nothing to check then
        let readable = std::fs::read_dir(&locked).is_ok();
        let ctx = site.context();
        let result = build_all(&ctx);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(BuildError::Io { .. })));
            assert!(!site.path("public/a.html").exists());
        }
    }

    #[test]
    fn test_sources_sharing_an_output() {
        let site = fixture("");
        site.write("src/a.md", "# from markdown");
        site.write("src/a.html", "<p>from html</p>");
        site.write("src/b.html", "<p>b</p>");

        let report = build_all(&site.context()).unwrap();
        assert_eq!(report.built, 3);
        assert!(report.is_success());

        let built = |source: &str, dest: &str| {
            let outcome = FileOutcome::Built {
                processor: "copy",
                dest: site.path(dest),
            };
            (site.path(source), Ok(outcome))
        };
        let results = vec![
            built("src/a.html", "public/a.html"),
            built("src/a.md", "public/a.html"),
            built("src/b.html", "public/b.html"),
        ];
        let shared = shared_outputs(&results);
        assert_eq!(shared.len(), 1);
        let (dest, sources) = &shared[0];
        assert_eq!(*dest, site.path("public/a.html"));
        assert_eq!(sources, &[site.path("src/a.html"), site.path("src/a.md")]);
    }

    #[test]
    fn test_report_display() {
        let report = BuildReport {
            built: 3,
            skipped: 1,
            failed: Vec::new(),
        };
        assert_eq!(report.to_string(), "built 3 files, skipped 1, 0 errors");
    }
}
