//! Source → destination path mapping.
//!
//! Every processed file gets one [`ProcessingFileInfo`] holding three path
//! families: the source tree, the destination tree and the web-facing
//! URLs under the webroot. Relative "back to root" fields are `.` for files
//! directly inside their root, never empty.
//!
//! ```text
//! src/blog/post.md   (source root: src, dest root: public, webroot: /docs)
//!
//! relSourcePath    blog/post.md        relDestPath       blog/post.html
//! relSourceDir     blog                relDestDir        blog
//! relSourceRoot    ..                  relDestRoot       ..
//! relWebPath       blog/post.html      absWebPath        /docs/blog/post.html
//! relWebDir        blog                absWebDir         /docs/blog
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::config::SiteConfig;
use crate::core::{BuildError, BuildResult};
use crate::utils::path::{join_web, relative_below, to_slash};

/// Extension swap applied to destination and web paths only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtRewrite {
    pub from: &'static str,
    pub to: &'static str,
}

impl ExtRewrite {
    pub const MARKDOWN: Self = Self { from: "md", to: "html" };
    pub const SCSS: Self = Self { from: "scss", to: "css" };

    /// Apply to `path` if its extension matches `from` (case-insensitive).
    fn apply(self, path: &Path) -> PathBuf {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(self.from) => path.with_extension(self.to),
            _ => path.to_path_buf(),
        }
    }
}

/// All path variants of one processed file.
///
/// Serialized with camelCase keys; templates see it as `paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingFileInfo {
    // source family
    pub root_source_dir: PathBuf,
    pub abs_source_path: PathBuf,
    pub abs_source_dir: PathBuf,
    pub rel_source_path: PathBuf,
    pub rel_source_dir: PathBuf,
    pub rel_source_root: PathBuf,

    // destination family
    pub root_dest_dir: PathBuf,
    pub abs_dest_path: PathBuf,
    pub abs_dest_dir: PathBuf,
    pub rel_dest_path: PathBuf,
    pub rel_dest_dir: PathBuf,
    pub rel_dest_root: PathBuf,

    // web family
    pub webroot: String,
    pub rel_web_path: String,
    pub rel_web_dir: String,
    pub rel_web_path_to_root: String,
    pub abs_web_path: String,
    pub abs_web_dir: String,
}

/// Computes [`ProcessingFileInfo`] for files below one source root.
#[derive(Debug, Clone)]
pub struct PathMapper {
    root_source_dir: PathBuf,
    root_dest_dir: PathBuf,
    webroot: String,
}

impl PathMapper {
    pub fn new(
        root_source_dir: impl Into<PathBuf>,
        root_dest_dir: impl Into<PathBuf>,
        webroot: impl Into<String>,
    ) -> Self {
        Self {
            root_source_dir: root_source_dir.into(),
            root_dest_dir: root_dest_dir.into(),
            webroot: webroot.into(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.build.source, &config.build.dest, &config.site.webroot)
    }

    /// Compute the paths of `source_file` without touching the filesystem.
    ///
    /// Fails with [`BuildError::Path`] when the file is not below the
    /// source root.
    pub fn compute(
        &self,
        source_file: &Path,
        rewrite: Option<ExtRewrite>,
    ) -> BuildResult<ProcessingFileInfo> {
        let rel_source_path = relative_below(source_file, &self.root_source_dir)
            .filter(|rel| !rel.as_os_str().is_empty())
            .ok_or_else(|| BuildError::Path {
                path: source_file.to_path_buf(),
                root: self.root_source_dir.clone(),
            })?;

        let rel_source_dir = parent_or_empty(&rel_source_path);
        let rel_dest_path = match rewrite {
            Some(rewrite) => rewrite.apply(&rel_source_path),
            None => rel_source_path.clone(),
        };
        let rel_dest_dir = parent_or_empty(&rel_dest_path);

        let rel_web_path = to_slash(&rel_dest_path);
        let rel_web_dir = dot_if_empty_str(to_slash(&rel_dest_dir));

        Ok(ProcessingFileInfo {
            root_source_dir: self.root_source_dir.clone(),
            abs_source_path: self.root_source_dir.join(&rel_source_path),
            abs_source_dir: self.root_source_dir.join(&rel_source_dir),
            rel_source_root: up_to_root(&rel_source_dir),
            rel_source_dir: dot_if_empty(rel_source_dir),
            rel_source_path,

            root_dest_dir: self.root_dest_dir.clone(),
            abs_dest_path: self.root_dest_dir.join(&rel_dest_path),
            abs_dest_dir: self.root_dest_dir.join(&rel_dest_dir),
            rel_dest_root: up_to_root(&rel_dest_dir),
            rel_dest_dir: dot_if_empty(rel_dest_dir.clone()),
            rel_dest_path,

            webroot: self.webroot.clone(),
            abs_web_path: join_web(&self.webroot, &rel_web_path),
            abs_web_dir: join_web(&self.webroot, &rel_web_dir),
            rel_web_path_to_root: to_slash(&up_to_root(&rel_dest_dir)),
            rel_web_path,
            rel_web_dir,
        })
    }

    /// Compute the paths and make sure the destination directory exists.
    pub fn map(
        &self,
        source_file: &Path,
        rewrite: Option<ExtRewrite>,
    ) -> BuildResult<ProcessingFileInfo> {
        let info = self.compute(source_file, rewrite)?;
        fs::create_dir_all(&info.abs_dest_dir)
            .map_err(|err| BuildError::io(&info.abs_dest_dir, err))?;
        Ok(info)
    }
}

fn parent_or_empty(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn dot_if_empty(path: PathBuf) -> PathBuf {
    if path.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        path
    }
}

fn dot_if_empty_str(path: String) -> String {
    if path.is_empty() { ".".to_string() } else { path }
}

/// `a/b` → `../..`, empty → `.`
fn up_to_root(rel_dir: &Path) -> PathBuf {
    let depth = rel_dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    if depth == 0 {
        return PathBuf::from(".");
    }
    std::iter::repeat_n("..", depth).collect()
}
