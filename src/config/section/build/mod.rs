//! `[build]` section configuration.
//!
//! Contains the source/destination trees and processing rules.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"              # Source tree (relative to site root)
//! dest = "public"             # Output tree (relative to site root)
//! templates = "templates"     # Named templates for markdown pages
//! exclude = ["^drafts/", "\\.bak$"]  # Regexes matched against the relative source path
//! clean = true                # Wipe `dest` before a full build
//!
//! [build.scss]
//! sass_bin = "sass"           # External SCSS compiler
//! ```

mod scss;

pub use scss::ScssConfig;

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Source tree. Required.
    pub source: PathBuf,

    /// Destination tree. Required.
    pub dest: PathBuf,

    /// Directory holding named templates.
    pub templates: PathBuf,

    /// Exclude patterns, matched against the `/`-separated path relative to `source`.
    pub exclude: Vec<String>,

    /// Remove `dest` before a full build.
    pub clean: bool,

    /// SCSS processor settings.
    pub scss: ScssConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            dest: PathBuf::new(),
            templates: PathBuf::from("templates"),
            exclude: Vec::new(),
            clean: true,
            scss: ScssConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    pub const SOURCE: FieldPath = FieldPath::new("build.source");
    pub const DEST: FieldPath = FieldPath::new("build.dest");
    pub const EXCLUDE: FieldPath = FieldPath::new("build.exclude");

    /// Checks that must run on the raw values, before paths become absolute.
    pub fn validate_raw(&self, diag: &mut ConfigDiagnostics) {
        if self.source.as_os_str().is_empty() {
            diag.error_with_hint(Self::SOURCE, "source path cannot be empty", "source = \"src\"");
        }
        if self.dest.as_os_str().is_empty() {
            diag.error_with_hint(Self::DEST, "destination path cannot be empty", "dest = \"public\"");
        }
    }

    /// Checks on the normalized (absolute) paths.
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if self.source.as_os_str().is_empty() || self.dest.as_os_str().is_empty() {
            return;
        }

        if self.source == self.dest {
            diag.error(Self::DEST, "source and destination path must not be the same");
        }
        if self.source == root {
            diag.error(Self::SOURCE, "source path must not be the site root");
        }
        if self.dest == root {
            diag.error(Self::DEST, "destination path must not be the site root");
        }
        if self.dest != self.source && self.dest.starts_with(&self.source) {
            diag.error_with_hint(
                Self::DEST,
                "destination path must not be inside the source tree",
                "every build would feed its own output back into the next one",
            );
        }

        for pattern in &self.exclude {
            if let Err(e) = Regex::new(pattern) {
                diag.error(Self::EXCLUDE, format!("invalid pattern `{pattern}`: {e}"));
            }
        }

        self.scss.validate(diag);
    }

    /// Make all paths absolute relative to `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.source = crate::config::util::resolve_config_path(&self.source, root);
        self.dest = crate::config::util::resolve_config_path(&self.dest, root);
        self.templates = crate::config::util::resolve_config_path(&self.templates, root);
    }
}
