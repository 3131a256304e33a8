//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::utils::path::clean_web_path;

/// Request URL → decoded web path.
///
/// Drops query and fragment, percent-decodes, and collapses empty and `.`
/// segments and trailing slashes (`""` becomes `/`). Returns `None` for
/// undecodable paths and paths with `..` segments.
pub fn request_path(url: &str) -> Option<String> {
    let raw = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;

    // Reject paths with suspicious patterns early
    if decoded.split(['/', '\\']).any(|s| s == "..") || decoded.contains('\0') {
        return None;
    }

    // Route matching walks `/`-segments, so `//a` and `/./a` must become `/a`
    Some(clean_web_path(&decoded))
}

/// The part of `path` below `webroot`, without a leading `/`.
///
/// `None` when the path is outside the webroot.
pub fn strip_webroot<'a>(path: &'a str, webroot: &str) -> Option<&'a str> {
    if webroot == "/" {
        return Some(path.trim_start_matches('/'));
    }
    match path.strip_prefix(webroot)? {
        "" => Some(""),
        rest => rest.strip_prefix('/'),
    }
}

/// Resolve a relative web path to a file below `serve_root`, handling
/// `index.html` for directories.
pub fn resolve_file(rel: &str, serve_root: &Path) -> Option<PathBuf> {
    let local = serve_root.join(rel.trim_start_matches('/'));

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}
