//! Page discovery.
//!
//! Every directory holding a `page.json` becomes a page. Its route is the
//! directory's path below the scanned root, under the webroot.

use std::fs;
use std::path::Path;

use jwalk::WalkDir;
use serde_json::Value;

use super::{Metadata, Page, PageMap, PAGE_DESCRIPTOR};
use crate::core::{BuildError, BuildResult};
use crate::logger::error_chain;
use crate::utils::path::{join_web, relative_below, to_slash};
use crate::log;

impl PageMap {
    /// Register a page for every descriptor below `root_dir`.
    ///
    /// A walk failure aborts the scan. A descriptor that cannot be read or
    /// decoded is logged and skipped. Returns the number of pages added.
    pub fn examine(&mut self, root_dir: &Path, webroot: &str) -> BuildResult<usize> {
        if !root_dir.is_dir() {
            return Err(BuildError::io(
                root_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut added = 0;
        for entry in WalkDir::new(root_dir).sort(true) {
            let entry = entry.map_err(|err| {
                let path = err.path().map_or_else(|| root_dir.to_path_buf(), Path::to_path_buf);
                BuildError::io(path, std::io::Error::other(err.to_string()))
            })?;
            if !entry.file_type().is_file() || entry.file_name() != PAGE_DESCRIPTOR {
                continue;
            }

            let descriptor = entry.path();
            let Some(dir) = descriptor.parent() else {
                continue;
            };
            let Some(rel_dir) = relative_below(dir, root_dir) else {
                continue;
            };

            match load_descriptor(&descriptor) {
                Ok(metadata) => {
                    let route = join_web(webroot, &to_slash(&rel_dir));
                    self.insert(Page::new(route, dir, metadata));
                    added += 1;
                }
                Err(err) => log!("error"; "{}", error_chain(&err)),
            }
        }
        Ok(added)
    }
}

/// Scan `root_dir` and build the tree in one go.
pub fn scan_pages(root_dir: &Path, webroot: &str) -> BuildResult<PageMap> {
    let mut pages = PageMap::new();
    pages.examine(root_dir, webroot)?;
    pages.build_tree()?;
    Ok(pages)
}

fn load_descriptor(path: &Path) -> BuildResult<Metadata> {
    let text = fs::read_to_string(path).map_err(|err| BuildError::io(path, err))?;
    let data_error = |message: String| BuildError::Data {
        path: path.to_path_buf(),
        message,
    };
    match serde_json::from_str::<Value>(&text).map_err(|e| data_error(e.to_string()))? {
        Value::Object(map) => Ok(Metadata::new(map)),
        _ => Err(data_error("expected a JSON object".to_string())),
    }
}
