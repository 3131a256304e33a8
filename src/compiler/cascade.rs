//! Variable cascade.
//!
//! Merges, lowest priority first:
//!
//! 1. global `[variables]` from `site.toml`
//! 2. every `variables.yaml` from the source root down to the file's directory
//! 3. the file's own front matter
//!
//! Merging is a shallow key replacement; nested maps are never combined.

use std::fs;
use std::path::{Path, PathBuf};

use super::frontmatter::{VariableSet, parse_yaml_map};
use crate::core::{BuildError, BuildResult};
use crate::logger::error_chain;
use crate::utils::path::relative_below;
use crate::log;

/// Reserved per-directory variables file. Never copied to the output.
pub const VARIABLES_FILE: &str = "variables.yaml";

/// Resolve the effective variables of `source_file`.
///
/// A variables file that cannot be read or decoded is logged and skipped.
pub fn resolve(
    source_file: &Path,
    root_source_dir: &Path,
    global: &VariableSet,
    front_matter: &VariableSet,
) -> VariableSet {
    let mut variables = global.clone();

    for file in ancestor_variable_files(source_file, root_source_dir) {
        match load_variable_file(&file) {
            Ok(map) => merge(&mut variables, map),
            Err(err) => log!("error"; "{}", error_chain(&err)),
        }
    }

    merge(&mut variables, front_matter.clone());
    variables
}

/// Variables files that apply to `source_file`, root-most first.
pub fn ancestor_variable_files(source_file: &Path, root_source_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = source_file
        .ancestors()
        .skip(1)
        .take_while(|dir| relative_below(dir, root_source_dir).is_some())
        .map(|dir| dir.join(VARIABLES_FILE))
        .filter(|file| file.is_file())
        .collect();
    files.reverse();
    files
}

/// Read and decode one variables file.
pub fn load_variable_file(path: &Path) -> BuildResult<VariableSet> {
    let text = fs::read_to_string(path).map_err(|err| BuildError::io(path, err))?;
    parse_yaml_map(&text).map_err(|message| BuildError::Data {
        path: path.to_path_buf(),
        message,
    })
}

/// Later keys replace earlier ones.
fn merge(target: &mut VariableSet, overrides: VariableSet) {
    for (key, value) in overrides {
        target.insert(key, value);
    }
}
