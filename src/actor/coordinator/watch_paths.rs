use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use crate::compiler::VARIABLES_FILE;
use crate::config::SiteConfig;

/// Every directory of the source tree, root first.
pub(super) fn single_file_paths(config: &SiteConfig) -> Vec<PathBuf> {
    directories(&config.build.source)
}

/// Variable files, the config file and every template directory.
pub(super) fn full_rebuild_paths(config: &SiteConfig) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(&config.build.source)
        .sort(true)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file() && e.file_name() == VARIABLES_FILE)
        .map(|e| e.path())
        .collect();

    if config.config_path.exists() {
        paths.push(config.config_path.clone());
    }
    paths.extend(directories(&config.build.templates));
    paths
}

fn directories(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    WalkDir::new(root)
        .sort(true)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use crate::utils::path::normalize_path;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, PathBuf, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        for rel in [
            "src/index.html",
            "src/variables.yaml",
            "src/blog/post.md",
            "src/blog/variables.yaml",
            "src/blog/2024/old.md",
            "templates/base.html",
            "templates/partials/nav.html",
            "site.toml",
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        let config = test_site_config(&root, "");
        (dir, root, config)
    }

    #[test]
    fn test_single_file_paths_are_source_dirs() {
        let (_dir, root, config) = site();
        assert_eq!(
            single_file_paths(&config),
            vec![root.join("src"), root.join("src/blog"), root.join("src/blog/2024")]
        );
    }

    #[test]
    fn test_full_rebuild_paths() {
        let (_dir, root, config) = site();
        assert_eq!(
            full_rebuild_paths(&config),
            vec![
                root.join("src/blog/variables.yaml"),
                root.join("src/variables.yaml"),
                root.join("site.toml"),
                root.join("templates"),
                root.join("templates/partials"),
            ]
        );
    }

    #[test]
    fn test_missing_templates_dir() {
        let (_dir, root, config) = site();
        fs::remove_dir_all(root.join("templates")).unwrap();
        let paths = full_rebuild_paths(&config);
        assert!(!paths.iter().any(|p| p.starts_with(root.join("templates"))));
    }
}
