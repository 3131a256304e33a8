//! Request path → file to serve.
//!
//! With no pages the destination tree is served as plain static files.
//! Otherwise the page owning the longest matching route decides: it may be
//! disabled, protected, or serve its index or a file from its directory.

use std::path::{Path, PathBuf};

use super::auth::{Access, authorize};
use super::path::{resolve_file, strip_webroot};
use crate::config::SiteConfig;
use crate::page::PageMap;

/// Where a request ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    NotFound(String),
    Unauthorized(String),
    /// Broken page metadata
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: Target,
    /// Authenticated user, for the access log
    pub user: Option<String>,
}

impl From<Target> for Resolution {
    fn from(target: Target) -> Self {
        Self { target, user: None }
    }
}

/// Resolve a normalized request path.
pub fn resolve(
    path: &str,
    authorization: Option<&str>,
    config: &SiteConfig,
    pages: &PageMap,
) -> Resolution {
    let Some(rel) = strip_webroot(path, &config.site.webroot) else {
        return Target::NotFound(format!("{path} is outside of {}", config.site.webroot)).into();
    };

    if pages.is_empty() {
        return static_file(rel, &config.build.dest, path).into();
    }

    let page = match pages.find_matching_route(path) {
        Ok(page) => page,
        Err(e) => return Target::NotFound(e.to_string()).into(),
    };

    match page.metadata.enabled() {
        Ok(true) => {}
        Ok(false) => return Target::NotFound(format!("page {} is disabled", page.route)).into(),
        Err(e) => return Target::Error(format!("{}: {e}", page.route)).into(),
    }

    let required = match page.metadata.required_users() {
        Ok(required) => required,
        Err(e) => return Target::Error(format!("{}: {e}", page.route)).into(),
    };
    let access = authorize(&required, authorization, &config.site.users);
    if access == Access::Denied {
        return Target::Unauthorized(format!("authentication required for {}", page.route)).into();
    }
    let user = access.user().map(str::to_string);

    let target = if page.is_page_route(path) {
        let index = page.rendered_index_path();
        if index.is_file() {
            Target::File(index)
        } else {
            Target::NotFound(format!("page {} has no index file", page.route))
        }
    } else {
        let sub = path.strip_prefix(page.route.as_str()).unwrap_or(path);
        static_file(sub, &page.dir, path)
    };
    Resolution { target, user }
}

fn static_file(rel: &str, root: &Path, path: &str) -> Target {
    match resolve_file(rel, root) {
        Some(file) => Target::File(file),
        None => Target::NotFound(format!("no file for {path}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use crate::page::scan_pages;
    use crate::utils::password::PasswordDigest;
    use crate::utils::path::normalize_path;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::fs;
    use tempfile::TempDir;

    struct Served {
        _dir: TempDir,
        dest: PathBuf,
        config: SiteConfig,
        pages: PageMap,
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn served(webroot: &str, with_pages: bool) -> Served {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        let digest = PasswordDigest::generate("wonder");
        let config = test_site_config(
            &root,
            &format!("[site]\nwebroot = \"{webroot}\"\n[site.users]\nalice = \"{digest}\"\n"),
        );
        let dest = config.build.dest.clone();

        write(&dest, "index.html", "home");
        write(&dest, "css/site.css", "body{}");
        write(&dest, "docs/index.html", "docs");
        write(&dest, "docs/guide.html", "guide");
        write(&dest, "docs/intro/index.html", "intro");
        write(&dest, "secret/index.html", "secret");
        write(&dest, "old/index.html", "old");
        if with_pages {
            write(&dest, "page.json", r#"{"title": "Home"}"#);
            write(&dest, "docs/page.json", r#"{"title": "Docs", "index": "index.md"}"#);
            write(&dest, "docs/index.html", "docs rendered");
            write(&dest, "secret/page.json", r#"{"title": "S", "requiredUsers": ["alice"]}"#);
            write(&dest, "old/page.json", r#"{"title": "Old", "enabled": false}"#);
        }

        let pages = scan_pages(&dest, &config.site.webroot).unwrap();
        Served {
            _dir: dir,
            dest,
            config,
            pages,
        }
    }

    impl Served {
        fn get(&self, path: &str) -> Target {
            self.resolve(path, None).target
        }

        fn resolve(&self, path: &str, auth: Option<&str>) -> Resolution {
            resolve(path, auth, &self.config, &self.pages)
        }

        fn file(&self, rel: &str) -> Target {
            Target::File(self.dest.join(rel).canonicalize().unwrap())
        }
    }

    #[test]
    fn test_static_serving_without_pages() {
        let site = served("/", false);
        assert!(site.pages.is_empty());
        assert_eq!(site.get("/"), site.file("index.html"));
        assert_eq!(site.get("/css/site.css"), site.file("css/site.css"));
        assert_eq!(site.get("/docs/intro"), site.file("docs/intro/index.html"));
        assert!(matches!(site.get("/nope.html"), Target::NotFound(_)));
    }

    #[test]
    fn test_webroot_prefix() {
        let site = served("/site", false);
        assert_eq!(site.get("/site"), site.file("index.html"));
        assert_eq!(site.get("/site/docs/guide.html"), site.file("docs/guide.html"));
        assert!(matches!(site.get("/docs/guide.html"), Target::NotFound(_)));
    }

    #[test]
    fn test_page_routes() {
        let site = served("/", true);
        // markdown index is served as its rendered html
        assert_eq!(site.get("/docs"), Target::File(site.dest.join("docs/index.html")));
        assert_eq!(site.get("/docs/index.md"), Target::File(site.dest.join("docs/index.html")));
        assert_eq!(site.get("/docs/page.json"), Target::File(site.dest.join("docs/index.html")));
        assert_eq!(site.get("/"), Target::File(site.dest.join("index.html")));
    }

    #[test]
    fn test_files_below_page() {
        let site = served("/", true);
        assert_eq!(site.get("/docs/guide.html"), site.file("docs/guide.html"));
        // no page at /docs/intro: the /docs page serves its directory
        assert_eq!(site.get("/docs/intro"), site.file("docs/intro/index.html"));
        assert_eq!(site.get("/css/site.css"), site.file("css/site.css"));
        assert!(matches!(site.get("/docs/missing.png"), Target::NotFound(_)));
    }

    #[test]
    fn test_disabled_page() {
        let site = served("/", true);
        assert!(matches!(site.get("/old"), Target::NotFound(_)));
        assert!(matches!(site.get("/old/index.html"), Target::NotFound(_)));
    }

    #[test]
    fn test_protected_page() {
        let site = served("/", true);
        assert!(matches!(site.get("/secret"), Target::Unauthorized(_)));

        let header = format!("Basic {}", STANDARD.encode("alice:wonder"));
        let resolution = site.resolve("/secret", Some(&header));
        assert_eq!(resolution.target, Target::File(site.dest.join("secret/index.html")));
        assert_eq!(resolution.user.as_deref(), Some("alice"));

        let header = format!("Basic {}", STANDARD.encode("alice:nope"));
        assert!(matches!(
            site.resolve("/secret/index.html", Some(&header)).target,
            Target::Unauthorized(_)
        ));
    }

    #[test]
    fn test_odd_segments_keep_protection() {
        use super::super::path::request_path;

        let site = served("/", true);
        let get = |url: &str| site.get(&request_path(url).unwrap());
        assert!(matches!(get("//secret/index.html"), Target::Unauthorized(_)));
        assert!(matches!(get("/./secret/index.html"), Target::Unauthorized(_)));
        assert!(matches!(get("/secret//"), Target::Unauthorized(_)));
        assert!(matches!(get("//old/index.html"), Target::NotFound(_)));
        assert!(matches!(get("/./old"), Target::NotFound(_)));
    }

    #[test]
    fn test_broken_metadata_is_error() {
        let site = served("/", true);
        let dest = site.dest.clone();
        write(&dest, "bad/page.json", r#"{"title": "Bad", "enabled": "yes"}"#);
        let pages = scan_pages(&dest, "/").unwrap();
        let target = resolve("/bad", None, &site.config, &pages).target;
        assert!(matches!(target, Target::Error(_)));
    }
}
