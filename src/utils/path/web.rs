//! Web (URL) path helpers.
//!
//! Web paths always use `/`, start with exactly one `/`, and carry no
//! trailing slash except for the bare root.

/// Collapse a web path to canonical form.
///
/// Resolves `.` and `..` segments lexically (never above the root) and
/// removes duplicate slashes.
///
/// # Examples
/// ```ignore
/// clean_web_path("")             -> "/"
/// clean_web_path("blog//post/")  -> "/blog/post"
/// clean_web_path("/a/./b/../c")  -> "/a/c"
/// ```
pub fn clean_web_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Join a relative web path onto a webroot and clean the result.
pub fn join_web(webroot: &str, rel: &str) -> String {
    clean_web_path(&format!("{webroot}/{rel}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_web_path() {
        assert_eq!(clean_web_path(""), "/");
        assert_eq!(clean_web_path("/"), "/");
        assert_eq!(clean_web_path("//"), "/");
        assert_eq!(clean_web_path("blog"), "/blog");
        assert_eq!(clean_web_path("/blog//post/"), "/blog/post");
        assert_eq!(clean_web_path("/a/./b/../c"), "/a/c");
        assert_eq!(clean_web_path("/../.."), "/");
    }

    #[test]
    fn test_join_web() {
        assert_eq!(join_web("/", "css/site.css"), "/css/site.css");
        assert_eq!(join_web("/docs", "css/site.css"), "/docs/css/site.css");
        assert_eq!(join_web("/docs/", "/css/"), "/docs/css");
        assert_eq!(join_web("/docs", "."), "/docs");
        assert_eq!(join_web("/", ""), "/");
    }
}
