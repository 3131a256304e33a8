//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! webroot = "/docs"           # Prefix of every web path and page route
//!
//! [site.users]
//! alice = "blake3$9f1c...$5be0..."   # Generated with `pagewright password`
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::password::PasswordDigest;
use crate::utils::path::clean_web_path;

/// Site-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Web path prefix under which the site is served.
    pub webroot: String,

    /// Users allowed to log in to protected pages: name → password digest.
    pub users: BTreeMap<String, String>,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            webroot: "/".to_string(),
            users: BTreeMap::new(),
        }
    }
}

impl SiteSectionConfig {
    pub const USERS: FieldPath = FieldPath::new("site.users");

    /// Collapse the webroot to its canonical `/a/b` form.
    pub fn normalize(&mut self) {
        self.webroot = clean_web_path(&self.webroot);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (user, digest) in &self.users {
            if PasswordDigest::parse(digest).is_none() {
                diag.error_with_hint(
                    Self::USERS,
                    format!("malformed password digest for user `{user}`"),
                    "generate one with `pagewright password <password>`",
                );
            }
        }
    }
}
