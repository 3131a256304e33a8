//! Site configuration management for `site.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build] and [build.scss]
//! │   ├── serve      # [serve]
//! │   └── site       # [site]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section         | Purpose                                          |
//! |-----------------|--------------------------------------------------|
//! | `[site]`        | Webroot and users for protected pages            |
//! | `[build]`       | Source/dest trees, templates, exclude patterns   |
//! | `[serve]`       | Development server (interface, port, watch)      |
//! | `[variables]`   | Global variables, lowest level of the cascade    |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildSectionConfig, ServeConfig, SiteSectionConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "site.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing site.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site settings (webroot, users)
    #[serde(default)]
    pub site: SiteSectionConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Global template variables
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            cli: None,
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            site: SiteSectionConfig::default(),
            build: BuildSectionConfig::default(),
            serve: ServeConfig::default(),
            variables: Map::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root
    /// is the config file's parent directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(ConfigError::Validation(format!(
                "config file `{}` not found in this directory or any parent",
                cli.config.display()
            )));
        };
        Self::load_file(&config_path, Some(cli))
    }

    /// Load, finalize and validate a specific config file.
    pub fn load_file(path: &Path, cli: Option<&'static Cli>) -> Result<Self> {
        let mut config = Self::from_path(path)?;
        config.cli = cli;
        config.config_path = crate::utils::path::normalize_path(path);

        if let Some(cli) = cli {
            config.apply_cli_options(cli);
        }

        // Emptiness must be checked before relative paths get joined onto root
        config.validate_raw()?;
        config.finalize();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply global and command-specific CLI overrides.
    fn apply_cli_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        Self::update_option(&mut self.build.source, cli.source.as_ref());
        Self::update_option(&mut self.build.dest, cli.dest.as_ref());

        match &cli.command {
            Commands::Build { clean } => {
                Self::update_option(&mut self.build.clean, clean.as_ref());
            }
            Commands::Serve {
                interface,
                port,
                watch,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            Commands::Password { .. } => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve root and make every configured path absolute.
    fn finalize(&mut self) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.set_root(&crate::utils::path::normalize_path(&root));

        let root = self.root.clone();
        self.build.normalize(&root);
        self.site.normalize();
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate values that lose their meaning once normalized.
    fn validate_raw(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.build.validate_raw(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Validate the finalized configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&self.root, &mut diag);
        self.site.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML without touching the filesystem.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Build a finalized config around a site directory for tests.
///
/// `source` and `dest` are relative to `root`; `extra` is appended to
/// the generated TOML.
#[cfg(test)]
pub fn test_site_config(root: &Path, extra: &str) -> SiteConfig {
    let content = format!("[build]\nsource = \"src\"\ndest = \"public\"\n{extra}");
    let mut config = test_parse_config(&content);
    config.config_path = root.join(CONFIG_FILE);
    config.root = root.to_path_buf();
    config.build.source = root.join(&config.build.source);
    config.build.dest = root.join(&config.build.dest);
    config.build.templates = root.join(&config.build.templates);
    config.site.normalize();
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<SiteConfig, _> = toml::from_str("[build\nsource = \"src\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.site.webroot, "/");
        assert!(config.build.clean);
        assert_eq!(config.serve.port, 8080);
        assert!(config.variables.is_empty());
    }

    #[test]
    fn test_variables_table() {
        let config = test_parse_config(
            "[variables]\nsite_name = \"Docs\"\nyear = 2024\nnav = [\"a\", \"b\"]\n[variables.author]\nname = \"Kim\"",
        );
        assert_eq!(config.variables["site_name"], "Docs");
        assert_eq!(config.variables["year"], 2024);
        assert_eq!(config.variables["nav"][1], "b");
        assert_eq!(config.variables["author"]["name"], "Kim");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nsource = \"src\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.build.source, PathBuf::from("src"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_load_file_resolves_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[build]\nsource = \"src\"\ndest = \"public\"\n[site]\nwebroot = \"docs/\"",
        )
        .unwrap();

        let config = SiteConfig::load_file(&path, None).unwrap();
        assert!(config.build.source.is_absolute());
        assert!(config.build.source.ends_with("src"));
        assert!(config.build.dest.ends_with("public"));
        assert!(config.build.templates.ends_with("templates"));
        assert_eq!(config.site.webroot, "/docs");
        assert_eq!(config.root_relative(&config.build.dest), PathBuf::from("public"));
    }

    #[test]
    fn test_load_file_rejects_missing_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[build]\ndest = \"public\"").unwrap();

        let err = SiteConfig::load_file(&path, None).unwrap_err();
        let err = err.downcast::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::Diagnostics(_)));
    }

    #[test]
    fn test_load_file_rejects_same_source_and_dest() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[build]\nsource = \"site\"\ndest = \"site\"").unwrap();

        assert!(SiteConfig::load_file(&path, None).is_err());
    }

    #[test]
    fn test_load_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = SiteConfig::load_file(&dir.path().join(CONFIG_FILE), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }
}
