//! Source tree → destination tree.
//!
//! ```text
//! walk ─► exclude? ─► Processor::select ─► PathMapper ─► cascade ─► tera / markdown ─► write
//! ```

pub mod cascade;
pub mod frontmatter;
pub mod markdown;
pub mod paths;
pub mod processor;
pub mod template;
mod walk;
pub mod write;

use std::path::Path;
use std::sync::Arc;

use regex::Regex;

pub use cascade::VARIABLES_FILE;
pub use frontmatter::VariableSet;
pub use paths::PathMapper;
pub use processor::{FileOutcome, Processor};
pub use template::TemplateEngine;
pub use walk::{BuildReport, build_all};

use crate::config::{ConfigError, SiteConfig};
use crate::core::{BuildError, BuildResult};
use crate::utils::path::{relative_below, to_slash};
use crate::{debug, log};

/// Everything a processor needs, prepared once per build.
pub struct BuildContext {
    pub config: Arc<SiteConfig>,
    pub mapper: PathMapper,
    pub templates: TemplateEngine,
    pub exclude: ExcludeRules,
}

impl BuildContext {
    pub fn new(config: Arc<SiteConfig>) -> BuildResult<Self> {
        let mapper = PathMapper::from_config(&config);
        let templates = TemplateEngine::load(&config.build.templates, &config.site.webroot)?;
        debug!("template"; "loaded [{}]", templates.template_names().join(", "));
        let exclude = ExcludeRules::new(&config.build.exclude)?;
        Ok(Self {
            config,
            mapper,
            templates,
            exclude,
        })
    }

    /// Resolve the variable cascade for one file.
    pub fn variables_for(&self, source: &Path, front_matter: &VariableSet) -> VariableSet {
        cascade::resolve(
            source,
            &self.config.build.source,
            &self.config.variables,
            front_matter,
        )
    }
}

/// Files that are never handed to a processor.
///
/// Patterns match the `/`-separated path relative to the source root, so
/// `^drafts/` excludes a whole directory and `\.bak$` a file type.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    patterns: Vec<Regex>,
}

impl ExcludeRules {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    ConfigError::Validation(format!("invalid exclude pattern `{p}`: {e}"))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Reason for skipping `rel_source_path`, if it is excluded.
    pub fn check(&self, rel_source_path: &Path) -> Option<String> {
        if rel_source_path.file_name().is_some_and(|n| n == VARIABLES_FILE) {
            return Some("variables file".to_string());
        }
        let rel = to_slash(rel_source_path);
        self.patterns
            .iter()
            .find(|re| re.is_match(&rel))
            .map(|re| format!("matches `{}`", re.as_str()))
    }
}

/// Run exclusion checks and the matching processor on a single file.
///
/// Used by the walker and by single-file rebuilds.
pub fn process_file(source: &Path, ctx: &BuildContext) -> BuildResult<FileOutcome> {
    let rel = relative_below(source, &ctx.config.build.source).ok_or_else(|| BuildError::Path {
        path: source.to_path_buf(),
        root: ctx.config.build.source.clone(),
    })?;

    if let Some(reason) = ctx.exclude.check(&rel) {
        debug!("skip"; "{} ({})", rel.display(), reason);
        return Ok(FileOutcome::skipped(reason));
    }

    let outcome = Processor::select(source).process(source, ctx)?;
    match &outcome {
        FileOutcome::Built { processor, dest } => {
            log!(processor; "{}", ctx.config.root_relative(dest).display());
        }
        FileOutcome::Skipped { reason } => {
            debug!("skip"; "{} ({})", rel.display(), reason);
        }
    }
    Ok(outcome)
}
