//! `build` command.
//!
//! Phases:
//! - **Clean** - wipe the destination directory when `build.clean` is set
//! - **Walk** - run every source file through its processor
//! - **Report** - print the summary, fail if any file failed

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::compiler::{BuildContext, BuildReport, build_all};
use crate::config::SiteConfig;
use crate::log;
use crate::utils::plural::plural_count;

/// Build the site once. Fails on a hard error or when any file failed.
pub fn build_site(config: Arc<SiteConfig>) -> Result<()> {
    let report = run_build(config)?;
    log!("build"; "{}", report);
    if !report.is_success() {
        bail!("build finished with {} failed", plural_count(report.errors(), "file"));
    }
    Ok(())
}

/// Clean (if configured) and walk the whole source tree.
pub fn run_build(config: Arc<SiteConfig>) -> Result<BuildReport> {
    if config.build.clean {
        clean_dest(&config)?;
    }
    fs::create_dir_all(&config.build.dest)
        .with_context(|| format!("failed to create {}", config.build.dest.display()))?;

    let ctx = BuildContext::new(Arc::clone(&config))?;
    let report = build_all(&ctx)
        .with_context(|| format!("failed to build {}", config.build.source.display()))?;
    Ok(report)
}

/// Remove the destination directory, refusing paths whose removal would
/// take the project or the sources with it.
fn clean_dest(config: &SiteConfig) -> Result<()> {
    let dest = &config.build.dest;
    check_removable(dest, config.get_root(), &config.build.source)?;
    if !dest.exists() {
        return Ok(());
    }
    fs::remove_dir_all(dest)
        .with_context(|| format!("failed to clear destination directory: {}", dest.display()))?;
    crate::debug!("build"; "cleared {}", config.root_relative(dest).display());
    Ok(())
}

fn check_removable(dest: &Path, root: &Path, source: &Path) -> Result<()> {
    if dest == root || root.starts_with(dest) {
        bail!("refusing to clean {}: it contains the project root", dest.display());
    }
    if source.starts_with(dest) {
        bail!("refusing to clean {}: it contains the source directory", dest.display());
    }
    Ok(())
}
