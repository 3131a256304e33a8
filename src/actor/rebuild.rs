//! Rebuild Actor - the only writer of the destination tree in serve mode.
//!
//! Every rebuild request from both watchers goes through one bounded
//! channel. Whatever queued up while the previous batch ran is collapsed
//! into a single batch, and batches run one at a time on a blocking thread.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;

use super::messages::{RebuildBatch, RebuildMsg};
use crate::compiler::{BuildContext, BuildReport, build_all, process_file};
use crate::config::{SiteConfig, cfg, reload_config};
use crate::core::{BuildResult, begin_update, end_update, is_healthy, set_healthy};
use crate::logger::{error_chain, status_error, status_success};
use crate::page::{PAGE_DESCRIPTOR, PageMap, SharedPages, scan_pages};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Result of one executed batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Whether the whole tree was rebuilt
    pub full: bool,
    /// Files handed to the processors
    pub files: Vec<PathBuf>,
    pub report: BuildReport,
    /// Number of pages after a rescan, if one happened
    pub pages: Option<usize>,
}

pub struct RebuildActor {
    rx: mpsc::Receiver<RebuildMsg>,
    pages: SharedPages,
}

impl RebuildActor {
    pub fn new(rx: mpsc::Receiver<RebuildMsg>, pages: SharedPages) -> Self {
        Self { rx, pages }
    }

    /// Run until every sender is gone. Returns the number of batches run.
    pub async fn run(mut self) -> usize {
        let mut batches = 0;
        while let Some(first) = self.rx.recv().await {
            let mut queued = vec![first];
            while let Ok(msg) = self.rx.try_recv() {
                queued.push(msg);
            }
            let Some(batch) = RebuildBatch::collapse(queued) else {
                continue;
            };

            batches += 1;
            let pages = Arc::clone(&self.pages);
            if let Err(e) = tokio::task::spawn_blocking(move || apply(batch, &pages)).await {
                log!("error"; "rebuild task failed: {}", e);
                end_update();
            }
        }
        debug!("actor"; "rebuild actor stopped after {}", plural_count(batches, "rebuild"));
        batches
    }
}

/// Execute a batch against the live config and report the result.
fn apply(batch: RebuildBatch, pages: &ArcSwap<PageMap>) {
    begin_update();

    if batch == RebuildBatch::Full {
        match reload_config() {
            Ok(true) => log!("watch"; "config reloaded"),
            Ok(false) => {}
            Err(e) => {
                // previous config stays active
                status_error("config reload failed", &format!("{e:#}"));
                end_update();
                return;
            }
        }
    }

    let config = cfg();
    let healthy = is_healthy();
    match run_batch(batch, healthy, Arc::clone(&config), pages) {
        Ok(outcome) => {
            if outcome.full {
                set_healthy(outcome.report.is_success());
            }
            report_outcome(&outcome, &config);
        }
        Err(e) => {
            set_healthy(false);
            status_error("rebuild failed", &error_chain(&e));
        }
    }

    end_update();
}

/// Rebuild what `batch` asks for.
///
/// File batches become full rebuilds while the last full build is not
/// `healthy`. The page tree is rescanned after a full rebuild or when a
/// page descriptor changed.
pub fn run_batch(
    batch: RebuildBatch,
    healthy: bool,
    config: Arc<SiteConfig>,
    pages: &ArcSwap<PageMap>,
) -> BuildResult<BatchOutcome> {
    let ctx = BuildContext::new(Arc::clone(&config))?;

    let batch = match batch {
        RebuildBatch::Files(_) if !healthy => {
            debug!("watch"; "last full build failed, rebuilding everything");
            RebuildBatch::Full
        }
        other => other,
    };

    let mut outcome = match batch {
        RebuildBatch::Full => BatchOutcome {
            full: true,
            files: Vec::new(),
            report: build_all(&ctx)?,
            pages: None,
        },
        RebuildBatch::Files(files) => {
            let mut report = BuildReport::default();
            let files: Vec<_> = files.into_iter().filter(|f| f.is_file()).collect();
            for file in &files {
                report.record(file.clone(), process_file(file, &ctx));
            }
            BatchOutcome {
                full: false,
                files,
                report,
                pages: None,
            }
        }
    };

    let descriptor_changed = outcome
        .files
        .iter()
        .any(|f| f.file_name().is_some_and(|n| n == PAGE_DESCRIPTOR));
    if outcome.full || descriptor_changed {
        let map = if config.build.dest.is_dir() {
            scan_pages(&config.build.dest, &config.site.webroot)?
        } else {
            PageMap::new()
        };
        outcome.pages = Some(map.len());
        pages.store(Arc::new(map));
    }

    Ok(outcome)
}

fn report_outcome(outcome: &BatchOutcome, config: &SiteConfig) {
    if let Some(count) = outcome.pages {
        debug!("page"; "rescanned {}", plural_count(count, "page"));
    }

    let report = &outcome.report;
    if !report.is_success() {
        let detail = report
            .failed
            .iter()
            .map(|(path, message)| format!("{}: {}", config.root_relative(path).display(), message))
            .collect::<Vec<_>>()
            .join("\n");
        status_error(&format!("rebuild failed: {}", plural_count(report.errors(), "error")), &detail);
        return;
    }

    if outcome.full {
        status_success(&format!("full rebuild: {report}"));
    } else {
        let names = outcome
            .files
            .iter()
            .map(|f| config.root_relative(f).display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        status_success(&format!("rebuilt: {names}"));
    }
}
