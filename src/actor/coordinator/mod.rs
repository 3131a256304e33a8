//! Actor Coordinator - wires up the watch-mode actor system
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates the rebuild channel
//! - Starts one watcher per scope
//! - Runs them concurrently with the rebuild actor

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, WatchScope};
use super::messages::RebuildMsg;
use super::rebuild::RebuildActor;
use crate::config::SiteConfig;
use crate::page::SharedPages;

/// Bound of the rebuild queue; watchers wait when it is full.
const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<SiteConfig>,
    pages: SharedPages,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<SiteConfig>, pages: SharedPages) -> Self {
        Self {
            config,
            pages,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(self) -> Result<()> {
        let (rebuild_tx, rebuild_rx) = mpsc::channel::<RebuildMsg>(CHANNEL_BUFFER);

        let single = FsActor::new(
            WatchScope::SingleFile,
            watch_paths::single_file_paths(&self.config),
            rebuild_tx.clone(),
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let full = FsActor::new(
            WatchScope::Full,
            watch_paths::full_rebuild_paths(&self.config),
            rebuild_tx,
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let rebuild = RebuildActor::new(rebuild_rx, Arc::clone(&self.pages));

        crate::debug!("actor"; "start");
        runtime::run_actors(single, full, rebuild, self.shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
