//! FileSystem Actor
//!
//! Watches one scope of paths and sends debounced rebuild requests to the
//! RebuildActor. Watchers are attached once the initial build is done.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → Classifier (scope rules) → RebuildMsg
//! ```

use std::path::PathBuf;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::RebuildMsg;

// Scope rules (raw changes -> rebuild requests).
mod classifier;
// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

pub use types::WatchScope;

use classifier::EventClassifier;
use debouncer::Debouncer;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches one scope for file changes
pub struct FsActor {
    scope: WatchScope,
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    rebuild_tx: mpsc::Sender<RebuildMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Create the watcher and attach every existing path right away.
    pub fn new(
        scope: WatchScope,
        paths: Vec<PathBuf>,
        rebuild_tx: mpsc::Sender<RebuildMsg>,
    ) -> notify::Result<Self> {
        // notify has no async interface
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        crate::debug!("watch"; "{} scope: {} paths", scope.label(), paths.len());
        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            scope,
            notify_rx,
            watcher,
            watch_roots,
            rebuild_tx,
            debouncer: Debouncer::new(),
        })
    }

    /// Run the actor event loop until the rebuild actor goes away.
    pub async fn run(self) {
        let Self {
            scope,
            notify_rx,
            mut watcher,
            mut watch_roots,
            rebuild_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(mut raw) = debouncer.take_if_ready() else {
                        continue;
                    };
                    raw.retain(|path, _| watch_roots.covers(path));
                    let classified = EventClassifier::classify(raw, scope);
                    for dir in classified.new_dirs {
                        watch_roots.add(dir);
                    }
                    watch_roots.maintain(&mut watcher);

                    if send_all(&rebuild_tx, classified.messages).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Returns `Err(())` if the RebuildActor shut down.
async fn send_all(tx: &mpsc::Sender<RebuildMsg>, messages: Vec<RebuildMsg>) -> Result<(), ()> {
    for msg in messages {
        match &msg {
            RebuildMsg::File(path) => crate::debug!("watch"; "changed: {}", path.display()),
            RebuildMsg::Full => crate::debug!("watch"; "full rebuild requested"),
        }
        tx.send(msg).await.map_err(|_| ())?;
    }
    Ok(())
}
