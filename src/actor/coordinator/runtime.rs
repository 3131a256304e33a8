use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::actor::fs::FsActor;
use crate::actor::rebuild::RebuildActor;

/// How long a running rebuild may take to finish after shutdown.
const REBUILD_GRACE: Duration = Duration::from_secs(2);

/// Run all actors concurrently until shutdown or until one of them exits.
pub(super) async fn run_actors(
    single: FsActor,
    full: FsActor,
    rebuild: RebuildActor,
    shutdown_rx: Option<Receiver<()>>,
) {
    let single_handle = tokio::spawn(async move { single.run().await });
    let full_handle = tokio::spawn(async move { full.run().await });
    let rebuild_handle = tokio::spawn(async move { rebuild.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = single_handle => {}
            _ = full_handle => {}
        }
    }

    // Let a rebuild in flight finish writing dest
    let deadline = tokio::time::Instant::now() + REBUILD_GRACE;
    while crate::core::is_busy() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    rebuild_handle.abort();
}
