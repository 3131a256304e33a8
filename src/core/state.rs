//! Process state for serve mode.
//!
//! Three orthogonal states:
//! - `HEALTHY`: Did the last full build succeed? (single-file rebuilds vs full retry)
//! - `BUSY`: Is a rebuild writing into the destination tree?
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Last full build succeeded
/// - `false`: Next change of any kind triggers a full rebuild
/// - `true`: Single-file changes rebuild just that file
static HEALTHY: AtomicBool = AtomicBool::new(false);

/// A rebuild is in progress
static BUSY: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

// =============================================================================
// HEALTHY state
// =============================================================================

/// Check if the last full build succeeded
pub fn is_healthy() -> bool {
    HEALTHY.load(Ordering::SeqCst)
}

/// Set the health state
pub fn set_healthy(healthy: bool) {
    HEALTHY.store(healthy, Ordering::SeqCst);
}

// =============================================================================
// BUSY state
// =============================================================================

/// Check if a rebuild is in progress
pub fn is_busy() -> bool {
    BUSY.load(Ordering::Acquire)
}

/// Mark rebuild as started
pub fn begin_update() {
    BUSY.store(true, Ordering::Release);
}

/// Mark rebuild as finished
pub fn end_update() {
    BUSY.store(false, Ordering::Release);
}

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a server has been registered:
/// - Before `register_server()`: exit immediately, nothing to wind down
/// - After `register_server()`: unblock the server and notify actors
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Serialize tests that flip the process-wide flags.
#[cfg(test)]
pub fn lock_state() -> parking_lot::MutexGuard<'static, ()> {
    static LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
    LOCK.lock()
}

// =============================================================================
// Tests
// =============================================================================
