//! Core types shared across the codebase.

mod error;
mod state;

pub use error::{BuildError, BuildResult};
pub use state::{
    begin_update, end_update, is_busy, is_healthy, is_shutdown, register_server, set_healthy,
    setup_shutdown_handler,
};

#[cfg(test)]
pub use state::lock_state;
