//! Actor system for watch mode.
//!
//! Two watchers feed one rebuild worker over a bounded channel, so at most
//! one rebuild writes into the destination tree at a time:
//!
//! ```text
//! FsActor (single-file scope) ──┐
//!                               ├──► RebuildActor ──► dest tree + PageMap swap
//! FsActor (full scope) ─────────┘
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watchers with debouncing
//! - `rebuild` - Serialized rebuild worker
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod rebuild;

pub use coordinator::Coordinator;
