//! Path and URL utilities.
//!
//! Pure functions for path manipulation.
//!
//! - [`fs`]: Filesystem paths (`normalize_path`, `relative_below`, `to_slash`)
//! - [`web`]: Web paths (`clean_web_path`, `join_web`)

pub mod fs;
pub mod web;

pub use fs::{normalize_path, relative_below, to_slash};
pub use web::{clean_web_path, join_web};
