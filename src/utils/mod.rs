//! Utility modules.

pub mod date;
pub mod exec;
pub mod mime;
pub mod password;
pub mod path;
pub mod plural;
