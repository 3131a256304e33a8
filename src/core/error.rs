//! Build error taxonomy.
//!
//! Per-file failures (template, front matter, external tool) are recovered
//! by the walker and logged. Directory listing and configuration failures
//! abort the whole operation.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced while building or resolving the site.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` is not below `{}`", path.display(), root.display())]
    Path { path: PathBuf, root: PathBuf },

    #[error("template error in `{}`: {message}", path.display())]
    Template { path: PathBuf, message: String },

    #[error("invalid front matter in `{}`: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },

    #[error("cannot decode `{}`: {message}", path.display())]
    Data { path: PathBuf, message: String },

    #[error("`{tool}` failed on `{}`: {message}", path.display())]
    ExternalTool {
        tool: String,
        path: PathBuf,
        message: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("page not found for route {0}")]
    NotFound(String),
}

impl BuildError {
    /// Shorthand for wrapping an `io::Error` with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a tera failure, flattening its source chain into the message.
    pub fn template(path: impl Into<PathBuf>, err: &tera::Error) -> Self {
        Self::Template {
            path: path.into(),
            message: crate::logger::error_chain(err),
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
