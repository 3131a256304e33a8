//! Per-file processors, chosen by extension.
//!
//! | Extension | Processor  | Output                                    |
//! |-----------|------------|-------------------------------------------|
//! | `.html`   | `html`     | body rendered as a template               |
//! | `.md`     | `markdown` | template pass, markdown, optional layout  |
//! | `.scss`   | `scss`     | external compiler, `_partials` skipped    |
//! | other     | `raw`      | byte copy                                 |

mod html;
mod markdown;
mod raw;
mod scss;

use std::fs;
use std::path::{Path, PathBuf};

use super::BuildContext;
use super::frontmatter::Document;
use crate::core::{BuildError, BuildResult};

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Built {
        processor: &'static str,
        dest: PathBuf,
    },
    Skipped {
        reason: String,
    },
}

impl FileOutcome {
    fn built(processor: Processor, dest: PathBuf) -> Self {
        Self::Built {
            processor: processor.name(),
            dest,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    Html,
    Markdown,
    Raw,
    Scss,
}

impl Processor {
    /// Dispatch on the lower-cased extension.
    pub fn select(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("html") => Self::Html,
            Some("md") => Self::Markdown,
            Some("scss") => Self::Scss,
            _ => Self::Raw,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Raw => "raw",
            Self::Scss => "scss",
        }
    }

    pub fn process(self, source: &Path, ctx: &BuildContext) -> BuildResult<FileOutcome> {
        match self {
            Self::Html => html::process(source, ctx),
            Self::Markdown => markdown::process(source, ctx),
            Self::Raw => raw::process(source, ctx),
            Self::Scss => scss::process(source, ctx),
        }
    }
}

fn read_source(source: &Path) -> BuildResult<String> {
    fs::read_to_string(source).map_err(|err| BuildError::io(source, err))
}

fn parse_document<'a>(source: &Path, text: &'a str) -> BuildResult<Document<'a>> {
    Document::parse(text).map_err(|message| BuildError::FrontMatter {
        path: source.to_path_buf(),
        message,
    })
}
