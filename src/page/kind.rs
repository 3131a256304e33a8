//! Page content type.

use std::path::Path;

/// How a page's index file is rendered, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageType {
    Html,
    Markdown,
    /// Structured data (`.json` index)
    Data,
    #[default]
    Unknown,
}

impl PageType {
    pub fn from_index(index: &str) -> Self {
        let ext = Path::new(index)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("html") => Self::Html,
            Some("md") => Self::Markdown,
            Some("json") => Self::Data,
            _ => Self::Unknown,
        }
    }

    #[inline]
    pub fn is_markdown(self) -> bool {
        matches!(self, Self::Markdown)
    }
}
