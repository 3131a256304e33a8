//! Page tree built from `page.json` descriptors.
//!
//! The dev server resolves requests against it: the longest registered
//! route above a request path owns that request.

use std::sync::Arc;

use arc_swap::ArcSwap;

mod kind;
mod meta;
mod scan;
mod store;

pub use kind::PageType;
pub use meta::Metadata;
pub use scan::scan_pages;
pub use store::{PAGE_DESCRIPTOR, Page, PageMap};

/// Page tree shared by request handlers and the rebuild actor.
///
/// A rescan builds a new [`PageMap`] and swaps it in whole.
pub type SharedPages = Arc<ArcSwap<PageMap>>;

/// A JSON object map for storing arbitrary metadata fields.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
