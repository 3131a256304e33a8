//! Page tree storage.
//!
//! [`PageMap`] owns every [`Page`]. Parent and child links are route keys
//! into the same map, so a page never owns its relatives and the whole tree
//! is replaced at once when the site is rescanned.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{Metadata, PageType};
use crate::config::ConfigError;
use crate::core::{BuildError, BuildResult};
use crate::utils::path::join_web;
use crate::debug;

/// Descriptor file name marking a page directory.
pub const PAGE_DESCRIPTOR: &str = "page.json";

/// Default index and template file name.
const DEFAULT_INDEX: &str = "index.html";

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// `/`-rooted URL path including the webroot.
    pub route: String,
    pub page_type: PageType,
    pub title: String,
    pub short_title: String,
    /// Index file name inside `dir`.
    pub index: String,
    pub template: String,
    /// Directory holding the descriptor and the page's files.
    pub dir: PathBuf,
    pub metadata: Metadata,
    /// Route of the parent page.
    pub parent: Option<String>,
    /// Routes of the child pages, in display order.
    pub children: Vec<String>,
}

impl Page {
    /// Build a page from its decoded descriptor.
    pub fn new(route: impl Into<String>, dir: impl Into<PathBuf>, metadata: Metadata) -> Self {
        let text = |key: &str, default: &str| metadata.str(key).unwrap_or(default).to_string();
        let index = text("index", DEFAULT_INDEX);
        Self {
            route: route.into(),
            page_type: PageType::from_index(&index),
            title: text("title", ""),
            short_title: text("shortTitle", ""),
            template: text("template", DEFAULT_INDEX),
            index,
            dir: dir.into(),
            metadata,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index)
    }

    /// The rendered index file. Markdown indexes are served as their
    /// `.html` build output.
    pub fn rendered_index_path(&self) -> PathBuf {
        let path = self.index_path();
        if self.page_type.is_markdown() {
            path.with_extension("html")
        } else {
            path
        }
    }

    /// Whether `route` addresses the page itself rather than a file in it.
    pub fn is_page_route(&self, route: &str) -> bool {
        route == self.route
            || route == join_web(&self.route, PAGE_DESCRIPTOR)
            || route == join_web(&self.route, &self.index)
    }
}

/// All pages of a site, keyed by route.
#[derive(Debug, Clone, Default)]
pub struct PageMap {
    pages: BTreeMap<String, Page>,
    root: Option<String>,
}

impl PageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page, replacing one with the same route.
    ///
    /// Tree links are only valid again after [`PageMap::build_tree`].
    pub fn insert(&mut self, page: Page) {
        self.pages.insert(page.route.clone(), page);
    }

    #[cfg(test)]
    pub fn get(&self, route: &str) -> Option<&Page> {
        self.pages.get(route)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// The single parentless page, once the tree is built.
    pub fn root(&self) -> Option<&Page> {
        self.root.as_deref().and_then(|route| self.pages.get(route))
    }

    #[cfg(test)]
    pub fn parent(&self, page: &Page) -> Option<&Page> {
        page.parent.as_deref().and_then(|route| self.pages.get(route))
    }

    pub fn children<'a>(&'a self, page: &'a Page) -> impl Iterator<Item = &'a Page> + 'a {
        page.children
            .iter()
            .filter_map(|route| self.pages.get(route))
    }

    /// Nearest registered route at or above `route_path`.
    ///
    /// Drops one `/`-segment at a time: `/a/b/c` tries `/a/b/c`, `/a/b`,
    /// `/a`, then `/`.
    pub fn find_matching_route(&self, route_path: &str) -> BuildResult<&Page> {
        let mut parts: Vec<&str> = route_path.split('/').collect();
        while !parts.is_empty() {
            let joined = parts.join("/");
            let candidate = if joined.is_empty() { "/" } else { joined.as_str() };
            if let Some(page) = self.pages.get(candidate) {
                return Ok(page);
            }
            parts.pop();
        }
        Err(BuildError::NotFound(route_path.to_string()))
    }

    /// Wire parents and children, order siblings and find the root.
    ///
    /// Starts from cleared links, so calling it again gives the same tree.
    /// Fails when there is not exactly one parentless page (an empty map
    /// is fine and has no root).
    pub fn build_tree(&mut self) -> BuildResult<()> {
        for page in self.pages.values_mut() {
            page.parent = None;
            page.children.clear();
        }
        self.root = None;

        let routes: Vec<String> = self.pages.keys().cloned().collect();
        for route in &routes {
            let parent = match self.find_matching_route(parent_dir(route)) {
                Ok(parent) if parent.route != *route => parent.route.clone(),
                _ => continue,
            };
            debug!("page"; "{} -> parent {}", route, parent);
            if let Some(page) = self.pages.get_mut(route) {
                page.parent = Some(parent.clone());
            }
            if let Some(page) = self.pages.get_mut(&parent) {
                page.children.push(route.clone());
            }
        }

        for route in &routes {
            let Some(children) = self.pages.get_mut(route).map(|p| std::mem::take(&mut p.children))
            else {
                continue;
            };
            let children = self.sort_by_order(children);
            if let Some(page) = self.pages.get_mut(route) {
                page.children = children;
            }
        }

        self.root = self.find_root()?;
        Ok(())
    }

    /// Stable sort by `order` when every child has one of the same type.
    /// Otherwise the insertion order is kept.
    fn sort_by_order(&self, children: Vec<String>) -> Vec<String> {
        let orders: Vec<_> = children
            .iter()
            .map(|route| {
                self.pages
                    .get(route)
                    .and_then(|page| page.metadata.order().ok().flatten())
            })
            .collect();

        let Some(Some(first)) = orders.first() else {
            return children;
        };
        let uniform = orders
            .iter()
            .all(|order| order.as_ref().is_some_and(|o| o.same_kind(first)));
        if !uniform {
            return children;
        }

        let mut keyed: Vec<_> = orders.into_iter().zip(children).collect();
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => a.compare(b).unwrap_or(std::cmp::Ordering::Equal),
            _ => std::cmp::Ordering::Equal,
        });
        keyed.into_iter().map(|(_, route)| route).collect()
    }

    fn find_root(&self) -> BuildResult<Option<String>> {
        if self.pages.is_empty() {
            return Ok(None);
        }
        let roots: Vec<&str> = self
            .pages
            .values()
            .filter(|page| page.parent.is_none())
            .map(|page| page.route.as_str())
            .collect();
        match roots.as_slice() {
            [root] => Ok(Some((*root).to_string())),
            [] => Err(ConfigError::Validation("page tree has no root page".into()).into()),
            many => Err(ConfigError::Validation(format!(
                "page tree has {} root pages: {}",
                many.len(),
                many.join(", ")
            ))
            .into()),
        }
    }
}

/// `/a/b` → `/a`, `/a` → `/`
fn parent_dir(route: &str) -> &str {
    match route.rfind('/') {
        Some(0) => "/",
        Some(i) => &route[..i],
        None => ".",
    }
}
