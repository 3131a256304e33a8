//! Markdown to HTML using pulldown-cmark.
//!
//! On top of CommonMark:
//! - tables, footnotes, strikethrough, task lists, `{#id .class}` heading attributes
//! - automatic heading ids (`## Getting Started` → `id="getting-started"`)
//! - bare `http(s)://` URLs in text become links

use std::sync::LazyLock;

use pulldown_cmark::{
    CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html,
};
use regex::Regex;
use rustc_hash::FxHashMap;

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"'`]*[^\s<>"'`.,;:!?)\]]"#).expect("valid url pattern")
});

/// Options for markdown conversion
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// `# Heading {#custom-id}`
    pub heading_attributes: bool,
    /// Generate ids for headings that have none
    pub heading_ids: bool,
    /// Link bare URLs
    pub autolink: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            heading_ids: true,
            autolink: true,
        }
    }
}

impl MarkdownOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Render markdown with the default extension set.
pub fn render(markdown: &str) -> String {
    render_with(markdown, &MarkdownOptions::default())
}

pub fn render_with(markdown: &str, options: &MarkdownOptions) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(markdown, options.to_pulldown_options()));
    let mut events: Vec<Event> = parser.collect();

    if options.heading_ids {
        assign_heading_ids(&mut events);
    }
    if options.autolink {
        events = autolink(events);
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

// ============================================================================
// heading ids
// ============================================================================

/// Fill in missing heading ids; explicit ids are kept and reserved.
fn assign_heading_ids(events: &mut [Event]) {
    let mut used = FxHashMap::default();

    // explicit ids first so generated ones never collide with them
    for event in events.iter() {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            used.insert(id.to_string(), 0usize);
        }
    }

    for i in 0..events.len() {
        let Event::Start(Tag::Heading { id: None, .. }) = &events[i] else {
            continue;
        };
        let text = heading_text(&events[i + 1..]);
        let slug = unique_slug(&slugify(&text), &mut used);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Plain text of a heading, up to its end tag.
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Lower-case alphanumerics, every other run becomes a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

fn unique_slug(base: &str, used: &mut FxHashMap<String, usize>) -> String {
    let Some(&seen) = used.get(base) else {
        used.insert(base.to_string(), 0);
        return base.to_string();
    };
    let mut n = seen;
    loop {
        n += 1;
        let candidate = format!("{base}-{n}");
        if !used.contains_key(&candidate) {
            used.insert(base.to_string(), n);
            used.insert(candidate.clone(), 0);
            return candidate;
        }
    }
}

// ============================================================================
// autolink
// ============================================================================

/// Wrap bare URLs in text events with link tags. Text inside links,
/// images and code blocks is left alone.
fn autolink(events: Vec<Event>) -> Vec<Event> {
    let mut out = Vec::with_capacity(events.len());
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if link_depth == 0 && !in_code_block && BARE_URL.is_match(text) => {
                split_urls(text, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn split_urls<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for m in BARE_URL.find_iter(text) {
        if m.start() > last {
            out.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }
        let url = m.as_str().to_string();
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.clone()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(url)));
        out.push(Event::End(TagEnd::Link));
        last = m.end();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}
