//! Markdown files.
//!
//! 1. the body is rendered as a template (no auto-escaping)
//! 2. the result is converted to HTML
//! 3. the HTML is handed to the front matter's `template` as `content`,
//!    or output as is when there is none

use std::path::Path;

use serde_json::Value;

use super::{FileOutcome, Processor, parse_document, read_source};
use crate::compiler::frontmatter::VariableSet;
use crate::compiler::markdown;
use crate::compiler::paths::ExtRewrite;
use crate::compiler::template::{TemplateEngine, page_context};
use crate::compiler::write::write_atomic;
use crate::compiler::BuildContext;
use crate::core::{BuildError, BuildResult};

pub(super) fn process(source: &Path, ctx: &BuildContext) -> BuildResult<FileOutcome> {
    let text = read_source(source)?;
    let doc = parse_document(source, &text)?;
    let layout = layout_template(source, &doc.front_matter)?;
    let variables = ctx.variables_for(source, &doc.front_matter);
    let paths = ctx.mapper.map(source, Some(ExtRewrite::MARKDOWN))?;

    let mut context = page_context(&variables, &paths);
    let expanded = ctx
        .templates
        .render_source(&paths.rel_source_path, doc.body, &context, source)?;
    let content = markdown::render(&expanded);
    context.insert("content", content.trim_end_matches('\n'));

    let html = match layout {
        Some(name) => ctx.templates.render_named(name, &context, source)?,
        None => TemplateEngine::render_passthrough(&context, source)?,
    };

    write_atomic(&paths.abs_dest_path, html.as_bytes())?;
    Ok(FileOutcome::built(Processor::Markdown, paths.abs_dest_path))
}

/// The `template` key of the front matter, if set.
fn layout_template<'a>(source: &Path, front_matter: &'a VariableSet) -> BuildResult<Option<&'a str>> {
    match front_matter.get("template") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name.as_str())),
        Some(_) => Err(BuildError::FrontMatter {
            path: source.to_path_buf(),
            message: "`template` must be a string".to_string(),
        }),
    }
}
