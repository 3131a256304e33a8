//! HTML files: the whole body is a template.

use std::path::Path;

use super::{FileOutcome, Processor, parse_document, read_source};
use crate::compiler::BuildContext;
use crate::compiler::template::page_context;
use crate::compiler::write::write_atomic;
use crate::core::BuildResult;

pub(super) fn process(source: &Path, ctx: &BuildContext) -> BuildResult<FileOutcome> {
    let text = read_source(source)?;
    let doc = parse_document(source, &text)?;
    let variables = ctx.variables_for(source, &doc.front_matter);
    let paths = ctx.mapper.map(source, None)?;

    let context = page_context(&variables, &paths);
    let html = ctx
        .templates
        .render_source(&paths.rel_source_path, doc.body, &context, source)?;

    write_atomic(&paths.abs_dest_path, html.as_bytes())?;
    Ok(FileOutcome::built(Processor::Html, paths.abs_dest_path))
}
