//! Everything without a dedicated processor is copied unchanged.

use std::path::Path;

use super::{FileOutcome, Processor};
use crate::compiler::BuildContext;
use crate::compiler::write::copy_atomic;
use crate::core::BuildResult;

pub(super) fn process(source: &Path, ctx: &BuildContext) -> BuildResult<FileOutcome> {
    let paths = ctx.mapper.map(source, None)?;
    copy_atomic(source, &paths.abs_dest_path)?;
    Ok(FileOutcome::built(Processor::Raw, paths.abs_dest_path))
}
