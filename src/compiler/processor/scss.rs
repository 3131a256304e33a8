//! SCSS through an external compiler (`sass <source> <dest>`).
//!
//! Files starting with `_` are partials: they are only pulled in by other
//! stylesheets and produce no output of their own.

use std::path::Path;

use super::{FileOutcome, Processor};
use crate::compiler::BuildContext;
use crate::compiler::paths::ExtRewrite;
use crate::core::{BuildError, BuildResult};
use crate::utils::exec::Cmd;

pub(super) fn process(source: &Path, ctx: &BuildContext) -> BuildResult<FileOutcome> {
    if is_partial(source) {
        return Ok(FileOutcome::skipped("scss partial"));
    }

    let paths = ctx.mapper.map(source, Some(ExtRewrite::SCSS))?;
    let sass = &ctx.config.build.scss.sass_bin;

    Cmd::new(sass)
        .arg(source)
        .arg(&paths.abs_dest_path)
        .run()
        .map_err(|err| BuildError::ExternalTool {
            tool: sass.clone(),
            path: source.to_path_buf(),
            message: format!("{err:#}"),
        })?;

    Ok(FileOutcome::built(Processor::Scss, paths.abs_dest_path))
}

fn is_partial(source: &Path) -> bool {
    source
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::tests::fixture;

    #[test]
    fn test_partial_is_skipped() {
        let site = fixture("");
        site.write("src/css/_base.scss", "$c: red;");

        let ctx = site.context();
        let outcome = process(&site.path("src/css/_base.scss"), &ctx).unwrap();
        assert_eq!(outcome, FileOutcome::skipped("scss partial"));
        assert!(!site.path("public/css/_base.css").exists());
        assert!(!site.path("public/css/_base.scss").exists());
    }

    #[test]
    fn test_missing_compiler_is_external_tool_error() {
        let site = fixture("[build.scss]\nsass_bin = \"pagewright-no-such-sass\"\n");
        site.write("src/css/site.scss", "body { color: red; }");

        let ctx = site.context();
        let err = process(&site.path("src/css/site.scss"), &ctx).unwrap_err();
        match err {
            BuildError::ExternalTool { tool, path, .. } => {
                assert_eq!(tool, "pagewright-no-such-sass");
                assert_eq!(path, site.path("src/css/site.scss"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_is_partial() {
        assert!(is_partial(Path::new("/s/_vars.scss")));
        assert!(!is_partial(Path::new("/s/main.scss")));
        assert!(!is_partial(Path::new("/s/_dir/main.scss")));
    }
}
