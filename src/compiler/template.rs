//! Tera template engine setup.
//!
//! Named templates come from `build.templates` and are addressed by their
//! path relative to that directory (`post.html`, `partials/nav.html`).
//! Source bodies are registered next to them as `source/<relative path>`
//! so they can extend or include named templates.

use std::collections::HashMap;
use std::path::Path;

use tera::{Context, Tera, Value};

use super::frontmatter::VariableSet;
use super::paths::ProcessingFileInfo;
use crate::core::{BuildError, BuildResult};
use crate::utils::path::{join_web, to_slash};

/// Prefix under which source bodies are registered.
const SOURCE_PREFIX: &str = "source";

/// Loaded named templates plus the registered helper functions.
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every template below `dir`. A missing directory gives an
    /// engine without named templates.
    pub fn load(dir: &Path, webroot: &str) -> BuildResult<Self> {
        let mut tera = if dir.is_dir() {
            let glob = format!("{}/**/*", dir.display());
            Tera::new(&glob).map_err(|err| BuildError::template(dir, &err))?
        } else {
            Tera::default()
        };
        register_functions(&mut tera, webroot);
        Ok(Self { tera })
    }

    /// Names of the loaded named templates, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self
            .tera
            .get_template_names()
            .filter(|name| !name.starts_with(SOURCE_PREFIX))
            .collect();
        names.sort_unstable();
        names
    }

    /// Render a source file body.
    ///
    /// Auto-escaping follows the extension of `rel_source_path`: on for
    /// `.html`, off for `.md`.
    pub fn render_source(
        &self,
        rel_source_path: &Path,
        body: &str,
        context: &Context,
        source_file: &Path,
    ) -> BuildResult<String> {
        let name = format!("{SOURCE_PREFIX}/{}", to_slash(rel_source_path));
        let mut tera = self.tera.clone();
        tera.add_raw_template(&name, body)
            .map_err(|err| BuildError::template(source_file, &err))?;
        tera.render(&name, context)
            .map_err(|err| BuildError::template(source_file, &err))
    }

    /// Render a named template from the templates directory.
    pub fn render_named(
        &self,
        name: &str,
        context: &Context,
        source_file: &Path,
    ) -> BuildResult<String> {
        self.tera
            .render(name, context)
            .map_err(|err| BuildError::template(source_file, &err))
    }

    /// Output `content` unescaped. Used by markdown files without a
    /// `template` key.
    pub fn render_passthrough(context: &Context, source_file: &Path) -> BuildResult<String> {
        Tera::one_off("{{ content | safe }}", context, false)
            .map_err(|err| BuildError::template(source_file, &err))
    }
}

/// Base rendering context: `variables` and `paths`.
///
/// Templates named `*.html` are auto-escaped, and the escaper also encodes
/// `/`: `{{ paths.absWebDir }}` comes out as `&#x2F;docs`. Browsers decode
/// that in text and attribute values alike; write `{{ paths.absWebDir | safe }}`
/// where the raw form is needed, e.g. inside `<script>`.
pub fn page_context(variables: &VariableSet, paths: &ProcessingFileInfo) -> Context {
    let mut context = Context::new();
    context.insert("variables", variables);
    context.insert("paths", paths);
    context
}

// ============================================================================
// helper functions
// ============================================================================

fn register_functions(tera: &mut Tera, webroot: &str) {
    let root = webroot.to_string();
    tera.register_function(
        "webroot",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let path = string_arg(args, "webroot", "path")?;
            Ok(Value::String(join_web(&root, &path)))
        },
    );
    tera.register_function(
        "startsWith",
        |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let value = string_arg(args, "startsWith", "value")?;
            let prefix = string_arg(args, "startsWith", "prefix")?;
            Ok(Value::Bool(value.starts_with(&prefix)))
        },
    );
    tera.register_function(
        "endsWith",
        |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let value = string_arg(args, "endsWith", "value")?;
            let suffix = string_arg(args, "endsWith", "suffix")?;
            Ok(Value::Bool(value.ends_with(&suffix)))
        },
    );
}

fn string_arg(args: &HashMap<String, Value>, function: &str, key: &str) -> tera::Result<String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(tera::Error::msg(format!(
            "function `{function}` requires a `{key}` argument"
        ))),
    }
}
