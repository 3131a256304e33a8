//! `[build.scss]` section configuration.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// External SCSS compiler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScssConfig {
    /// Compiler binary, invoked as `<sass_bin> <source> <dest>`.
    pub sass_bin: String,
}

impl Default for ScssConfig {
    fn default() -> Self {
        Self {
            sass_bin: "sass".to_string(),
        }
    }
}

impl ScssConfig {
    pub const SASS_BIN: FieldPath = FieldPath::new("build.scss.sass_bin");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.sass_bin.trim().is_empty() {
            diag.error(Self::SASS_BIN, "compiler binary cannot be empty");
            return;
        }
        // Only stylesheets need it, so a missing binary is not fatal
        if which::which(&self.sass_bin).is_err() {
            diag.warn(
                Self::SASS_BIN,
                format!("`{}` not found in PATH, .scss files will fail", self.sass_bin),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_scss_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.scss.sass_bin, "sass");
    }

    #[test]
    fn test_scss_custom_bin() {
        let config = test_parse_config("[build.scss]\nsass_bin = \"/opt/dart-sass/sass\"");
        assert_eq!(config.build.scss.sass_bin, "/opt/dart-sass/sass");
    }
}
