//! Front matter extraction and YAML map decoding.
//!
//! ```text
//! ---
//! title: Hello
//! template: post.html
//! ---
//! # body starts here
//! ```
//!
//! The opening line may be preceded by whitespace; both delimiter lines
//! are three or more dashes. Without a closing delimiter the whole text is
//! the body.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// A decoded key/value map (front matter or a variables file).
pub type VariableSet = Map<String, Value>;

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*-{3,}[ \t]*\r?\n(?:(.*?)\r?\n)?-{3,}[ \t]*(?:\r?\n|\z)(.*)\z")
        .expect("valid front matter pattern")
});

/// A source file split into its front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    pub front_matter: VariableSet,
    pub body: &'a str,
}

impl<'a> Document<'a> {
    /// Split `text`, decoding the front matter block if there is one.
    ///
    /// The error is the decoder message; callers attach the file path.
    pub fn parse(text: &'a str) -> Result<Self, String> {
        let Some(caps) = FRONT_MATTER.captures(text) else {
            return Ok(Self {
                front_matter: VariableSet::new(),
                body: text,
            });
        };

        let yaml = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());
        Ok(Self {
            front_matter: parse_yaml_map(yaml)?,
            body,
        })
    }
}

/// Decode YAML text that must be a mapping (or empty).
pub fn parse_yaml_map(text: &str) -> Result<VariableSet, String> {
    if text.trim().is_empty() {
        return Ok(VariableSet::new());
    }
    match serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(VariableSet::new()),
        other => Err(format!("expected a mapping, found {}", kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter() {
        let doc = Document::parse("---\ntitle: Hello\ntags: [a, b]\n---\n# Body\n").unwrap();
        assert_eq!(doc.front_matter["title"], "Hello");
        assert_eq!(doc.front_matter["tags"][1], "b");
        assert_eq!(doc.body, "# Body\n");
    }

    #[test]
    fn test_parse_without_front_matter() {
        let text = "<p>no preamble</p>\n---\nnot: yaml\n---\n";
        let doc = Document::parse(text).unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, text);
    }

    #[test]
    fn test_parse_unclosed_front_matter_is_body() {
        let text = "---\ntitle: x\nno closing line";
        let doc = Document::parse(text).unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, text);
    }

    #[test]
    fn test_parse_leading_whitespace_and_long_delimiters() {
        let doc = Document::parse("\n  -----\nx: 1\n-----\nrest").unwrap();
        assert_eq!(doc.front_matter["x"], 1);
        assert_eq!(doc.body, "rest");
    }

    #[test]
    fn test_parse_empty_front_matter() {
        let doc = Document::parse("---\n---\nbody").unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_parse_crlf() {
        let doc = Document::parse("---\r\nx: 1\r\n---\r\nbody").unwrap();
        assert_eq!(doc.front_matter["x"], 1);
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_closing_delimiter_at_end_of_text() {
        let doc = Document::parse("---\nx: 1\n---").unwrap();
        assert_eq!(doc.front_matter["x"], 1);
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let err = Document::parse("---\n- a\n- b\n---\nbody").unwrap_err();
        assert!(err.contains("list"));
        assert!(Document::parse("---\nx: [unclosed\n---\nbody").is_err());
    }

    #[test]
    fn test_parse_yaml_map() {
        assert!(parse_yaml_map("").unwrap().is_empty());
        assert!(parse_yaml_map("~").unwrap().is_empty());
        let map = parse_yaml_map("nested:\n  a: 1\n").unwrap();
        assert_eq!(map["nested"]["a"], 1);
        assert!(parse_yaml_map("just a string").is_err());
    }
}
