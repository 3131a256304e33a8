//! Page descriptor metadata.
//!
//! `page.json` is free-form JSON. The fields the server cares about are
//! read through typed accessors that report a wrong type instead of
//! guessing.
//!
//! | Field           | Type                      | Default        |
//! |-----------------|---------------------------|----------------|
//! | `title`         | string                    | `""`           |
//! | `shortTitle`    | string                    | `""`           |
//! | `index`         | string                    | `"index.html"` |
//! | `template`      | string                    | `"index.html"` |
//! | `order`         | int, float or string      | none           |
//! | `enabled`       | bool                      | `true`         |
//! | `requiredUsers` | list of strings           | `[]`           |
//! | `metaTags`      | any                       | none           |

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::JsonMap;

/// A metadata field holding an unexpected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page metadata `{key}` must be {expected}")]
pub struct MetadataError {
    pub key: &'static str,
    pub expected: &'static str,
}

/// Sibling ordering hint. Only values of the same variant compare.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Order {
    /// `None` when the variants differ.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => Some(a.total_cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Decoded `page.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(JsonMap);

impl Metadata {
    pub const ORDER: &'static str = "order";
    pub const ENABLED: &'static str = "enabled";
    pub const REQUIRED_USERS: &'static str = "requiredUsers";

    pub fn new(map: JsonMap) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// String field, `None` when missing or not a string.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    #[cfg(test)]
    pub fn as_map(&self) -> &JsonMap {
        &self.0
    }

    pub fn order(&self) -> Result<Option<Order>, MetadataError> {
        let Some(value) = self.get(Self::ORDER) else {
            return Ok(None);
        };
        match value {
            Value::Number(n) => Ok(Some(match n.as_i64() {
                Some(i) => Order::Int(i),
                None => Order::Float(n.as_f64().unwrap_or(f64::NAN)),
            })),
            Value::String(s) => Ok(Some(Order::Text(s.clone()))),
            _ => Err(MetadataError {
                key: Self::ORDER,
                expected: "a number or a string",
            }),
        }
    }

    /// Disabled pages are not served. Missing means enabled.
    pub fn enabled(&self) -> Result<bool, MetadataError> {
        match self.get(Self::ENABLED) {
            None => Ok(true),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(MetadataError {
                key: Self::ENABLED,
                expected: "a boolean",
            }),
        }
    }

    /// Users allowed to see the page; `valid-user` admits any known user.
    pub fn required_users(&self) -> Result<Vec<String>, MetadataError> {
        const ERR: MetadataError = MetadataError {
            key: Metadata::REQUIRED_USERS,
            expected: "a list of strings",
        };
        match self.get(Self::REQUIRED_USERS) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or(ERR))
                .collect(),
            Some(_) => Err(ERR),
        }
    }
}
