//! Custom indexer configuration schema.
//!
//! Field order and names are what the consuming custom indexer component
//! reads, so the serialized form must not drift.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while formatting or encoding a record.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Indexer record has no {0}")]
    MissingField(&'static str),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Config line has no '|' separator")]
    MissingSeparator,

    #[error("Config line payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Config line payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Config line id {line_id:?} does not match payload id {config_id:?}")]
    IdMismatch { line_id: String, config_id: String },
}

/// Configuration for one indexer, as consumed by the custom indexer component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedConfig {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub url: String,
    pub encoding: String,
    pub public: bool,
    pub proxy: bool,
    pub language: String,
    pub category: CategoryTable,
    pub search: SearchTemplate,
    pub torrents: TorrentRules,
}

/// Torznab categories offered per media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub movie: Vec<Category>,
    pub tv: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTemplate {
    pub paths: Vec<SearchPath>,
    pub params: SearchParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPath {
    pub path: String,
    pub method: String,
}

/// Query parameters; `{keyword}` and `{cat}` are substituted by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub t: String,
    pub q: String,
    pub cat: String,
    pub apikey: String,
}

/// How to pull torrents out of a Torznab RSS response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentRules {
    pub list: ListRule,
    pub fields: TorrentFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRule {
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentFields {
    pub title: FieldRule,
    pub details: FieldRule,
    pub download: FieldRule,
    pub size: FieldRule,
    pub date_added: FieldRule,
    pub seeders: FieldRule,
    pub leechers: FieldRule,
    pub downloadvolumefactor: FieldRule,
    pub uploadvolumefactor: FieldRule,
}

/// Extraction rule for one field. Unset parts are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FieldFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<BTreeMap<String, i64>>,
}

impl FieldRule {
    pub fn selector(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            ..Default::default()
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = Some(true);
        self
    }

    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    /// Constant value for every item (`{"case": {"*": value}}`).
    pub fn constant(value: i64) -> Self {
        Self {
            case: Some(BTreeMap::from([("*".to_string(), value)])),
            ..Default::default()
        }
    }
}

/// Post-processing filter, e.g. `{"name": "re", "args": ["(\\d+)", 1]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub name: String,
    pub args: Vec<Value>,
}

impl FieldFilter {
    /// Regex filter keeping capture group `group`.
    pub fn regex(pattern: &str, group: u32) -> Self {
        Self {
            name: "re".to_string(),
            args: vec![Value::from(pattern), Value::from(group)],
        }
    }
}

/// A formatted record ready for output.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedIndexer {
    /// Jackett display name of the source record.
    pub source_name: String,
    pub config: FormattedConfig,
}
