//! Email template tree and the placeholder engine.
//!
//! A template is arbitrary JSON produced by the visual editor. String leaves
//! may embed `{{key}}` or `{{{key}}}` tokens which are resolved against a
//! flat [`ContentMap`]. Resolution is fail-soft: a token without a usable
//! value stays in the output verbatim.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Matches `{{key}}` and `{{{key}}}`. Group 1 is the untrimmed key.
pub const PLACEHOLDER_PATTERN: &str = r"\{\{\{?(.*?)\}?\}\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Template tree
// ---------------------------------------------------------------------------

/// One node of an email template.
///
/// Serializes as plain JSON, so a stored template and a `TemplateNode` are
/// interchangeable. Object key order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<TemplateNode>),
    Map(IndexMap<String, TemplateNode>),
}

impl TemplateNode {
    /// Parse a serialized template.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize with two-space indentation, the format stored in session saves.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<serde_json::Value> for TemplateNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<TemplateNode> for serde_json::Value {
    fn from(node: TemplateNode) -> Self {
        use serde_json::Value;
        match node {
            TemplateNode::Null => Value::Null,
            TemplateNode::Bool(b) => Value::Bool(b),
            TemplateNode::Number(n) => Value::Number(n),
            TemplateNode::String(s) => Value::String(s),
            TemplateNode::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            TemplateNode::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Content map
// ---------------------------------------------------------------------------

/// Flat placeholder key -> replacement text mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentMap(HashMap<String, String>);

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert only when a value is present.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// The replacement for `key`, if it exists and is non-empty.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build content from a JSON object returned by the completion provider.
    ///
    /// Strings are kept as-is, numbers and `true` are stringified, arrays and
    /// objects become compact JSON. `null`, `false` and empty strings carry
    /// no content and are skipped so the token stays visible.
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        use serde_json::Value;

        let mut content = Self::new();
        for (key, value) in object {
            let text = match value {
                Value::Null | Value::Bool(false) => continue,
                Value::Bool(true) => "true".to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) if s.is_empty() => continue,
                Value::String(s) => s.clone(),
                Value::Array(_) | Value::Object(_) => value.to_string(),
            };
            content.insert(key.trim(), text);
        }
        content
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContentMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Extend<(String, String)> for ContentMap {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

// ---------------------------------------------------------------------------
// Placeholder extraction
// ---------------------------------------------------------------------------

/// Collect the distinct placeholder keys referenced anywhere in `node`.
///
/// Keys are trimmed; tokens with an empty key are ignored.
pub fn extract_placeholders(node: &TemplateNode) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_placeholders(node, &mut found);
    found
}

fn collect_placeholders(node: &TemplateNode, found: &mut BTreeSet<String>) {
    match node {
        TemplateNode::String(text) => {
            for caps in PLACEHOLDER_RE.captures_iter(text) {
                let key = caps[1].trim();
                if !key.is_empty() {
                    found.insert(key.to_string());
                }
            }
        }
        TemplateNode::List(items) => {
            for item in items {
                collect_placeholders(item, found);
            }
        }
        TemplateNode::Map(entries) => {
            for value in entries.values() {
                collect_placeholders(value, found);
            }
        }
        TemplateNode::Null | TemplateNode::Bool(_) | TemplateNode::Number(_) => {}
    }
}

// ---------------------------------------------------------------------------
// Filling
// ---------------------------------------------------------------------------

/// Return a copy of `node` with every resolvable token substituted.
///
/// The result has exactly the same shape as the input.
pub fn fill(node: &TemplateNode, content: &ContentMap) -> TemplateNode {
    match node {
        TemplateNode::String(text) => TemplateNode::String(fill_str(text, content)),
        TemplateNode::List(items) => {
            TemplateNode::List(items.iter().map(|item| fill(item, content)).collect())
        }
        TemplateNode::Map(entries) => TemplateNode::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), fill(value, content)))
                .collect(),
        ),
        TemplateNode::Null | TemplateNode::Bool(_) | TemplateNode::Number(_) => node.clone(),
    }
}

/// Substitute tokens in a single string.
pub fn fill_str(text: &str, content: &ContentMap) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| match content.resolve(caps[1].trim()) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
