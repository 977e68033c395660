//! Core domain types for lngraph.
//!
//! Records are flat rows of categorical fields; nodes are namespaced by the
//! short tag of the column they came from, so the same label in two columns
//! never collapses into one node.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{LnGraphError, Result};

/// Separator between a level tag and the trimmed field value in a node id.
pub const ID_SEPARATOR: char = '|';

/// Tag reserved for the synthetic root node.
pub const ROOT_TAG: &str = "ROOT";

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Globally unique node identifier: `tag|value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build the id for `value` at the level tagged `tag`. The value is trimmed.
    pub fn new(tag: &str, value: &str) -> Self {
        Self(format!("{tag}{ID_SEPARATOR}{}", value.trim()))
    }

    /// The id of the synthetic root carrying `label`.
    pub fn root(label: &str) -> Self {
        Self::new(ROOT_TAG, label)
    }

    /// Wrap an already-formatted id (e.g. one received from a renderer click).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The level tag, i.e. everything before the first separator.
    pub fn tag(&self) -> &str {
        self.0
            .split_once(ID_SEPARATOR)
            .map(|(tag, _)| tag)
            .unwrap_or("")
    }

    /// The display label, i.e. the id with its tag prefix stripped.
    pub fn label(&self) -> &str {
        self.0
            .split_once(ID_SEPARATOR)
            .map(|(_, label)| label)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Which classification rank a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// The synthetic root.
    Root,
    /// Index into the configured column list.
    Column(usize),
}

impl Level {
    /// Root is depth 0; column `i` is depth `i + 1`.
    pub fn depth(&self) -> u32 {
        match self {
            Self::Root => 0,
            Self::Column(i) => *i as u32 + 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A CSS hex color (`#rgb` or `#rrggbb`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse and validate a hex color. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim();
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| LnGraphError::InvalidColor(raw.to_string()))?;
        let valid_len = hex.len() == 3 || hex.len() == 6;
        if !valid_len || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LnGraphError::InvalidColor(raw.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Wrap a compile-time palette constant without re-validating it.
    pub(crate) fn from_static(hex: &'static str) -> Self {
        Self(hex.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = LnGraphError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One row of categorical classification data, keyed by column name.
///
/// Missing fields read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Build a record from `(column, value)` pairs. Values are normalized.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.as_ref().trim().to_string()))
                .collect(),
        }
    }

    /// Build a record from one element of the JSON payload.
    ///
    /// Non-object elements yield an empty record, which the builder skips.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            fields: obj
                .iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        }
    }

    /// The trimmed value of `column`, or `""` when absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// LinkSet
// ---------------------------------------------------------------------------

/// An explicit hierarchy: named nodes and `source → target` links between
/// them, as opposed to the chains implied by flat records.
///
/// Names are trimmed; blank names and links with a blank endpoint are
/// dropped. Nodes mentioned only by a link need not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    nodes: Vec<String>,
    links: Vec<(String, String)>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.nodes.push(name.to_string());
        }
    }

    pub fn add_link(&mut self, source: &str, target: &str) {
        let (source, target) = (source.trim(), target.trim());
        if !source.is_empty() && !target.is_empty() {
            self.links.push((source.to_string(), target.to_string()));
        }
    }

    /// Listed nodes, in input order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn links(&self) -> &[(String, String)] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Normalize a JSON scalar into a trimmed field value.
///
/// `null` becomes empty rather than the literal "null"; numbers and booleans
/// are stringified; nested arrays and objects carry no label and read as empty.
pub fn normalize_value(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_label(n),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Integral floats print without a fractional part, so `1` and `1.0` name
/// the same node.
fn number_label(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
