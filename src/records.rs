//! Record-set loading: the one I/O step of a session.
//!
//! The usual payload is a JSON array of flat row objects keyed by column
//! name. Two explicit graph shapes are also accepted:
//!
//! - `{"nodes": [{"id": ..}], "links": [{"source": .., "target": ..}]}`
//! - tree rows `[[parent, id], ..]`, where a null or empty parent marks a
//!   top-level node and any trailing elements are ignored
//!
//! Anything else is a load error, which callers answer with
//! [`placeholder_records`].

use std::path::Path;

use serde_json::{Map, Value};

use crate::config::GraphConfig;
use crate::error::{LnGraphError, Result};
use crate::types::{normalize_value, LinkSet, Record};

/// A parsed payload: flat records or an explicit graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphInput {
    Records(Vec<Record>),
    Links(LinkSet),
}

/// Parse a JSON payload in any accepted shape.
pub fn parse_input(json: &str) -> Result<GraphInput> {
    let value: Value = serde_json::from_str(json)?;
    input_from_value(&value)
}

/// Classify an already-parsed payload by shape.
pub fn input_from_value(value: &Value) -> Result<GraphInput> {
    match value {
        Value::Object(obj) if obj.contains_key("links") => {
            links_from_object(obj).map(GraphInput::Links)
        }
        Value::Array(rows) if rows.iter().any(Value::is_array) => {
            Ok(GraphInput::Links(links_from_tree_rows(rows)))
        }
        other => records_from_value(other).map(GraphInput::Records),
    }
}

/// Parse a JSON payload that must be flat records.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(json)?;
    records_from_value(&value)
}

/// Convert an already-parsed payload.
pub fn records_from_value(value: &Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(rows) => Ok(rows.iter().map(Record::from_json).collect()),
        other => Err(LnGraphError::NotAnArray(json_kind(other))),
    }
}

/// Read and parse the payload at `path`.
pub fn read_input(path: &Path) -> Result<GraphInput> {
    let text = std::fs::read_to_string(path)?;
    let input = parse_input(&text)?;
    match &input {
        GraphInput::Records(records) => {
            tracing::debug!(path = %path.display(), rows = records.len(), "Records loaded");
        }
        GraphInput::Links(links) => {
            tracing::debug!(
                path = %path.display(),
                nodes = links.nodes().len(),
                links = links.links().len(),
                "Link graph loaded"
            );
        }
    }
    Ok(input)
}

/// Minimal stand-in data: NHL → Large B-cell lymphomas, on the first two columns.
pub fn placeholder_records(config: &GraphConfig) -> Vec<Record> {
    let values = ["NHL", "Large B-cell lymphomas (LBCL)"];
    let pairs = config
        .columns
        .iter()
        .zip(values)
        .map(|(col, v)| (col.name.clone(), v));
    vec![Record::from_pairs(pairs)]
}

fn links_from_object(obj: &Map<String, Value>) -> Result<LinkSet> {
    let mut set = LinkSet::new();

    match obj.get("nodes") {
        None | Some(Value::Null) => {}
        Some(Value::Array(nodes)) => {
            for node in nodes {
                match node {
                    Value::Object(fields) => {
                        set.add_node(&fields.get("id").map(normalize_value).unwrap_or_default());
                    }
                    scalar => set.add_node(&normalize_value(scalar)),
                }
            }
        }
        Some(other) => {
            return Err(LnGraphError::MalformedGraph(format!(
                "\"nodes\" must be an array, got {}",
                json_kind(other)
            )));
        }
    }

    let Some(Value::Array(links)) = obj.get("links") else {
        let kind = obj.get("links").map(json_kind).unwrap_or("nothing");
        return Err(LnGraphError::MalformedGraph(format!(
            "\"links\" must be an array, got {kind}"
        )));
    };
    for link in links {
        let endpoint = |key: &str| link.get(key).map(normalize_value).unwrap_or_default();
        set.add_link(&endpoint("source"), &endpoint("target"));
    }
    Ok(set)
}

fn links_from_tree_rows(rows: &[Value]) -> LinkSet {
    let mut set = LinkSet::new();
    for row in rows.iter().filter_map(Value::as_array) {
        let cell = |i: usize| row.get(i).map(normalize_value).unwrap_or_default();
        let (parent, id) = (cell(0), cell(1));
        set.add_node(&id);
        set.add_link(&parent, &id);
    }
    set
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
