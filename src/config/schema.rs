//! Configuration data structures for lngraph.
//!
//! One [`GraphConfig`] parameterizes the whole pipeline: which columns form
//! the hierarchy and how they are tagged, which column drives coloring, the
//! palettes, and the two layout policies (edge weight, link color).
//! [`ConfigFile`] is the partial YAML form layered over a preset.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::error::{LnGraphError, Result};
use crate::types::{Color, ID_SEPARATOR, ROOT_TAG};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for a graph session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Config format version (currently "1.0").
    pub version: String,

    /// Preset this config was derived from.
    pub preset: PresetName,

    /// Relative path of the JSON record array.
    pub data_path: PathBuf,

    /// Hierarchy columns, root-most first.
    pub columns: Vec<ColumnSpec>,

    /// Column whose labels key into [`GraphConfig::palette`].
    pub grouping_column: String,

    /// Label of the synthetic root node.
    pub root_label: String,

    /// Group label → color for grouping-level nodes.
    pub palette: BTreeMap<String, Color>,

    /// Round-robin colors for grouping labels missing from `palette`.
    pub fallback_palette: Vec<Color>,

    /// Color of the root and of nodes with no grouping ancestor.
    pub default_color: Color,

    pub weight_policy: WeightPolicy,

    pub link_color: LinkColorSource,

    /// Depth threshold of the initial collapsed view.
    pub default_depth: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        super::preset::get_preset(&PresetName::Iclassi)
    }
}

impl GraphConfig {
    /// Index of the grouping column within `columns`.
    pub fn grouping_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == self.grouping_column)
    }

    /// Check the invariants the builder and propagator rely on.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(LnGraphError::Config("at least one column is required".into()));
        }

        let mut tags = HashSet::new();
        let mut names = HashSet::new();
        for col in &self.columns {
            let tag = col.tag.trim();
            if tag.is_empty() {
                return Err(LnGraphError::Config(format!(
                    "column {:?} has an empty tag",
                    col.name
                )));
            }
            if tag != col.tag {
                return Err(LnGraphError::Config(format!(
                    "tag {:?} of column {:?} has surrounding whitespace",
                    col.tag, col.name
                )));
            }
            if tag.contains(ID_SEPARATOR) {
                return Err(LnGraphError::Config(format!(
                    "tag {tag:?} must not contain {ID_SEPARATOR:?}"
                )));
            }
            if tag == ROOT_TAG {
                return Err(LnGraphError::Config(format!("tag {ROOT_TAG:?} is reserved")));
            }
            if !tags.insert(tag) {
                return Err(LnGraphError::Config(format!("duplicate tag {tag:?}")));
            }
            if !names.insert(col.name.as_str()) {
                return Err(LnGraphError::Config(format!(
                    "duplicate column {:?}",
                    col.name
                )));
            }
        }

        if self.grouping_index().is_none() {
            return Err(LnGraphError::Config(format!(
                "grouping column {:?} is not one of the configured columns",
                self.grouping_column
            )));
        }

        if self.fallback_palette.is_empty() {
            return Err(LnGraphError::Config("fallback palette must not be empty".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ColumnSpec
// ---------------------------------------------------------------------------

/// One classification rank: its record field name and short namespacing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub tag: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How an edge's exposed weight is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPolicy {
    /// Number of records whose path contains the transition.
    #[default]
    Count,
    /// `1 / outDegree(source)`, splitting each parent evenly among children.
    Normalized,
}

/// Which endpoint an edge takes its color from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkColorSource {
    #[default]
    Source,
    Target,
}

// ---------------------------------------------------------------------------
// PresetName
// ---------------------------------------------------------------------------

/// Named base configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// WHO-HAEM5 columns of the InterLymph Sankey (`ihc.json`).
    Iclassi,
    /// Lineage-nature rooted hierarchy.
    Lineage,
}

impl PresetName {
    /// Parse from a loose string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "iclassi" | "who-haem5" | "who_haem5" => Some(Self::Iclassi),
            "lineage" => Some(Self::Lineage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iclassi => "iclassi",
            Self::Lineage => "lineage",
        }
    }
}

impl std::fmt::Display for PresetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConfigFile (partial overlay)
// ---------------------------------------------------------------------------

/// The YAML file form: every field optional, applied over a preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub preset: Option<PresetName>,
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnSpec>>,
    #[serde(default)]
    pub grouping_column: Option<String>,
    #[serde(default)]
    pub root_label: Option<String>,
    /// Merged key-by-key into the preset palette.
    #[serde(default)]
    pub palette: Option<BTreeMap<String, Color>>,
    #[serde(default)]
    pub fallback_palette: Option<Vec<Color>>,
    #[serde(default)]
    pub default_color: Option<Color>,
    #[serde(default)]
    pub weight_policy: Option<WeightPolicy>,
    #[serde(default)]
    pub link_color: Option<LinkColorSource>,
    #[serde(default)]
    pub default_depth: Option<u32>,
}

impl ConfigFile {
    /// Layer this file over `base`. Fields left unset keep the base value.
    pub fn apply(self, mut base: GraphConfig) -> GraphConfig {
        if let Some(v) = self.version {
            base.version = v;
        }
        if let Some(v) = self.data_path {
            base.data_path = v;
        }
        if let Some(v) = self.columns {
            base.columns = v;
        }
        if let Some(v) = self.grouping_column {
            base.grouping_column = v;
        }
        if let Some(v) = self.root_label {
            base.root_label = v;
        }
        if let Some(v) = self.palette {
            base.palette.extend(v);
        }
        if let Some(v) = self.fallback_palette {
            base.fallback_palette = v;
        }
        if let Some(v) = self.default_color {
            base.default_color = v;
        }
        if let Some(v) = self.weight_policy {
            base.weight_policy = v;
        }
        if let Some(v) = self.link_color {
            base.link_color = v;
        }
        if let Some(v) = self.default_depth {
            base.default_depth = v;
        }
        base
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
