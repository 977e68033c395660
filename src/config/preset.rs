//! Preset definitions: `iclassi` (WHO-HAEM5 Sankey) and `lineage`.
//!
//! Each preset is a complete, valid [`GraphConfig`]; config files and
//! environment overrides only ever layer on top of one.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::schema::{ColumnSpec, GraphConfig, LinkColorSource, PresetName, WeightPolicy};
use crate::types::Color;

// ---------------------------------------------------------------------------
// Shared constants
// ---------------------------------------------------------------------------

/// Major-group colors shared by both presets.
pub const GROUP_COLORS: &[(&str, &str)] = &[
    ("NHL", "#5470C6"),
    ("HL", "#EE6666"),
    ("LPD", "#91CC75"),
    ("PM-LN", "#FAC858"),
    ("ID-LN", "#73C0DE"),
];

/// Round-robin colors for major groups missing from [`GROUP_COLORS`].
pub const FALLBACK_PALETTE: &[&str] = &[
    "#3BA272", "#FC8452", "#9A60B4", "#EA7CCC", "#5C7BD9", "#A5D6A7", "#FFB74D", "#B0BEC5",
];

pub const DEFAULT_NODE_COLOR: &str = "#1f77b4";

pub const ROOT_LABEL: &str = "Hematological-lymphoid Neoplasms";

pub const DEFAULT_DATA_PATH: &str = "ihc.json";

// ---------------------------------------------------------------------------
// Preset constructors
// ---------------------------------------------------------------------------

/// Get the full configuration for a named preset.
pub fn get_preset(name: &PresetName) -> GraphConfig {
    match name {
        PresetName::Iclassi => iclassi_preset(),
        PresetName::Lineage => lineage_preset(),
    }
}

/// WHO-HAEM5 hierarchy, grouped and colored by major group.
pub fn iclassi_preset() -> GraphConfig {
    base(
        PresetName::Iclassi,
        vec![
            ColumnSpec::new("Major Group", "MG"),
            ColumnSpec::new("WHO-HAEM5 Category", "C1"),
            ColumnSpec::new("WHO-HAEM5 Family-Class", "C2"),
            ColumnSpec::new("WHO-HAEM5 Entity-Type", "C3"),
            ColumnSpec::new("Entity-Type", "C4"),
            ColumnSpec::new("Subtype(s)", "SUB"),
        ],
    )
}

/// Lineage-nature first, then the classification ranks down to subtype.
pub fn lineage_preset() -> GraphConfig {
    base(
        PresetName::Lineage,
        vec![
            ColumnSpec::new("Lineage-Nature", "LN"),
            ColumnSpec::new("Major Group", "MG"),
            ColumnSpec::new("Category", "CAT"),
            ColumnSpec::new("Class-Family", "CF"),
            ColumnSpec::new("Entity-Type", "ET"),
            ColumnSpec::new("Subtype", "SUB"),
        ],
    )
}

fn base(preset: PresetName, columns: Vec<ColumnSpec>) -> GraphConfig {
    GraphConfig {
        version: "1.0".to_string(),
        preset,
        data_path: PathBuf::from(DEFAULT_DATA_PATH),
        columns,
        grouping_column: "Major Group".to_string(),
        root_label: ROOT_LABEL.to_string(),
        palette: group_palette(),
        fallback_palette: FALLBACK_PALETTE
            .iter()
            .copied()
            .map(Color::from_static)
            .collect(),
        default_color: Color::from_static(DEFAULT_NODE_COLOR),
        weight_policy: WeightPolicy::Count,
        link_color: LinkColorSource::Source,
        default_depth: 2,
    }
}

fn group_palette() -> BTreeMap<String, Color> {
    GROUP_COLORS
        .iter()
        .map(|&(label, hex)| (label.to_string(), Color::from_static(hex)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_palette_constant_is_valid_hex() {
        let all = GROUP_COLORS
            .iter()
            .map(|&(_, hex)| hex)
            .chain(FALLBACK_PALETTE.iter().copied())
            .chain(std::iter::once(DEFAULT_NODE_COLOR));
        for hex in all {
            assert!(Color::parse(hex).is_ok(), "invalid constant {hex}");
        }
    }

    #[test]
    fn iclassi_preset_columns() {
        let p = iclassi_preset();
        assert_eq!(p.preset, PresetName::Iclassi);
        assert_eq!(p.columns.len(), 6);
        assert_eq!(p.columns[0].tag, "MG");
        assert_eq!(p.columns[5].name, "Subtype(s)");
        assert_eq!(p.grouping_index(), Some(0));
        p.validate().unwrap();
    }

    #[test]
    fn lineage_preset_groups_below_root_level() {
        let p = lineage_preset();
        assert_eq!(p.preset, PresetName::Lineage);
        assert_eq!(p.columns[0].name, "Lineage-Nature");
        assert_eq!(p.grouping_index(), Some(1));
        p.validate().unwrap();
    }

    #[test]
    fn get_preset_dispatches_by_name() {
        for name in [PresetName::Iclassi, PresetName::Lineage] {
            assert_eq!(get_preset(&name).preset, name);
        }
    }

    #[test]
    fn presets_share_group_palette() {
        let a = iclassi_preset();
        let b = lineage_preset();
        assert_eq!(a.palette, b.palette);
        assert_eq!(a.palette.len(), GROUP_COLORS.len());
    }
}
