//! End-to-end tests for lngraph.
//!
//! These tests write real config and record files to temporary directories,
//! load them through the public API, and check the rendered payloads.

use std::path::PathBuf;

use lngraph::config::loader::load_config_with;
use lngraph::config::{ColumnSpec, GraphConfig, LinkColorSource, WeightPolicy};
use lngraph::error::LnGraphError;
use lngraph::graph::{assert_acyclic, build, filter, ColorPropagator, View};
use lngraph::render::{JsonRenderer, RenderPayload};
use lngraph::session::VisualizationSession;
use lngraph::records::parse_records;
use lngraph::types::{NodeId, Record};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const IHC_SAMPLE: &str = r#"[
  {"Major Group": "NHL", "WHO-HAEM5 Category": "Precursor B-cell neoplasms",
   "WHO-HAEM5 Family-Class": "B-cell lymphoblastic leukaemias/lymphomas",
   "WHO-HAEM5 Entity-Type": "B-ALL/LBL, NOS", "Entity-Type": "", "Subtype(s)": null},
  {"Major Group": "NHL", "WHO-HAEM5 Category": "Mature B-cell neoplasms",
   "WHO-HAEM5 Family-Class": "Splenic B-cell lymphomas and leukaemias",
   "WHO-HAEM5 Entity-Type": "Hairy cell leukaemia"},
  {"Major Group": "NHL", "WHO-HAEM5 Category": "Mature B-cell neoplasms",
   "WHO-HAEM5 Family-Class": "Splenic B-cell lymphomas and leukaemias",
   "WHO-HAEM5 Entity-Type": "Splenic marginal zone lymphoma"},
  {"Major Group": "NHL", "WHO-HAEM5 Category": "Large B-cell lymphomas (LBCL)",
   "WHO-HAEM5 Entity-Type": "DLBCL, NOS", "Subtype(s)": "GCB"},
  {"Major Group": "NHL", "WHO-HAEM5 Category": "Large B-cell lymphomas (LBCL)",
   "WHO-HAEM5 Entity-Type": "DLBCL, NOS", "Subtype(s)": "ABC"},
  {"Major Group": "HL", "WHO-HAEM5 Category": "Classic Hodgkin lymphoma"},
  {"Major Group": "HL", "WHO-HAEM5 Category": "Nodular lymphocyte predominant B-cell lymphoma"},
  {"Major Group": "Histiocytic", "WHO-HAEM5 Category": "Langerhans cell histiocytosis"},
  {"Major Group": "  ", "WHO-HAEM5 Category": ""},
  "not a row"
]"#;

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn loaded_session() -> VisualizationSession {
    let mut session = VisualizationSession::new(GraphConfig::default()).unwrap();
    session.load_records(&parse_records(IHC_SAMPLE).unwrap()).unwrap();
    session
}

fn two_level() -> GraphConfig {
    let mut config = GraphConfig::default();
    config.columns = vec![ColumnSpec::new("L1", "L1"), ColumnSpec::new("L2", "L2")];
    config.grouping_column = "L1".into();
    config
}

fn node_ids(payload: &RenderPayload) -> Vec<&str> {
    payload.nodes.iter().map(|n| n.id.as_str()).collect()
}

// ===========================================================================
// 1. Minimal two-record scenario
// ===========================================================================

#[test]
fn two_records_build_expected_graph_and_filter() {
    let config = two_level();
    let records = vec![
        Record::from_pairs([("L1", "LN"), ("L2", "NHL")]),
        Record::from_pairs([("L1", "LN"), ("L2", "HL")]),
    ];
    let graph = build(&records, &config);
    let root = graph.root_id().to_string();

    let ids: Vec<String> = graph.nodes().iter().map(|n| n.id.to_string()).collect();
    assert_eq!(ids, vec![root.clone(), "L1|LN".into(), "L2|NHL".into(), "L2|HL".into()]);

    let edges: Vec<(String, String)> = graph
        .edges()
        .iter()
        .map(|e| (graph.node(e.source).id.to_string(), graph.node(e.target).id.to_string()))
        .collect();
    assert_eq!(
        edges,
        vec![
            (root, "L1|LN".to_string()),
            ("L1|LN".to_string(), "L2|NHL".to_string()),
            ("L1|LN".to_string(), "L2|HL".to_string()),
        ]
    );

    let filtered = filter(&graph, &View::full(&graph), "NHL");
    let kept: Vec<&str> = filtered.nodes().map(|n| graph.node(n).id.as_str()).collect();
    assert_eq!(kept, vec!["L1|LN", "L2|NHL"]);
    assert_eq!(filtered.edge_count(), 1);
}

// ===========================================================================
// 2. Full sample through a session
// ===========================================================================

#[test]
fn sample_payload_skips_empty_rows() {
    let session = loaded_session();
    let stats = session.stats();
    assert_eq!(stats.records_total, 10);
    assert_eq!(stats.records_used, 8);
    assert!(session.graph().index_of("MG|").is_none());
    assert_acyclic(session.graph()).unwrap();
}

#[test]
fn sample_colors_follow_major_group() {
    let mut session = loaded_session();
    session.set_depth(u32::MAX);
    let payload = session.payload().unwrap();

    let color = |id: &str| {
        payload
            .nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.color.clone())
            .unwrap()
    };
    assert_eq!(color("MG|NHL"), "#5470C6");
    assert_eq!(color("SUB|GCB"), "#5470C6");
    assert_eq!(color("C1|Classic Hodgkin lymphoma"), "#EE6666");
    assert_eq!(color("C1|Langerhans cell histiocytosis"), color("MG|Histiocytic"));
    assert_ne!(color("MG|Histiocytic"), "#1f77b4");
    assert!(payload.nodes.iter().all(|n| n.color.is_some()));
    assert!(payload.links.iter().all(|l| l.color.is_some()));
}

#[test]
fn expansion_reveals_entities_below_category() {
    let mut session = loaded_session();
    let before = session.payload().unwrap();
    assert!(!node_ids(&before).contains(&"C3|DLBCL, NOS"));

    let added = session.expand("C1|Large B-cell lymphomas (LBCL)").unwrap();
    assert_eq!(added, 3);
    let after = session.payload().unwrap();
    assert!(node_ids(&after).contains(&"C3|DLBCL, NOS"));
    assert!(node_ids(&after).contains(&"SUB|ABC"));

    assert_eq!(session.expand("C1|Large B-cell lymphomas (LBCL)").unwrap(), 0);
    assert_eq!(session.payload().unwrap(), after);

    session.collapse_all();
    assert_eq!(session.payload().unwrap(), before);
}

#[test]
fn filter_then_reset_restores_view() {
    let mut session = loaded_session();
    let unfiltered = session.payload().unwrap();

    session.set_filter("hodgkin");
    let filtered = session.payload().unwrap();
    assert_eq!(
        node_ids(&filtered),
        vec!["MG|HL", "C1|Classic Hodgkin lymphoma"]
    );

    session.set_filter("xyz-no-match");
    assert!(session.payload().unwrap().nodes.is_empty());

    session.reset_filter();
    assert_eq!(session.payload().unwrap(), unfiltered);
}

#[test]
fn weight_policies_differ_only_in_link_weights() {
    let records = parse_records(IHC_SAMPLE).unwrap();

    let mut counted = VisualizationSession::new(GraphConfig::default()).unwrap();
    counted.load_records(&records).unwrap();

    let mut config = GraphConfig::default();
    config.weight_policy = WeightPolicy::Normalized;
    let mut normalized = VisualizationSession::new(config).unwrap();
    normalized.load_records(&records).unwrap();

    let a = counted.payload().unwrap();
    let b = normalized.payload().unwrap();
    assert_eq!(a.nodes, b.nodes);

    let root_to_nhl = |p: &RenderPayload| {
        p.links
            .iter()
            .find(|l| l.target == "MG|NHL")
            .map(|l| l.weight)
            .unwrap()
    };
    assert_eq!(root_to_nhl(&a), 5.0);
    assert!((root_to_nhl(&b) - 1.0 / 3.0).abs() < 1e-12);
}

// ===========================================================================
// 3. Files, config, fallback
// ===========================================================================

#[test]
fn configured_files_drive_the_session() {
    let dir = TempDir::new().unwrap();
    let data = write(&dir, "rows.json", r#"[{"Tier": "A", "Leaf": "x"}, {"Tier": "B", "Leaf": "x"}]"#);
    let config_yaml = format!(
        r##"
data_path: {data}
columns:
  - {{ name: Tier, tag: T }}
  - {{ name: Leaf, tag: LF }}
grouping_column: Tier
root_label: All
palette:
  A: "#aa0000"
link_color: target
default_depth: 9
"##,
        data = data.display()
    );
    let config_path = write(&dir, "config.yaml", &config_yaml);

    let config = load_config_with(Some(&config_path), |_| None, None).unwrap();
    assert_eq!(config.link_color, LinkColorSource::Target);

    let mut session = VisualizationSession::new(config).unwrap();
    session.load_configured().unwrap();
    assert!(!session.is_placeholder());

    let payload = session.payload().unwrap();
    assert_eq!(node_ids(&payload), vec!["ROOT|All", "T|A", "LF|x", "T|B"]);

    // LF|x hangs under both tiers; BFS reaches T|A first.
    let leaf = payload.nodes.iter().find(|n| n.id == "LF|x").unwrap();
    assert_eq!(leaf.color.as_deref(), Some("#aa0000"));

    // target-colored links into T|A carry A's color
    let into_a = payload.links.iter().find(|l| l.target == "T|A").unwrap();
    assert_eq!(into_a.color.as_deref(), Some("#aa0000"));
}

#[test]
fn unreadable_data_renders_placeholder() {
    let dir = TempDir::new().unwrap();
    let mut config = GraphConfig::default();
    config.data_path = dir.path().join("missing.json");

    let mut session = VisualizationSession::new(config).unwrap();
    session.load_configured().unwrap();
    assert!(session.is_placeholder());

    let mut out = JsonRenderer::new(Vec::new());
    session.render(&mut out).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&out.into_inner()).unwrap();
    assert_eq!(doc["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(doc["links"][1]["source"], "MG|NHL");
    assert_eq!(doc["links"][1]["target"], "C1|Large B-cell lymphomas (LBCL)");
}

#[test]
fn tree_rows_load_under_the_lineage_preset() {
    let dir = TempDir::new().unwrap();
    let data = write(
        &dir,
        "tree.json",
        r#"[
            [null, "LN"],
            ["LN", "NHL"],
            ["NHL", "Precursor B-cell neoplasm"],
            ["Precursor B-cell neoplasm", "B-cell lymphoblastic leukemias/lymphomas"],
            ["B-cell lymphoblastic leukemias/lymphomas", "B-ALL / LBL, NOS"],
            ["B-ALL / LBL, NOS", "B-ALL or LBL, NOS", 6],
            ["NHL", "Mature B-cell neoplasms"],
            ["Mature B-cell neoplasms", "Splenic B-cell lymphomas and leukemias"],
            ["Splenic B-cell lymphomas and leukemias", "HCL"],
            ["Splenic B-cell lymphomas and leukemias", "SMZL"]
        ]"#,
    );
    let config_path = write(&dir, "config.yaml", "preset: lineage\n");
    let mut config = load_config_with(Some(&config_path), |_| None, None).unwrap();
    config.data_path = data;

    let mut session = VisualizationSession::new(config).unwrap();
    let stats = session.load_configured().unwrap();
    assert!(!session.is_placeholder());
    assert_eq!(stats.records_total, 9);

    session.set_depth(u32::MAX);
    let payload = session.payload().unwrap();
    let find = |id: &str| payload.nodes.iter().find(|n| n.id == id).unwrap();
    assert_eq!(find("LN|LN").depth, 1);
    assert_eq!(find("MG|NHL").depth, 2);
    assert_eq!(find("SUB|B-ALL or LBL, NOS").depth, 6);
    assert_eq!(find("MG|NHL").color.as_deref(), Some("#5470C6"));
    assert_eq!(find("ET|HCL").color.as_deref(), Some("#5470C6"));
}

// ===========================================================================
// 4. Cycle handling
// ===========================================================================

#[test]
fn cyclic_link_file_is_rejected_and_the_view_survives() {
    let dir = TempDir::new().unwrap();
    let data = write(
        &dir,
        "graph.json",
        r#"{
            "nodes": [{"id": "root"}, {"id": "Lymphoid"}, {"id": "NHL"}, {"id": "Mature B-cell neoplasms"}],
            "links": [
                {"source": "root", "target": "Lymphoid"},
                {"source": "Lymphoid", "target": "NHL"},
                {"source": "NHL", "target": "Mature B-cell neoplasms"},
                {"source": "Mature B-cell neoplasms", "target": "Lymphoid"}
            ]
        }"#,
    );
    let mut session = loaded_session();
    session.set_filter("lbcl");
    let before = session.payload().unwrap();

    match session.load_from_path(&data) {
        Err(LnGraphError::CycleDetected { remaining }) => {
            assert_eq!(
                remaining,
                vec!["C1|Lymphoid", "C2|NHL", "C3|Mature B-cell neoplasms"]
            );
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
    assert!(!session.is_placeholder());
    assert_eq!(session.filter_query(), Some("lbcl"));
    assert_eq!(session.payload().unwrap(), before);
}

#[test]
fn artificial_back_edge_is_fatal() {
    let config = GraphConfig::default();
    let mut graph = build(&parse_records(IHC_SAMPLE).unwrap(), &config);
    let leaf = graph.index_of("SUB|GCB").unwrap();
    let ancestor = graph.index_of("C1|Large B-cell lymphomas (LBCL)").unwrap();
    graph.add_edge(leaf, ancestor, 1).unwrap();

    match assert_acyclic(&graph) {
        Err(LnGraphError::CycleDetected { remaining }) => {
            assert!(remaining.contains(&"SUB|GCB".to_string()));
            assert!(remaining.contains(&"C1|Large B-cell lymphomas (LBCL)".to_string()));
            assert!(!remaining.contains(&"MG|HL".to_string()));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn colorize_is_defined_for_every_node() {
    let config = GraphConfig::default();
    let mut graph = build(&parse_records(IHC_SAMPLE).unwrap(), &config);
    ColorPropagator::from_config(&config).colorize(&mut graph);
    for node in graph.nodes() {
        assert!(node.color.is_some(), "{} has no color", node.id);
    }
    let root_color = graph.node(graph.root()).color.clone().unwrap();
    assert_eq!(root_color, config.default_color);
    assert_eq!(NodeId::root(&config.root_label), *graph.root_id());
}
