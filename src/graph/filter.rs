//! Case-insensitive label search over a view.

use std::collections::BTreeSet;

use super::model::{Graph, NodeIndex};
use super::view::View;

/// Nodes of `view` whose label contains `query`, ignoring case and
/// surrounding whitespace. An empty query matches nothing.
pub fn find_matches(graph: &Graph, view: &View, query: &str) -> Vec<NodeIndex> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    view.nodes()
        .filter(|&n| graph.node(n).label().to_lowercase().contains(&needle))
        .collect()
}

/// Narrow `view` to the matching nodes and their immediate context.
///
/// Keeps the matching nodes, every view edge touching one of them, and the
/// far endpoints of those edges. An empty query returns `view` unchanged.
pub fn filter(graph: &Graph, view: &View, query: &str) -> View {
    if query.trim().is_empty() {
        return view.clone();
    }

    let matched: BTreeSet<NodeIndex> = find_matches(graph, view, query).into_iter().collect();
    let edges: BTreeSet<_> = view
        .edges()
        .filter(|&e| {
            let edge = graph.edge(e);
            matched.contains(&edge.source) || matched.contains(&edge.target)
        })
        .collect();

    let mut nodes = matched;
    for &e in &edges {
        let edge = graph.edge(e);
        nodes.insert(edge.source);
        nodes.insert(edge.target);
    }

    View::from_parts(nodes, edges)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
