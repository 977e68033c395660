//! Acyclicity check for hierarchy graphs and views.
//!
//! Kahn's algorithm: seed a queue with every zero-in-degree node, repeatedly
//! remove one and decrement its successors' in-degrees. Whatever is never
//! removed lies on a cycle or downstream of one.

use std::collections::VecDeque;

use super::model::{Graph, NodeIndex};
use super::view::View;
use crate::error::{LnGraphError, Result};

/// Fail with [`LnGraphError::CycleDetected`] unless `graph` is a DAG.
pub fn assert_acyclic(graph: &Graph) -> Result<()> {
    let edges = graph.edges().iter().map(|e| (e.source, e.target));
    let remaining = kahn_remaining(graph.node_count(), |_| true, edges);
    into_result(graph, remaining)
}

/// [`assert_acyclic`] restricted to the nodes and edges of `view`.
pub fn assert_view_acyclic(graph: &Graph, view: &View) -> Result<()> {
    let edges = view.edges().map(|e| {
        let edge = graph.edge(e);
        (edge.source, edge.target)
    });
    let remaining = kahn_remaining(graph.node_count(), |n| view.contains_node(n), edges);
    into_result(graph, remaining)
}

/// Nodes left over after Kahn's sort over the nodes accepted by `include`.
///
/// Edges touching an excluded node are ignored.
fn kahn_remaining<F, I>(node_count: usize, include: F, edges: I) -> Vec<NodeIndex>
where
    F: Fn(NodeIndex) -> bool,
    I: IntoIterator<Item = (NodeIndex, NodeIndex)>,
{
    let mut in_degree = vec![0usize; node_count];
    let mut successors: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
    for (s, t) in edges {
        if include(s) && include(t) {
            in_degree[t] += 1;
            successors[s].push(t);
        }
    }

    let total = (0..node_count).filter(|&n| include(n)).count();
    let mut queue: VecDeque<NodeIndex> = (0..node_count)
        .filter(|&n| include(n) && in_degree[n] == 0)
        .collect();
    let mut removed = vec![false; node_count];
    let mut removed_count = 0usize;

    while let Some(n) = queue.pop_front() {
        removed[n] = true;
        removed_count += 1;
        for &t in &successors[n] {
            in_degree[t] -= 1;
            if in_degree[t] == 0 {
                queue.push_back(t);
            }
        }
    }

    if removed_count == total {
        return Vec::new();
    }
    (0..node_count)
        .filter(|&n| include(n) && !removed[n])
        .collect()
}

fn into_result(graph: &Graph, remaining: Vec<NodeIndex>) -> Result<()> {
    if remaining.is_empty() {
        return Ok(());
    }
    let remaining: Vec<String> = remaining
        .into_iter()
        .map(|n| graph.node(n).id.to_string())
        .collect();
    tracing::error!(count = remaining.len(), "Cycle detected in hierarchy graph");
    Err(LnGraphError::CycleDetected { remaining })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
