//! Views: node/edge subsets of a [`Graph`] used for one render pass.
//!
//! A view only holds indices into the graph it was derived from; it never
//! mutates it.

use std::collections::BTreeSet;

use super::model::{EdgeIndex, Graph, NodeIndex};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    nodes: BTreeSet<NodeIndex>,
    edges: BTreeSet<EdgeIndex>,
}

impl View {
    /// Every node and edge of `graph`.
    pub fn full(graph: &Graph) -> Self {
        Self {
            nodes: (0..graph.node_count()).collect(),
            edges: (0..graph.edge_count()).collect(),
        }
    }

    /// Nodes with `depth <= max_depth`, edge-closed.
    pub fn depth_limited(graph: &Graph, max_depth: u32) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.depth() <= max_depth)
            .map(|(i, _)| i)
            .collect();
        let mut view = Self {
            nodes,
            edges: BTreeSet::new(),
        };
        view.close_edges(graph);
        view
    }

    /// Build from explicit parts. Caller ensures every edge endpoint is included.
    pub fn from_parts(nodes: BTreeSet<NodeIndex>, edges: BTreeSet<EdgeIndex>) -> Self {
        Self { nodes, edges }
    }

    /// Add nodes, then re-close edges over `graph`. Returns how many were new.
    pub fn reveal<I>(&mut self, graph: &Graph, nodes: I) -> usize
    where
        I: IntoIterator<Item = NodeIndex>,
    {
        let before = self.nodes.len();
        self.nodes.extend(nodes);
        let added = self.nodes.len() - before;
        if added > 0 {
            self.close_edges(graph);
        }
        added
    }

    /// Make the edge set exactly the graph edges whose endpoints are both visible.
    pub fn close_edges(&mut self, graph: &Graph) {
        self.edges = graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, e)| self.nodes.contains(&e.source) && self.nodes.contains(&e.target))
            .map(|(i, _)| i)
            .collect();
    }

    pub fn contains_node(&self, idx: NodeIndex) -> bool {
        self.nodes.contains(&idx)
    }

    pub fn contains_edge(&self, idx: EdgeIndex) -> bool {
        self.edges.contains(&idx)
    }

    /// Node indices in ascending (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }

    /// Edge indices in ascending (insertion) order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.edges.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when every visible edge has both endpoints visible.
    pub fn has_no_dangling_edges(&self, graph: &Graph) -> bool {
        self.edges.iter().all(|&e| {
            let edge = graph.edge(e);
            self.nodes.contains(&edge.source) && self.nodes.contains(&edge.target)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
