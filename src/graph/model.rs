//! In-memory hierarchy graph: nodes, weighted edges, and both adjacency
//! directions.
//!
//! Nodes and edges are addressed by dense indices; ids resolve through a
//! hash index. Insertion order is preserved and is the order every traversal
//! and every render payload sees.

use std::collections::HashMap;

use crate::config::WeightPolicy;
use crate::error::{LnGraphError, Result};
use crate::types::{Color, Level, NodeId};

/// Dense index of a node within a [`Graph`].
pub type NodeIndex = usize;

/// Dense index of an edge within a [`Graph`].
pub type EdgeIndex = usize;

// ---------------------------------------------------------------------------
// Node / Edge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub level: Level,
    /// Unset until the color propagator runs.
    pub color: Option<Color>,
}

impl Node {
    pub fn label(&self) -> &str {
        self.id.label()
    }

    pub fn depth(&self) -> u32 {
        self.level.depth()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    /// Number of records whose chain contains this transition.
    pub count: u32,
    pub color: Option<Color>,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, NodeIndex>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    children: Vec<Vec<NodeIndex>>,
    parents: Vec<Vec<NodeIndex>>,
}

impl Graph {
    /// A graph holding only the synthetic root.
    pub fn new(root_label: &str) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            children: Vec::new(),
            parents: Vec::new(),
        };
        graph.ensure_node(NodeId::root(root_label), Level::Root);
        graph
    }

    /// The root is always the first node.
    pub fn root(&self) -> NodeIndex {
        0
    }

    pub fn root_id(&self) -> &NodeId {
        &self.nodes[0].id
    }

    /// Return the index of `id`, inserting it at `level` when new.
    pub fn ensure_node(&mut self, id: NodeId, level: Level) -> NodeIndex {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(Node {
            id,
            level,
            color: None,
        });
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        idx
    }

    /// Add `count` to the `source → target` edge, creating it when new.
    ///
    /// Self-loops are rejected. Cycles spanning several nodes are not checked
    /// here; that is the validator's job.
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, count: u32) -> Result<EdgeIndex> {
        if source >= self.nodes.len() {
            return Err(LnGraphError::UnknownNode(format!("#{source}")));
        }
        if target >= self.nodes.len() {
            return Err(LnGraphError::UnknownNode(format!("#{target}")));
        }
        if source == target {
            return Err(LnGraphError::SelfLoop(self.nodes[source].id.to_string()));
        }

        if let Some(&e) = self.edge_index.get(&(source, target)) {
            self.edges[e].count += count;
            return Ok(e);
        }

        let e = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            count,
            color: None,
        });
        self.edge_index.insert((source, target), e);
        self.children[source].push(target);
        self.parents[target].push(source);
        Ok(e)
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[idx]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edge(&self, idx: EdgeIndex) -> &Edge {
        &self.edges[idx]
    }

    pub(crate) fn edge_mut(&mut self, idx: EdgeIndex) -> &mut Edge {
        &mut self.edges[idx]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(&NodeId::from_raw(id)).copied()
    }

    pub fn find_edge(&self, source: NodeIndex, target: NodeIndex) -> Option<EdgeIndex> {
        self.edge_index.get(&(source, target)).copied()
    }

    /// Direct children, in first-seen order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.children[idx]
    }

    /// Direct parents, in first-seen order.
    pub fn parents(&self, idx: NodeIndex) -> &[NodeIndex] {
        &self.parents[idx]
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.children[idx].len()
    }

    /// The layout weight of edge `e` under `policy`.
    pub fn edge_weight(&self, e: EdgeIndex, policy: WeightPolicy) -> f64 {
        let edge = &self.edges[e];
        match policy {
            WeightPolicy::Count => f64::from(edge.count),
            WeightPolicy::Normalized => 1.0 / self.out_degree(edge.source) as f64,
        }
    }

    /// Every node reachable from `idx` over child edges, excluding `idx`.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = vec![false; self.nodes.len()];
        seen[idx] = true;
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children[idx].iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if seen[n] {
                continue;
            }
            seen[n] = true;
            out.push(n);
            stack.extend(self.children[n].iter().rev().copied());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
