//! Progressive disclosure: a depth-limited view that grows as nodes expand.
//!
//! `Collapsed(depth)` shows nodes up to `depth`. Expanding a visible node
//! reveals its whole subtree in the full graph, not only what is currently
//! visible. `collapse_all` discards every expansion.

use std::collections::BTreeSet;

use super::model::{Graph, NodeIndex};
use super::view::View;
use crate::error::{LnGraphError, Result};
use crate::types::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisclosureState {
    Collapsed { depth: u32 },
    /// `expanded` lists expanded nodes in the order they were expanded.
    Expanded { depth: u32, expanded: Vec<NodeId> },
}

impl DisclosureState {
    pub fn depth(&self) -> u32 {
        match self {
            Self::Collapsed { depth } | Self::Expanded { depth, .. } => *depth,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Disclosure {
    default_depth: u32,
    state: DisclosureState,
    expanded: BTreeSet<NodeIndex>,
    view: View,
}

impl Disclosure {
    /// Start collapsed at `default_depth`.
    pub fn new(graph: &Graph, default_depth: u32) -> Self {
        Self {
            default_depth,
            state: DisclosureState::Collapsed {
                depth: default_depth,
            },
            expanded: BTreeSet::new(),
            view: View::depth_limited(graph, default_depth),
        }
    }

    pub fn state(&self) -> &DisclosureState {
        &self.state
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn default_depth(&self) -> u32 {
        self.default_depth
    }

    pub fn is_expanded(&self, idx: NodeIndex) -> bool {
        self.expanded.contains(&idx)
    }

    /// Reveal every descendant of the visible node `id`.
    ///
    /// Returns the number of newly visible nodes; expanding an already
    /// expanded node returns 0 and changes nothing.
    pub fn expand(&mut self, graph: &Graph, id: &str) -> Result<usize> {
        let idx = graph
            .index_of(id)
            .ok_or_else(|| LnGraphError::UnknownNode(id.to_string()))?;
        if !self.view.contains_node(idx) {
            return Err(LnGraphError::NodeNotVisible(id.to_string()));
        }
        if !self.expanded.insert(idx) {
            return Ok(0);
        }

        let added = self.view.reveal(graph, graph.descendants(idx));

        let node_id = graph.node(idx).id.clone();
        self.state = match std::mem::replace(
            &mut self.state,
            DisclosureState::Collapsed { depth: 0 },
        ) {
            DisclosureState::Collapsed { depth } => DisclosureState::Expanded {
                depth,
                expanded: vec![node_id],
            },
            DisclosureState::Expanded { depth, mut expanded } => {
                expanded.push(node_id);
                DisclosureState::Expanded { depth, expanded }
            }
        };

        tracing::debug!(node = id, added, visible = self.view.node_count(), "Expanded node");
        Ok(added)
    }

    /// Back to `Collapsed(default_depth)`.
    pub fn collapse_all(&mut self, graph: &Graph) {
        self.set_depth(graph, self.default_depth);
    }

    /// Discard expansions and collapse to an explicit depth.
    pub fn set_depth(&mut self, graph: &Graph, depth: u32) {
        self.expanded.clear();
        self.state = DisclosureState::Collapsed { depth };
        self.view = View::depth_limited(graph, depth);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    /// root → A|a → B|b → C|c → D|d, and root → A|x
    fn graph() -> Graph {
        let mut g = Graph::new("Root");
        let a = g.ensure_node(NodeId::new("A", "a"), Level::Column(0));
        let b = g.ensure_node(NodeId::new("B", "b"), Level::Column(1));
        let c = g.ensure_node(NodeId::new("C", "c"), Level::Column(2));
        let d = g.ensure_node(NodeId::new("D", "d"), Level::Column(3));
        let x = g.ensure_node(NodeId::new("A", "x"), Level::Column(0));
        g.add_edge(g.root(), a, 1).unwrap();
        g.add_edge(a, b, 1).unwrap();
        g.add_edge(b, c, 1).unwrap();
        g.add_edge(c, d, 1).unwrap();
        g.add_edge(g.root(), x, 1).unwrap();
        g
    }

    #[test]
    fn starts_collapsed_at_default_depth() {
        let g = graph();
        let d = Disclosure::new(&g, 1);
        assert_eq!(d.state(), &DisclosureState::Collapsed { depth: 1 });
        assert_eq!(d.view().node_count(), 3);
    }

    #[test]
    fn expand_reveals_full_subtree_beyond_visible() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        let added = d.expand(&g, "A|a").unwrap();

        assert_eq!(added, 3);
        assert_eq!(d.view().node_count(), 6);
        assert_eq!(d.view().edge_count(), 5);
        assert!(d.view().has_no_dangling_edges(&g));
        assert_eq!(
            d.state(),
            &DisclosureState::Expanded {
                depth: 1,
                expanded: vec![NodeId::from_raw("A|a")]
            }
        );
    }

    #[test]
    fn expand_is_idempotent() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        d.expand(&g, "A|a").unwrap();
        let view = d.view().clone();
        let state = d.state().clone();

        assert_eq!(d.expand(&g, "A|a").unwrap(), 0);
        assert_eq!(d.view(), &view);
        assert_eq!(d.state(), &state);
    }

    #[test]
    fn expanding_a_leaf_records_state_without_new_nodes() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        assert_eq!(d.expand(&g, "A|x").unwrap(), 0);
        assert!(d.is_expanded(g.index_of("A|x").unwrap()));
    }

    #[test]
    fn expand_unknown_node_errors() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        assert!(matches!(
            d.expand(&g, "A|nope"),
            Err(LnGraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn expand_hidden_node_errors() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        assert!(matches!(
            d.expand(&g, "C|c"),
            Err(LnGraphError::NodeNotVisible(_))
        ));
    }

    #[test]
    fn collapse_all_discards_expansions() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        let initial = d.view().clone();
        d.expand(&g, "A|a").unwrap();
        d.collapse_all(&g);

        assert_eq!(d.view(), &initial);
        assert_eq!(d.state(), &DisclosureState::Collapsed { depth: 1 });
        assert!(!d.is_expanded(g.index_of("A|a").unwrap()));
    }

    #[test]
    fn set_depth_changes_threshold() {
        let g = graph();
        let mut d = Disclosure::new(&g, 1);
        d.set_depth(&g, 3);
        assert_eq!(d.state().depth(), 3);
        assert_eq!(d.view().node_count(), 5);
        d.collapse_all(&g);
        assert_eq!(d.state().depth(), 1);
    }
}
