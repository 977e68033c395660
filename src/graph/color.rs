//! Node and link coloring.
//!
//! Grouping-level nodes take their label's palette color, or a fallback drawn
//! round-robin and pinned to that label for the life of the propagator. Every
//! other node inherits from its nearest grouping-level ancestor, found by a
//! breadth-first walk over parent edges. The root and orphaned nodes get the
//! default color.
//!
//! Resolved node colors are memoized by [`NodeIndex`], so the cache belongs to
//! one graph: call [`ColorPropagator::invalidate`] after every rebuild. The
//! fallback assignments are keyed by label and survive rebuilds.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::model::{Graph, NodeIndex};
use crate::config::{GraphConfig, LinkColorSource};
use crate::types::{Color, Level};

// ---------------------------------------------------------------------------
// FallbackPalette
// ---------------------------------------------------------------------------

/// Deterministic label → color assignment for labels with no palette entry.
#[derive(Debug, Clone)]
pub struct FallbackPalette {
    colors: Vec<Color>,
    assigned: HashMap<String, Color>,
    next: usize,
}

impl FallbackPalette {
    /// `colors` must be non-empty; config validation guarantees this.
    pub fn new(colors: Vec<Color>) -> Self {
        Self {
            colors,
            assigned: HashMap::new(),
            next: 0,
        }
    }

    /// The pinned color for `label`, assigning the next palette slot on first use.
    ///
    /// Returns `None` only for an empty palette.
    pub fn color_for(&mut self, label: &str) -> Option<Color> {
        if let Some(c) = self.assigned.get(label) {
            return Some(c.clone());
        }
        if self.colors.is_empty() {
            return None;
        }
        let color = self.colors[self.next % self.colors.len()].clone();
        self.next += 1;
        self.assigned.insert(label.to_string(), color.clone());
        Some(color)
    }

    pub fn assigned(&self) -> usize {
        self.assigned.len()
    }
}

// ---------------------------------------------------------------------------
// ColorPropagator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ColorPropagator {
    group_colors: BTreeMap<String, Color>,
    default_color: Color,
    grouping: Level,
    link_color: LinkColorSource,
    fallback: FallbackPalette,
    resolved: HashMap<NodeIndex, Color>,
    hits: u64,
    misses: u64,
}

impl ColorPropagator {
    pub fn new(
        group_colors: BTreeMap<String, Color>,
        default_color: Color,
        grouping: Level,
        link_color: LinkColorSource,
        fallback: FallbackPalette,
    ) -> Self {
        Self {
            group_colors,
            default_color,
            grouping,
            link_color,
            fallback,
            resolved: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Propagator for `config`'s grouping column, palettes, and link policy.
    ///
    /// A config whose grouping column is missing colors everything with the
    /// default color; [`GraphConfig::validate`] rejects such configs upstream.
    pub fn from_config(config: &GraphConfig) -> Self {
        let grouping = config
            .grouping_index()
            .map(Level::Column)
            .unwrap_or(Level::Root);
        Self::new(
            config.palette.clone(),
            config.default_color.clone(),
            grouping,
            config.link_color,
            FallbackPalette::new(config.fallback_palette.clone()),
        )
    }

    /// Drop memoized node colors. Fallback label assignments are kept.
    pub fn invalidate(&mut self) {
        self.resolved.clear();
    }

    /// Attach a color to every node and every edge of `graph`.
    pub fn colorize(&mut self, graph: &mut Graph) {
        for idx in 0..graph.node_count() {
            let color = self.resolve(graph, idx);
            graph.node_mut(idx).color = Some(color);
        }
        for e in 0..graph.edge_count() {
            let edge = graph.edge(e);
            let endpoint = match self.link_color {
                LinkColorSource::Source => edge.source,
                LinkColorSource::Target => edge.target,
            };
            let color = graph.node(endpoint).color.clone();
            graph.edge_mut(e).color = color;
        }
        tracing::debug!(
            nodes = graph.node_count(),
            hits = self.hits,
            misses = self.misses,
            fallback_labels = self.fallback.assigned(),
            "Colors propagated"
        );
    }

    /// The memoized color of one node.
    pub fn resolve(&mut self, graph: &Graph, idx: NodeIndex) -> Color {
        if let Some(c) = self.resolved.get(&idx) {
            self.hits += 1;
            return c.clone();
        }
        self.misses += 1;

        let color = if idx == graph.root() {
            self.default_color.clone()
        } else if self.is_grouping(graph, idx) {
            self.group_color(graph.node(idx).label())
        } else {
            match nearest_ancestor_at(graph, idx, self.grouping) {
                Some(anc) => self.resolve(graph, anc),
                None => self.default_color.clone(),
            }
        };
        self.resolved.insert(idx, color.clone());
        color
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses
    }

    fn is_grouping(&self, graph: &Graph, idx: NodeIndex) -> bool {
        self.grouping != Level::Root && graph.node(idx).level == self.grouping
    }

    fn group_color(&mut self, label: &str) -> Color {
        if let Some(c) = self.group_colors.get(label) {
            return c.clone();
        }
        match self.fallback.color_for(label) {
            Some(c) => {
                tracing::debug!(label, color = %c, "Assigned fallback group color");
                c
            }
            None => self.default_color.clone(),
        }
    }
}

/// Breadth-first walk up parent edges from `start` to the nearest node at `level`.
///
/// `start` itself is not considered.
pub fn nearest_ancestor_at(graph: &Graph, start: NodeIndex, level: Level) -> Option<NodeIndex> {
    let mut seen: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue: VecDeque<NodeIndex> = graph.parents(start).iter().copied().collect();
    seen.extend(queue.iter().copied());

    while let Some(n) = queue.pop_front() {
        if graph.node(n).level == level {
            return Some(n);
        }
        for &p in graph.parents(n) {
            if seen.insert(p) {
                queue.push_back(p);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
