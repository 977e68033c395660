//! Record set → hierarchy graph.
//!
//! Each record contributes its non-empty fields, in column order, as a chain
//! hanging off the synthetic root. Repeated transitions collapse into a single
//! edge whose count is the number of contributing records.
//!
//! An explicit [`LinkSet`] is taken as given instead: parentless nodes hang
//! off the root, and each node's level is its breadth-first distance from it.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::model::{Graph, NodeIndex};
use crate::config::GraphConfig;
use crate::error::{LnGraphError, Result};
use crate::types::{Level, LinkSet, NodeId, Record};

/// Counters from one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Input rows: records, or links for a [`LinkSet`].
    pub records_total: usize,
    /// Records with at least one non-empty field; every link counts.
    pub records_used: usize,
    pub nodes: usize,
    pub links: usize,
}

/// Builds graphs for one column layout.
pub struct GraphBuilder<'a> {
    config: &'a GraphConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a GraphConfig) -> Self {
        Self { config }
    }

    /// Build the full graph. Pure: the same records always give the same graph.
    pub fn build(&self, records: &[Record]) -> (Graph, BuildStats) {
        let mut graph = Graph::new(&self.config.root_label);
        let mut used = 0usize;

        for record in records {
            let chain = self.chain(&mut graph, record);
            if chain.is_empty() {
                continue;
            }
            used += 1;

            let mut prev = graph.root();
            for next in chain {
                match graph.add_edge(prev, next, 1) {
                    Ok(_) => {}
                    Err(LnGraphError::SelfLoop(id)) => {
                        tracing::warn!(node = %id, "Skipping self-loop transition");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping transition");
                    }
                }
                prev = next;
            }
        }

        let stats = BuildStats {
            records_total: records.len(),
            records_used: used,
            nodes: graph.node_count(),
            links: graph.edge_count(),
        };
        tracing::info!(
            records = stats.records_total,
            used = stats.records_used,
            nodes = stats.nodes,
            links = stats.links,
            "Graph built"
        );
        (graph, stats)
    }

    /// Build the graph a [`LinkSet`] spells out.
    ///
    /// Nodes without an incoming link become children of the root. Levels
    /// come from a breadth-first walk down from them; a node the walk never
    /// reaches sits behind a cycle, gets the first level and no root edge,
    /// and is left for the validator to report. A link from a node to
    /// itself is rejected with [`LnGraphError::SelfLoop`].
    pub fn build_links(&self, set: &LinkSet) -> Result<(Graph, BuildStats)> {
        let mut names: Vec<&str> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        let listed = set.nodes().iter().map(String::as_str);
        let endpoints = set
            .links()
            .iter()
            .flat_map(|(s, t)| [s.as_str(), t.as_str()]);
        for name in listed.chain(endpoints) {
            position.entry(name).or_insert_with(|| {
                names.push(name);
                names.len() - 1
            });
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
        let mut has_parent = vec![false; names.len()];
        let mut links = Vec::with_capacity(set.links().len());
        for (source, target) in set.links() {
            if source == target {
                return Err(LnGraphError::SelfLoop(source.clone()));
            }
            let (s, t) = (position[source.as_str()], position[target.as_str()]);
            children[s].push(t);
            has_parent[t] = true;
            links.push((s, t));
        }

        let tops: Vec<usize> = (0..names.len()).filter(|&n| !has_parent[n]).collect();
        let mut level: Vec<Option<usize>> = vec![None; names.len()];
        let mut queue: VecDeque<usize> = VecDeque::new();
        for &n in &tops {
            level[n] = Some(0);
            queue.push_back(n);
        }
        while let Some(n) = queue.pop_front() {
            let next = level[n].map(|l| l + 1);
            for &c in &children[n] {
                if level[c].is_none() {
                    level[c] = next;
                    queue.push_back(c);
                }
            }
        }

        let mut graph = Graph::new(&self.config.root_label);
        let index: Vec<NodeIndex> = names
            .iter()
            .zip(&level)
            .map(|(name, l)| {
                let l = l.unwrap_or(0);
                graph.ensure_node(NodeId::new(&self.level_tag(l), name), Level::Column(l))
            })
            .collect();

        let root = graph.root();
        for &n in &tops {
            graph.add_edge(root, index[n], 1)?;
        }
        for (s, t) in links {
            graph.add_edge(index[s], index[t], 1)?;
        }

        let unreached = level.iter().filter(|l| l.is_none()).count();
        let stats = BuildStats {
            records_total: set.links().len(),
            records_used: set.links().len(),
            nodes: graph.node_count(),
            links: graph.edge_count(),
        };
        tracing::info!(
            links = stats.records_total,
            nodes = stats.nodes,
            edges = stats.links,
            unreached,
            "Graph built from links"
        );
        Ok((graph, stats))
    }

    /// Tag for nodes at column level `level`; levels past the configured
    /// columns are tagged `L<depth>`.
    fn level_tag(&self, level: usize) -> String {
        self.config
            .columns
            .get(level)
            .map(|c| c.tag.clone())
            .unwrap_or_else(|| format!("L{}", level + 1))
    }

    /// Node indices of the record's non-empty fields, root-most first.
    fn chain(&self, graph: &mut Graph, record: &Record) -> Vec<NodeIndex> {
        self.config
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, col)| {
                let value = record.get(&col.name);
                if value.is_empty() {
                    return None;
                }
                Some(graph.ensure_node(NodeId::new(&col.tag, value), Level::Column(i)))
            })
            .collect()
    }
}

/// Shorthand for `GraphBuilder::new(config).build(records).0`.
pub fn build(records: &[Record], config: &GraphConfig) -> Graph {
    GraphBuilder::new(config).build(records).0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
