//! One visualization session: the full graph, what is visible of it, and the
//! caches that belong to it.
//!
//! Every user interaction maps onto one `&mut self` method here. Rendering
//! always validates the view first and hands the renderer a full snapshot.

use std::path::Path;
use std::time::Instant;

use crate::config::GraphConfig;
use crate::error::{LnGraphError, Result};
use crate::graph::{
    assert_acyclic, assert_view_acyclic, filter, find_matches, BuildStats, ColorPropagator,
    Disclosure, DisclosureState, Graph, GraphBuilder, View,
};
use crate::observability::SessionMetrics;
use crate::records::{placeholder_records, read_input, GraphInput};
use crate::render::{RenderPayload, Renderer};
use crate::types::{LinkSet, NodeId, Record};

pub struct VisualizationSession {
    config: GraphConfig,
    graph: Graph,
    stats: BuildStats,
    colors: ColorPropagator,
    disclosure: Disclosure,
    query: Option<String>,
    placeholder: bool,
    metrics: SessionMetrics,
}

impl VisualizationSession {
    /// A session over a root-only graph. Fails on an invalid config.
    pub fn new(config: GraphConfig) -> Result<Self> {
        config.validate()?;
        let mut graph = Graph::new(&config.root_label);
        let mut colors = ColorPropagator::from_config(&config);
        colors.colorize(&mut graph);
        let disclosure = Disclosure::new(&graph, config.default_depth);
        Ok(Self {
            config,
            graph,
            stats: BuildStats {
                nodes: 1,
                ..Default::default()
            },
            colors,
            disclosure,
            query: None,
            placeholder: false,
            metrics: SessionMetrics::new(),
        })
    }

    // -------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------

    /// Rebuild the graph from `records`.
    ///
    /// On a cycle the previous graph stays in place and the error is
    /// returned. On success the color cache is invalidated, disclosure resets
    /// to the default depth, and any filter is cleared.
    pub fn load_records(&mut self, records: &[Record]) -> Result<BuildStats> {
        let started = Instant::now();
        let (graph, stats) = GraphBuilder::new(&self.config).build(records);
        self.install(graph, stats, started)
    }

    /// Rebuild the graph from an explicit link graph, with the same
    /// guarantees as [`Self::load_records`]. A self-link is rejected before
    /// anything is replaced.
    pub fn load_links(&mut self, links: &LinkSet) -> Result<BuildStats> {
        let started = Instant::now();
        let (graph, stats) = GraphBuilder::new(&self.config).build_links(links)?;
        self.install(graph, stats, started)
    }

    pub fn load_input(&mut self, input: &GraphInput) -> Result<BuildStats> {
        match input {
            GraphInput::Records(records) => self.load_records(records),
            GraphInput::Links(links) => self.load_links(links),
        }
    }

    /// Load the payload at `path`, falling back to the placeholder graph when
    /// the file cannot be read or has no accepted shape.
    ///
    /// Only an integrity failure of the loaded graph (a cycle or a self-link)
    /// is returned as an error; the previous graph is kept.
    pub fn load_from_path(&mut self, path: &Path) -> Result<BuildStats> {
        match read_input(path) {
            Ok(input) => self.load_input(&input),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Load failed, using placeholder graph");
                self.load_placeholder()
            }
        }
    }

    /// [`Self::load_from_path`] on the configured data path.
    pub fn load_configured(&mut self) -> Result<BuildStats> {
        let path = self.config.data_path.clone();
        self.load_from_path(&path)
    }

    pub fn load_placeholder(&mut self) -> Result<BuildStats> {
        let records = placeholder_records(&self.config);
        let stats = self.load_records(&records)?;
        self.placeholder = true;
        self.metrics.load_fallbacks += 1;
        Ok(stats)
    }

    /// Swap in a freshly built graph once it passes validation.
    fn install(&mut self, mut graph: Graph, stats: BuildStats, started: Instant) -> Result<BuildStats> {
        assert_acyclic(&graph)?;

        self.colors.invalidate();
        self.colors.colorize(&mut graph);

        self.disclosure = Disclosure::new(&graph, self.config.default_depth);
        self.graph = graph;
        self.stats = stats;
        self.query = None;
        self.placeholder = false;

        self.metrics.builds += 1;
        self.metrics.last_build_ms = Some(started.elapsed().as_millis() as u64);
        self.sync_color_metrics();
        Ok(stats)
    }

    // -------------------------------------------------------------------
    // Interaction
    // -------------------------------------------------------------------

    /// Reveal every descendant of a visible node.
    pub fn expand(&mut self, id: &str) -> Result<usize> {
        let added = self.disclosure.expand(&self.graph, id)?;
        self.metrics.expansions += 1;
        Ok(added)
    }

    pub fn collapse_all(&mut self) {
        self.disclosure.collapse_all(&self.graph);
        self.metrics.collapses += 1;
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.disclosure.set_depth(&self.graph, depth);
        self.metrics.depth_changes += 1;
    }

    /// Apply a textual filter; a blank query clears it.
    pub fn set_filter(&mut self, query: &str) {
        let trimmed = query.trim();
        self.query = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.metrics.filters += 1;
    }

    pub fn reset_filter(&mut self) {
        self.query = None;
    }

    /// Ids of visible nodes whose label matches `query`.
    pub fn search(&self, query: &str) -> Vec<NodeId> {
        find_matches(&self.graph, self.disclosure.view(), query)
            .into_iter()
            .map(|n| self.graph.node(n).id.clone())
            .collect()
    }

    // -------------------------------------------------------------------
    // Views and rendering
    // -------------------------------------------------------------------

    /// The disclosure view with the active filter applied.
    pub fn current_view(&self) -> View {
        let base = self.disclosure.view();
        match &self.query {
            Some(q) => filter(&self.graph, base, q),
            None => base.clone(),
        }
    }

    /// The validated render payload of the current view.
    pub fn payload(&self) -> Result<RenderPayload> {
        self.payload_of(&self.current_view())
    }

    /// The payload of the disclosure view filtered by `query` in place of
    /// the stored filter, which is left untouched. A blank query shows the
    /// unfiltered disclosure view.
    pub fn preview_filter(&self, query: &str) -> Result<RenderPayload> {
        self.payload_of(&filter(&self.graph, self.disclosure.view(), query))
    }

    fn payload_of(&self, view: &View) -> Result<RenderPayload> {
        assert_view_acyclic(&self.graph, view)?;
        Ok(RenderPayload::from_view(
            &self.graph,
            view,
            self.config.weight_policy,
        ))
    }

    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let payload = self.payload()?;
        renderer.render(&payload)?;
        self.metrics.renders += 1;
        tracing::debug!(
            nodes = payload.nodes.len(),
            links = payload.links.len(),
            "Rendered view"
        );
        Ok(())
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn disclosure_state(&self) -> &DisclosureState {
        self.disclosure.state()
    }

    pub fn filter_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// True when the current graph is the load-failure stand-in.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Resolve a raw id, for callers holding ids from a renderer.
    pub fn node_id(&self, raw: &str) -> Result<NodeId> {
        self.graph
            .index_of(raw)
            .map(|n| self.graph.node(n).id.clone())
            .ok_or_else(|| LnGraphError::UnknownNode(raw.to_string()))
    }

    fn sync_color_metrics(&mut self) {
        self.metrics.color_cache_hits = self.colors.cache_hits();
        self.metrics.color_cache_misses = self.colors.cache_misses();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
