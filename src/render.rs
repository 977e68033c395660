//! The renderer boundary.
//!
//! A renderer receives the whole visible graph on every change as a
//! `{nodes, links}` payload and redraws from scratch.

use std::io::Write;

use serde::Serialize;

use crate::config::WeightPolicy;
use crate::error::{LnGraphError, Result};
use crate::graph::{Graph, View};

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub depth: u32,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLink {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderPayload {
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
}

impl RenderPayload {
    /// Snapshot `view` of `graph`, weighting links by `policy`.
    pub fn from_view(graph: &Graph, view: &View, policy: WeightPolicy) -> Self {
        let nodes = view
            .nodes()
            .map(|n| {
                let node = graph.node(n);
                RenderNode {
                    id: node.id.to_string(),
                    label: node.label().to_string(),
                    depth: node.depth(),
                    color: node.color.as_ref().map(ToString::to_string),
                }
            })
            .collect();
        let links = view
            .edges()
            .map(|e| {
                let edge = graph.edge(e);
                RenderLink {
                    source: graph.node(edge.source).id.to_string(),
                    target: graph.node(edge.target).id.to_string(),
                    weight: graph.edge_weight(e, policy),
                    color: edge.color.as_ref().map(ToString::to_string),
                }
            })
            .collect();
        Self { nodes, links }
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Image formats a renderer may be asked to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

pub trait Renderer {
    /// Replace whatever is drawn with `payload`.
    fn render(&mut self, payload: &RenderPayload) -> Result<()>;

    /// Rasterize the current drawing. Most renderers cannot.
    fn export_image(&mut self, format: ImageFormat) -> Result<Vec<u8>> {
        Err(LnGraphError::Unsupported(format!(
            "{format:?} export is not available from this renderer"
        )))
    }
}

/// Writes each payload as one JSON document to `W`.
pub struct JsonRenderer<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, pretty: false }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, payload: &RenderPayload) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, payload)?;
        } else {
            serde_json::to_writer(&mut self.out, payload)?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
