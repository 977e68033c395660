//! Command-line interface.
//!
//! Every subcommand loads the configured record set into one session and
//! drives it the way the interactive page would.

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_config, GraphConfig};
use crate::error::{LnGraphError, Result};
use crate::records::read_input;
use crate::render::JsonRenderer;
use crate::session::VisualizationSession;

#[derive(Debug, Parser)]
#[command(name = "lngraph", version, about = "Lymphoid-neoplasm classification graphs")]
pub struct Cli {
    /// YAML config file (overrides LNGRAPH_CONFIG and the user config).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Record file (overrides the configured data path).
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the graph and print build statistics.
    Build,

    /// Print the render payload of a view as JSON.
    Render {
        /// Depth threshold instead of the configured default.
        #[arg(long)]
        depth: Option<u32>,

        /// Expand a node (repeatable, applied in order).
        #[arg(long = "expand", value_name = "NODE_ID")]
        expand: Vec<String>,

        /// Case-insensitive label filter.
        #[arg(long)]
        filter: Option<String>,

        #[arg(long)]
        pretty: bool,
    },

    /// Load strictly (no placeholder fallback) and check the graph is acyclic.
    ///
    /// Accepts flat records as well as `{nodes, links}` and tree-row graphs.
    Validate,

    /// List visible nodes whose label matches a query.
    Search {
        query: String,

        /// Search the whole graph rather than the default-depth view.
        #[arg(long)]
        all: bool,
    },

    /// Serve the session over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8787")]
        addr: SocketAddr,
    },
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let stdout = std::io::stdout();

    match cli.command {
        Command::Build => {
            let mut session = VisualizationSession::new(config)?;
            let stats = session.load_configured()?;
            let report = serde_json::json!({
                "stats": stats,
                "placeholder": session.is_placeholder(),
            });
            writeln!(stdout.lock(), "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Command::Render {
            depth,
            expand,
            filter,
            pretty,
        } => {
            let mut session = VisualizationSession::new(config)?;
            session.load_configured()?;
            if let Some(d) = depth {
                session.set_depth(d);
            }
            for id in &expand {
                session.expand(id)?;
            }
            if let Some(q) = filter {
                session.set_filter(&q);
            }
            let mut renderer = JsonRenderer::new(stdout.lock());
            if pretty {
                renderer = renderer.pretty();
            }
            session.render(&mut renderer)?;
        }
        Command::Validate => {
            let input = read_input(&config.data_path)?;
            let mut session = VisualizationSession::new(config)?;
            let stats = session.load_input(&input)?;
            writeln!(
                stdout.lock(),
                "ok: {} nodes, {} links, {} of {} rows used",
                stats.nodes,
                stats.links,
                stats.records_used,
                stats.records_total
            )?;
        }
        Command::Search { query, all } => {
            let mut session = VisualizationSession::new(config)?;
            session.load_configured()?;
            if all {
                session.set_depth(u32::MAX);
            }
            let hits = session.search(&query);
            let mut out = stdout.lock();
            if hits.is_empty() {
                writeln!(out, "No match found")?;
            }
            for id in hits {
                writeln!(out, "{id}")?;
            }
        }
        Command::Serve { addr } => {
            let mut session = VisualizationSession::new(config)?;
            session.load_configured()?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime
                .block_on(crate::viz::run_viz_server(session, addr))
                .map_err(|e| LnGraphError::Other(e.to_string()))?;
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<GraphConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_render_flags() {
        let cli = Cli::try_parse_from([
            "lngraph",
            "--data",
            "rows.json",
            "render",
            "--depth",
            "3",
            "--expand",
            "MG|NHL",
            "--expand",
            "MG|HL",
            "--filter",
            "lbcl",
        ])
        .unwrap();
        assert_eq!(cli.data.as_deref(), Some(std::path::Path::new("rows.json")));
        match cli.command {
            Command::Render {
                depth,
                expand,
                filter,
                pretty,
            } => {
                assert_eq!(depth, Some(3));
                assert_eq!(expand, vec!["MG|NHL", "MG|HL"]);
                assert_eq!(filter.as_deref(), Some("lbcl"));
                assert!(!pretty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn serve_has_default_addr() {
        let cli = Cli::try_parse_from(["lngraph", "serve"]).unwrap();
        match cli.command {
            Command::Serve { addr } => assert_eq!(addr.port(), 8787),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lngraph", "build", "--config", "c.yaml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("c.yaml")));
    }

    #[test]
    fn search_requires_query() {
        assert!(Cli::try_parse_from(["lngraph", "search"]).is_err());
    }
}
