//! lngraph: hierarchical classification graphs for lymphoid-neoplasm views.
//!
//! Builds a namespaced, weighted DAG from flat classification records,
//! propagates group colors down it, validates acyclicity, and derives the
//! depth-limited, expandable, filterable views a Sankey renderer draws.

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod observability;
pub mod records;
pub mod render;
pub mod session;
pub mod types;
pub mod viz;
