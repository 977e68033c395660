//! Configuration: schema, presets, and multi-source loading.

pub mod loader;
pub mod preset;
pub mod schema;

pub use loader::load_config;
pub use schema::{ColumnSpec, GraphConfig, LinkColorSource, PresetName, WeightPolicy};
