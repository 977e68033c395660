//! Graph layer: construction, coloring, validation, views, disclosure, filter.

pub mod builder;
pub mod color;
pub mod disclosure;
pub mod filter;
pub mod model;
pub mod validate;
pub mod view;

pub use builder::{build, BuildStats, GraphBuilder};
pub use color::{ColorPropagator, FallbackPalette};
pub use disclosure::{Disclosure, DisclosureState};
pub use filter::{filter, find_matches};
pub use model::{Edge, EdgeIndex, Graph, Node, NodeIndex};
pub use validate::{assert_acyclic, assert_view_acyclic};
pub use view::View;
