//! SVG flamegraph of the hydration call tree.
//!
//! Frames are colored by how the attribution classifier sees them, so the
//! components and modules in the ranking are easy to spot in the graph.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, get_truncated_name, FlamegraphConfig, NodeCategory};
