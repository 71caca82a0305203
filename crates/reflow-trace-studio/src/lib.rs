//! Reflow Trace Studio library
//!
//! Browser trace capture, reflow and layout shift analysis, and offline
//! hydration attribution. The binaries are thin wrappers over [`commands`].

pub mod aggregator;
pub mod browser;
pub mod commands;
pub mod flamegraph;
pub mod hydration;
pub mod output;
pub mod parser;
pub mod tracking;
pub mod utils;
