//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in the binaries and commands.

use thiserror::Error;

/// Errors that can occur while reading trace files
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while resolving a source map
#[derive(Error, Debug)]
pub enum SourceMapError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Source map could not be decoded: {0}")]
    DecodeFailed(#[from] sourcemap::Error),

    #[error("No sourceMappingURL found for {0}")]
    NoMappingUrl(String),

    #[error("Unsupported source map location: {0}")]
    UnsupportedLocation(String),
}

/// Errors that can occur while tracking layout shifts in the page
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Layout shift tracking was not installed in this page")]
    NotInstalled,

    #[error("Page evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Unexpected tracking payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised by the browser automation layer
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("DevTools protocol call failed: {0}")]
    ProtocolFailed(String),

    #[error("Unknown device '{0}'")]
    UnknownDevice(String),

    #[error("Trace was not flushed within {0:?}")]
    TraceFlushTimeout(std::time::Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Not an SVG document (starts with {0:?})")]
    NotSvg(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Call tree is empty")]
    EmptyTree,
}
