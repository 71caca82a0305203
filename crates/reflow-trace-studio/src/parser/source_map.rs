//! Source mapping service for browser traces.
//!
//! Rewrites stack frames embedded in trace events so they point at original
//! (pre-build) sources. Scripts are fetched once per URL; their source map is
//! located through the trailing `sourceMappingURL` comment, either inline as a
//! `data:` URL or as a URL relative to the script.

use crate::parser::trace::{read_trace_file, trace_event_values_mut};
use crate::utils::config::SOURCE_MAP_FETCH_TIMEOUT;
use crate::utils::error::{SourceMapError, TraceError};
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use sourcemap::{DecodedMap, SourceMap};
use std::collections::HashMap;
use std::path::Path;

const MAPPING_URL_MARKERS: &[&str] = &["//# sourceMappingURL=", "//@ sourceMappingURL="];

/// A resolved location in original source
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub file: String,
    /// Zero-based line
    pub line: u32,
    /// Zero-based column
    pub column: u32,
    pub function: Option<String>,
}

/// How a frame numbers its lines and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameBase {
    /// Stack traces attached to timeline events
    OneBased,
    /// CPU profile call frames
    ZeroBased,
}

/// Mapper that resolves script locations through their source maps
pub struct SourceMapper {
    client: Option<Client>,
    /// Keyed by script URL; `None` records a script without a usable map
    maps: HashMap<String, Option<SourceMap>>,
}

impl SourceMapper {
    /// Create a mapper that downloads scripts and maps over HTTP
    pub fn new() -> Result<Self, SourceMapError> {
        let client = Client::builder()
            .timeout(SOURCE_MAP_FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client: Some(client),
            maps: HashMap::new(),
        })
    }

    /// Factory for a mapper that never touches the network (fallback and tests)
    pub fn offline() -> Self {
        Self {
            client: None,
            maps: HashMap::new(),
        }
    }

    /// Register a source map for a script URL up front
    pub fn insert_map(&mut self, script_url: impl Into<String>, map: SourceMap) {
        self.maps.insert(script_url.into(), Some(map));
    }

    /// Lookup the original location for a zero-based position in a script
    pub fn lookup(&mut self, script_url: &str, line: u32, column: u32) -> Option<SourceLocation> {
        let map = self.map_for(script_url)?;
        let token = map.lookup_token(line, column)?;

        Some(SourceLocation {
            file: token.get_source()?.to_string(),
            line: token.get_src_line(),
            column: token.get_src_col(),
            function: token.get_name().map(str::to_string),
        })
    }

    /// Return a copy of `raw_trace` with every embedded frame source-mapped
    ///
    /// Frames whose script has no resolvable map are left untouched.
    pub fn map_trace(&mut self, raw_trace: &Value) -> Result<Value, TraceError> {
        let mut mapped = raw_trace.clone();
        let mut rewritten = 0usize;

        for event in trace_event_values_mut(&mut mapped)? {
            let Some(args) = event.get_mut("args") else {
                continue;
            };

            for section in ["data", "beginData"] {
                if let Some(frames) = args
                    .get_mut(section)
                    .and_then(|s| s.get_mut("stackTrace"))
                    .and_then(Value::as_array_mut)
                {
                    for frame in frames {
                        rewritten += usize::from(self.map_frame(frame, FrameBase::OneBased));
                    }
                }
            }

            if let Some(nodes) = args
                .get_mut("data")
                .and_then(|d| d.get_mut("cpuProfile"))
                .and_then(|p| p.get_mut("nodes"))
                .and_then(Value::as_array_mut)
            {
                for node in nodes {
                    if let Some(call_frame) = node.get_mut("callFrame") {
                        rewritten += usize::from(self.map_frame(call_frame, FrameBase::ZeroBased));
                    }
                }
            }
        }

        info!(
            "Source-mapped {} frames across {} scripts",
            rewritten,
            self.maps.values().filter(|m| m.is_some()).count()
        );
        Ok(mapped)
    }

    /// Rewrite one frame object in place; returns true if it was mapped
    fn map_frame(&mut self, frame: &mut Value, base: FrameBase) -> bool {
        let Some(url) = frame.get("url").and_then(Value::as_str).map(str::to_string) else {
            return false;
        };
        let line = frame.get("lineNumber").and_then(Value::as_i64).unwrap_or(-1);
        let column = frame.get("columnNumber").and_then(Value::as_i64).unwrap_or(-1);

        let offset = match base {
            FrameBase::OneBased => 1,
            FrameBase::ZeroBased => 0,
        };
        let (Ok(line), Ok(column)) = (u32::try_from(line - offset), u32::try_from(column - offset))
        else {
            return false;
        };

        let Some(location) = self.lookup(&url, line, column) else {
            return false;
        };

        frame["url"] = Value::from(location.file);
        frame["lineNumber"] = Value::from(i64::from(location.line) + offset);
        frame["columnNumber"] = Value::from(i64::from(location.column) + offset);
        if let Some(function) = location.function {
            frame["functionName"] = Value::from(function);
        }
        true
    }

    fn map_for(&mut self, script_url: &str) -> Option<&SourceMap> {
        if !self.maps.contains_key(script_url) {
            let loaded = match self.load_map(script_url) {
                Ok(map) => Some(map),
                Err(e) => {
                    debug!("No source map for {}: {}", script_url, e);
                    None
                }
            };
            self.maps.insert(script_url.to_string(), loaded);
        }

        self.maps.get(script_url)?.as_ref()
    }

    fn load_map(&self, script_url: &str) -> Result<SourceMap, SourceMapError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| SourceMapError::UnsupportedLocation(script_url.to_string()))?;

        if !script_url.starts_with("http://") && !script_url.starts_with("https://") {
            return Err(SourceMapError::UnsupportedLocation(script_url.to_string()));
        }

        let script = client.get(script_url).send()?.error_for_status()?.text()?;
        let mapping_url = find_mapping_url(&script)
            .ok_or_else(|| SourceMapError::NoMappingUrl(script_url.to_string()))?;

        if mapping_url.starts_with("data:") {
            return into_regular_map(sourcemap::decode_data_url(mapping_url)?);
        }

        let map_url = Url::parse(script_url)
            .and_then(|base| base.join(mapping_url))
            .map_err(|e| SourceMapError::UnsupportedLocation(format!("{}: {}", mapping_url, e)))?;

        debug!("Fetching source map: {}", map_url);
        let bytes = client.get(map_url).send()?.error_for_status()?.bytes()?;
        into_regular_map(sourcemap::decode_slice(&bytes)?)
    }
}

/// Find the last `sourceMappingURL` reference in a script
pub fn find_mapping_url(script: &str) -> Option<&str> {
    MAPPING_URL_MARKERS
        .iter()
        .filter_map(|marker| {
            script
                .rfind(marker)
                .map(|pos| (pos, &script[pos + marker.len()..]))
        })
        .max_by_key(|(pos, _)| *pos)
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .filter(|url| !url.is_empty())
}

fn into_regular_map(decoded: DecodedMap) -> Result<SourceMap, SourceMapError> {
    match decoded {
        DecodedMap::Regular(map) => Ok(map),
        DecodedMap::Index(index) => Ok(index.flatten()?),
        _ => Err(SourceMapError::UnsupportedLocation(
            "unsupported source map flavour".to_string(),
        )),
    }
}

/// Read a raw trace, source-map it, and persist the pretty-printed result
///
/// **Public** - the profile loader step of a measurement run
///
/// The persisted copy is for offline inspection; the returned value is what
/// the rest of the run consumes.
pub fn load_mapped_profile(
    raw_path: impl AsRef<Path>,
    mapped_path: impl AsRef<Path>,
    mapper: &mut SourceMapper,
) -> anyhow::Result<Value> {
    let raw = read_trace_file(raw_path)?;
    let mapped = mapper.map_trace(&raw)?;
    crate::output::write_json_pretty(&mapped, mapped_path)?;
    Ok(mapped)
}
