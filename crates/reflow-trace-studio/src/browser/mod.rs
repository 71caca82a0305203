//! Browser automation seams.
//!
//! Everything that crosses the remote-debugging boundary goes through the
//! traits defined here. [`chrome::ChromeSession`] implements them on top of
//! `headless_chrome`; tests implement them with in-memory fakes.

pub mod chrome;
pub mod devices;
pub mod network_idle;

pub use chrome::{ChromeSession, LaunchConfig};
pub use devices::{device_names, find_device, DeviceProfile, KNOWN_DEVICES};
pub use network_idle::NetworkIdleMonitor;

use crate::utils::error::BrowserError;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// A DOM node located from outside the page
///
/// Handles are opaque: the node may be detached by the time a screenshot is
/// attempted, in which case [`NodeHandle::try_screenshot`] returns `None`.
pub trait NodeHandle: Send + Sync {
    /// Value of the marker attribute the node was tagged with
    fn marker(&self) -> &str;

    /// PNG bytes of the node, or `None` if it can no longer be captured
    fn try_screenshot(&self) -> Option<Vec<u8>>;
}

/// One page of a controlled browser
pub trait PageSession {
    /// Register a script that runs in every new document before page scripts
    fn install_script(&self, source: &str) -> Result<(), BrowserError>;

    /// Evaluate an expression in the page and return its JSON value
    ///
    /// `undefined` comes back as `Value::Null`.
    fn evaluate(&self, expression: &str, await_promise: bool) -> Result<Value, BrowserError>;

    /// Every attached element carrying `attribute`
    fn query_marked_nodes(&self, attribute: &str) -> Result<Vec<Box<dyn NodeHandle>>, BrowserError>;
}

/// Whole-page control used by the capture orchestrator
pub trait BrowserDriver: PageSession {
    /// Apply CPU throttling and a device profile
    fn emulate(&self, device: &DeviceProfile, cpu_throttling: f64) -> Result<(), BrowserError>;

    /// Start recording a trace
    fn start_trace(&self) -> Result<(), BrowserError>;

    /// Stop recording and write the trace to `path`
    fn stop_trace(&self, path: &Path) -> Result<(), BrowserError>;

    /// Navigate and wait for the load; `Ok(false)` means the wait timed out
    fn navigate(&self, url: &str, timeout: Duration) -> Result<bool, BrowserError>;

    /// Wait until no request has been in flight for `quiet`; false on timeout
    fn wait_for_network_idle(&self, quiet: Duration, timeout: Duration) -> bool;

    /// Scroll to the bottom of the document and wait for the next animation frame
    fn scroll_to_bottom(&self) -> Result<(), BrowserError>;
}

/// Marker ids held by one tagged element
///
/// A node that shifted more than once carries a space-separated list.
pub fn marker_ids(attribute_value: &str) -> impl Iterator<Item = &str> {
    attribute_value.split_whitespace()
}

/// CSS selector for the element whose marker list contains `id`
pub fn marker_selector(attribute: &str, id: &str) -> String {
    format!("[{}~=\"{}\"]", attribute, id)
}
