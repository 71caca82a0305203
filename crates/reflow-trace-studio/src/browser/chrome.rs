//! `headless_chrome` implementation of the browser seams.
//!
//! Traces are recorded with `transferMode: ReturnAsStream`. When Chrome
//! reports `Tracing.tracingComplete` it hands back an `IO` stream handle, and
//! [`stop_trace`](BrowserDriver::stop_trace) drains that stream into the
//! raw-trace file chunk by chunk.

use super::network_idle::NetworkIdleMonitor;
use super::{marker_ids, marker_selector, BrowserDriver, DeviceProfile, NodeHandle, PageSession};
use crate::utils::config::{TRACE_CATEGORIES, TRACE_FLUSH_TIMEOUT};
use crate::utils::error::BrowserError;
use headless_chrome::protocol::cdp::types::{Event, Method};
use headless_chrome::protocol::cdp::{Emulation, Network, Page, Runtime, ServiceWorker, Tracing, IO};
use headless_chrome::util::Timeout;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use log::{debug, info, warn};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bytes requested per `IO.read`
const STREAM_CHUNK_SIZE: u32 = 1 << 20;

const SCROLL_TO_BOTTOM_SCRIPT: &str = r#"new Promise((resolve) => {
    requestAnimationFrame(() => {
        window.scrollTo(0, document.documentElement.scrollHeight);
        requestAnimationFrame(() => resolve(true));
    });
})"#;

/// Browser launch options
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Show the browser window instead of running headless
    pub show_browser: bool,
    pub window_size: (u32, u32),
}

/// Where the current trace recording stands
#[derive(Debug, Default)]
struct TraceState {
    complete: bool,
    data_loss: bool,
    /// `IO` handle of the finished trace
    stream: Option<String>,
}

/// A launched browser with one page
pub struct ChromeSession {
    // Dropping the browser closes it
    _browser: Browser,
    tab: Arc<Tab>,
    network: Arc<Mutex<NetworkIdleMonitor>>,
    trace: Arc<Mutex<TraceState>>,
}

impl ChromeSession {
    /// Launch a browser, open a page and enable the network and service-worker domains
    pub fn launch(config: &LaunchConfig) -> Result<Self, BrowserError> {
        info!(
            "Launching {} browser",
            if config.show_browser { "visible" } else { "headless" }
        );

        let options = LaunchOptionsBuilder::default()
            .headless(!config.show_browser)
            .window_size(Some(config.window_size))
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let session = Self {
            _browser: browser,
            tab,
            network: Arc::new(Mutex::new(NetworkIdleMonitor::new(Instant::now()))),
            trace: Arc::new(Mutex::new(TraceState::default())),
        };

        session.listen()?;
        session.call(Network::Enable {
            max_total_buffer_size: None,
            max_resource_buffer_size: None,
            max_post_data_size: None,
            report_direct_socket_traffic: None,
            enable_durable_messages: None,
        })?;
        session.call(ServiceWorker::Enable(None))?;

        Ok(session)
    }

    fn listen(&self) -> Result<(), BrowserError> {
        let network = Arc::clone(&self.network);
        let trace = Arc::clone(&self.trace);

        self.tab
            .add_event_listener(Arc::new(move |event: &Event| {
                route_event(event, &network, &trace)
            }))
            .map_err(|e| BrowserError::ProtocolFailed(e.to_string()))?;

        Ok(())
    }

    fn call<C>(&self, method: C) -> Result<C::ReturnObject, BrowserError>
    where
        C: Method + serde::Serialize + std::fmt::Debug,
    {
        call_on(&self.tab, method)
    }
}

fn call_on<C>(tab: &Tab, method: C) -> Result<C::ReturnObject, BrowserError>
where
    C: Method + serde::Serialize + std::fmt::Debug,
{
    tab.call_method(method)
        .map_err(|e| BrowserError::ProtocolFailed(format!("{}: {}", C::NAME, e)))
}

/// Feed one DevTools event into the network monitor and the trace state
fn route_event(event: &Event, network: &Mutex<NetworkIdleMonitor>, trace: &Mutex<TraceState>) {
    match event {
        Event::NetworkRequestWillBeSent(e) => {
            if let Ok(mut monitor) = network.lock() {
                monitor.request_started(e.params.request_id.clone(), Instant::now());
            }
        }
        Event::NetworkLoadingFinished(e) => {
            if let Ok(mut monitor) = network.lock() {
                monitor.request_finished(&e.params.request_id, Instant::now());
            }
        }
        Event::NetworkLoadingFailed(e) => {
            if let Ok(mut monitor) = network.lock() {
                monitor.request_finished(&e.params.request_id, Instant::now());
            }
        }
        Event::TracingComplete(e) => {
            if let Ok(mut state) = trace.lock() {
                state.complete = true;
                state.data_loss = e.params.data_loss_occurred;
                state.stream = e.params.stream.clone();
            }
        }
        _ => {}
    }
}

/// Reads an `IO` stream one chunk at a time
trait StreamReader {
    fn read_chunk(&self, handle: &str) -> Result<IO::ReadReturnObject, BrowserError>;

    fn close_stream(&self, handle: &str) -> Result<(), BrowserError>;
}

impl StreamReader for Tab {
    fn read_chunk(&self, handle: &str) -> Result<IO::ReadReturnObject, BrowserError> {
        call_on(
            self,
            IO::Read {
                handle: handle.to_string(),
                offset: None,
                size: Some(STREAM_CHUNK_SIZE),
            },
        )
    }

    fn close_stream(&self, handle: &str) -> Result<(), BrowserError> {
        call_on(
            self,
            IO::Close {
                handle: handle.to_string(),
            },
        )?;
        Ok(())
    }
}

/// Copy a stream into `writer` until EOF, then close it
///
/// The stream is closed even when copying fails; the copy error wins.
fn drain_stream<R, W>(reader: &R, handle: &str, writer: &mut W) -> Result<u64, BrowserError>
where
    R: StreamReader + ?Sized,
    W: Write,
{
    let copied = copy_chunks(reader, handle, writer);
    let closed = reader.close_stream(handle);
    let written = copied?;
    closed?;
    Ok(written)
}

fn copy_chunks<R, W>(reader: &R, handle: &str, writer: &mut W) -> Result<u64, BrowserError>
where
    R: StreamReader + ?Sized,
    W: Write,
{
    let mut written = 0u64;
    loop {
        let chunk = reader.read_chunk(handle)?;
        if chunk.base_64_encoded.unwrap_or(false) {
            return Err(BrowserError::ProtocolFailed(
                "trace stream is base64-encoded; expected uncompressed JSON".to_string(),
            ));
        }
        writer.write_all(chunk.data.as_bytes())?;
        written += chunk.data.len() as u64;
        if chunk.eof {
            return Ok(written);
        }
    }
}

/// Wait for `Tracing.tracingComplete`, then write the trace stream to `path`
fn collect_trace<R>(
    reader: &R,
    trace: &Mutex<TraceState>,
    path: &Path,
    timeout: Duration,
) -> Result<u64, BrowserError>
where
    R: StreamReader + ?Sized,
{
    let started = Instant::now();
    let handle = loop {
        let finished = trace
            .lock()
            .ok()
            .filter(|state| state.complete)
            .map(|mut state| {
                if state.data_loss {
                    warn!("Chrome reported trace data loss; the trace may be incomplete");
                }
                state.stream.take()
            });

        match finished {
            Some(Some(handle)) => break handle,
            Some(None) => {
                return Err(BrowserError::ProtocolFailed(
                    "tracing completed without a stream handle".to_string(),
                ))
            }
            None if started.elapsed() > timeout => {
                return Err(BrowserError::TraceFlushTimeout(timeout))
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let mut writer = BufWriter::new(File::create(path)?);
    let written = drain_stream(reader, &handle, &mut writer)?;
    writer.flush()?;
    Ok(written)
}

/// Map a navigation result: a timeout is advisory, anything else is fatal
fn navigation_outcome(url: &str, result: anyhow::Result<()>) -> Result<bool, BrowserError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is::<Timeout>() => {
            debug!("Navigation to {} timed out: {}", url, e);
            Ok(false)
        }
        Err(e) => Err(BrowserError::ProtocolFailed(format!(
            "navigation to {}: {}",
            url, e
        ))),
    }
}

impl PageSession for ChromeSession {
    fn install_script(&self, source: &str) -> Result<(), BrowserError> {
        self.call(Page::AddScriptToEvaluateOnNewDocument {
            source: source.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })?;
        Ok(())
    }

    fn evaluate(&self, expression: &str, await_promise: bool) -> Result<Value, BrowserError> {
        let response = self.call(Runtime::Evaluate {
            expression: expression.to_string(),
            return_by_value: Some(true),
            generate_preview: None,
            silent: Some(false),
            await_promise: Some(await_promise),
            include_command_line_api: None,
            user_gesture: None,
            object_group: None,
            context_id: None,
            throw_on_side_effect: None,
            timeout: None,
            disable_breaks: None,
            repl_mode: None,
            allow_unsafe_eval_blocked_by_csp: None,
            unique_context_id: None,
            serialization_options: None,
        })?;

        if let Some(details) = response.exception_details {
            let message = details
                .exception
                .and_then(|exception| exception.description)
                .unwrap_or(details.text);
            return Err(BrowserError::ProtocolFailed(format!(
                "evaluation threw: {}",
                message
            )));
        }

        Ok(response.result.value.unwrap_or(Value::Null))
    }

    fn query_marked_nodes(&self, attribute: &str) -> Result<Vec<Box<dyn NodeHandle>>, BrowserError> {
        let expression = format!(
            "Array.from(document.querySelectorAll('[{attr}]'), (el) => el.getAttribute('{attr}'))",
            attr = attribute
        );
        let values: Vec<String> = serde_json::from_value(self.evaluate(&expression, false)?)?;

        Ok(values
            .iter()
            .flat_map(|value| marker_ids(value))
            .map(|marker| {
                Box::new(ChromeNode {
                    tab: Arc::clone(&self.tab),
                    selector: marker_selector(attribute, marker),
                    marker: marker.to_string(),
                }) as Box<dyn NodeHandle>
            })
            .collect())
    }
}

impl BrowserDriver for ChromeSession {
    fn emulate(&self, device: &DeviceProfile, cpu_throttling: f64) -> Result<(), BrowserError> {
        info!(
            "Emulating {} ({}x{}) with {}x CPU slowdown",
            device.name, device.width, device.height, cpu_throttling
        );

        self.call(Emulation::SetCPUThrottlingRate {
            rate: cpu_throttling,
        })?;
        self.call(Emulation::SetDeviceMetricsOverride {
            width: device.width,
            height: device.height,
            device_scale_factor: device.device_scale_factor,
            mobile: device.mobile,
            scale: None,
            screen_width: None,
            screen_height: None,
            position_x: None,
            position_y: None,
            dont_set_visible_size: None,
            screen_orientation: None,
            viewport: None,
            display_feature: None,
            device_posture: None,
        })?;
        self.call(Emulation::SetTouchEmulationEnabled {
            enabled: device.touch,
            max_touch_points: device.touch.then_some(5),
        })?;
        self.tab
            .set_user_agent(device.user_agent, None, None)
            .map_err(|e| BrowserError::ProtocolFailed(format!("user agent override: {}", e)))?;
        Ok(())
    }

    fn start_trace(&self) -> Result<(), BrowserError> {
        if let Ok(mut state) = self.trace.lock() {
            *state = TraceState::default();
        }
        self.call(Tracing::Start {
            categories: Some(TRACE_CATEGORIES.join(",")),
            options: None,
            buffer_usage_reporting_interval: None,
            transfer_mode: Some(Tracing::StartTransfer_modeOption::ReturnAsStream),
            stream_format: Some(Tracing::StreamFormat::Json),
            stream_compression: None,
            trace_config: None,
            perfetto_config: None,
            tracing_backend: None,
        })?;
        debug!("Tracing started");
        Ok(())
    }

    fn stop_trace(&self, path: &Path) -> Result<(), BrowserError> {
        self.call(Tracing::End(None))?;

        let written = collect_trace(self.tab.as_ref(), &self.trace, path, TRACE_FLUSH_TIMEOUT)?;
        info!(
            "Trace written to {} ({:.2} MB)",
            path.display(),
            written as f64 / (1024.0 * 1024.0)
        );
        Ok(())
    }

    fn navigate(&self, url: &str, timeout: Duration) -> Result<bool, BrowserError> {
        self.tab.set_default_timeout(timeout);
        let navigated = self
            .tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ());

        navigation_outcome(url, navigated)
    }

    fn wait_for_network_idle(&self, quiet: Duration, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            let now = Instant::now();
            let idle = self
                .network
                .lock()
                .map(|monitor| monitor.is_idle(now, quiet))
                .unwrap_or(false);

            if idle {
                return true;
            }
            if now.duration_since(started) >= timeout {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.evaluate(SCROLL_TO_BOTTOM_SCRIPT, true)?;
        Ok(())
    }
}

/// A tagged element, re-located by selector on every use
struct ChromeNode {
    tab: Arc<Tab>,
    selector: String,
    marker: String,
}

impl NodeHandle for ChromeNode {
    fn marker(&self) -> &str {
        &self.marker
    }

    fn try_screenshot(&self) -> Option<Vec<u8>> {
        let element = self.tab.find_element(&self.selector).ok()?;
        match element.capture_screenshot(Page::CaptureScreenshotFormatOption::Png) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!("Screenshot of {} failed: {}", self.selector, e);
                None
            }
        }
    }
}
