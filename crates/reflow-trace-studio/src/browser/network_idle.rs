//! Network quiescence tracking.
//!
//! Fed by request start/finish notifications from the DevTools event stream.
//! Instants are passed in explicitly so the state machine is deterministic.

use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct NetworkIdleMonitor {
    in_flight: HashSet<String>,
    last_activity: Instant,
}

impl NetworkIdleMonitor {
    pub fn new(now: Instant) -> Self {
        Self {
            in_flight: HashSet::new(),
            last_activity: now,
        }
    }

    pub fn request_started(&mut self, request_id: impl Into<String>, now: Instant) {
        self.in_flight.insert(request_id.into());
        self.last_activity = now;
    }

    /// Finished and failed requests both end up here
    pub fn request_finished(&mut self, request_id: &str, now: Instant) {
        if self.in_flight.remove(request_id) {
            self.last_activity = now;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// True once nothing has been in flight for at least `quiet`
    pub fn is_idle(&self, now: Instant, quiet: Duration) -> bool {
        self.in_flight.is_empty() && now.saturating_duration_since(self.last_activity) >= quiet
    }
}
