//! Request counters.
//!
//! A [`Metrics`] handle is created with the client and shared by clone with the
//! request executor. Counters only ever increase; [`Metrics::snapshot`] returns
//! an owned copy, so callers can mutate what they get back without affecting
//! later reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    timeouts: AtomicU64,
    rate_limits: AtomicU64,
}

/// Shared, monotonically increasing request counters.
///
/// Cloning yields another handle to the same counters.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<Counters>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Network calls attempted
    pub requests: u64,
    /// Attempts that failed for any reason
    pub errors: u64,
    /// Attempts that hit the request deadline
    pub timeouts: u64,
    /// Responses with HTTP 429
    pub rate_limits: u64,
}

impl Metrics {
    /// Create a fresh set of counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.counters.requests.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            timeouts: self.counters.timeouts.load(Ordering::Relaxed),
            rate_limits: self.counters.rate_limits.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_request(&self) {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.counters.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rate_limit(&self) {
        self.counters.rate_limits.fetch_add(1, Ordering::Relaxed);
    }
}
