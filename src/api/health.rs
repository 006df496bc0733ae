//! Shared health state for the /health endpoint.
//! Updated by RowRefresher and the on-demand fetch in the picks handler.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Shared refresh metrics. Written by the refresh path, read by the API.
#[derive(Default)]
pub struct HealthState {
    /// Unix seconds of the last successful backend fetch (0 = none yet).
    pub last_fetch_ok_at: AtomicI64,
    /// Failed fetches since the last success.
    pub consecutive_failures: AtomicU64,
    pub total_fetches: AtomicU64,
    pub total_failures: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, at_unix_secs: i64) {
        self.last_fetch_ok_at.store(at_unix_secs, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.total_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        self.total_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_fetch_ok_at(&self) -> Option<i64> {
        match self.last_fetch_ok_at.load(Ordering::Relaxed) {
            0 => None,
            ts => Some(ts),
        }
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn total_fetches(&self) -> u64 {
        self.total_fetches.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }
}
