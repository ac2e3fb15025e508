//! Fixed-interval refresh loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::dashboard::DashboardClient;

/// Runs `DashboardClient::poll_cycle` every `interval`, first tick
/// immediately.
///
/// Cycles are fired, not awaited: a slow endpoint never delays the next
/// tick, so cycles may overlap and a late response can overwrite a newer
/// one. There is no in-flight guard.
pub struct PollLoop {
    handle: JoinHandle<()>,
    cycles: Arc<AtomicU64>,
}

impl PollLoop {
    pub fn spawn(client: DashboardClient, interval: Duration) -> Self {
        let cycles = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&cycles);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let cycle = counter.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(cycle, "Poll cycle");
                // Dropping the handles detaches the refresh tasks.
                let _ = client.poll_cycle();
            }
        });
        tracing::debug!(interval_ms = interval.as_millis() as u64, "Poll loop started");
        Self { handle, cycles }
    }

    /// Number of cycles fired so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Stop firing new cycles. Refreshes already in flight still complete.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}
