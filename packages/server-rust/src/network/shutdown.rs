//! Server lifecycle: health state, in-flight accounting, and bounded drain.
//!
//! Shutdown has two halves. The moment a stop is requested the controller
//! flips to `Draining` so readiness probes fail while existing requests
//! finish. [`ShutdownController::drain`] then waits for the server future,
//! but never longer than the drain timeout, and marks the server `Stopped`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::{info, warn};

/// Lifecycle state reported by the health endpoints.
///
/// Transitions: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Listener not serving yet.
    Starting,
    /// Serving requests.
    Ready,
    /// Stop requested; connections are closing.
    Draining,
    /// The server future has finished or was abandoned.
    Stopped,
}

impl HealthState {
    /// Lowercase name used in the `/health` body.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Owns the health state and the one-shot "stop requested" flag.
#[derive(Debug)]
pub struct ShutdownController {
    state: ArcSwap<HealthState>,
    stop_requested: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(HealthState::Starting),
            stop_requested: watch::Sender::new(false),
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.state.load()
    }

    pub fn set_ready(&self) {
        self.state.store(Arc::new(HealthState::Ready));
    }

    /// Requests a stop: moves to `Draining` and wakes every
    /// [`stop_requested`](Self::stop_requested) waiter. Later calls are no-ops.
    pub fn begin_draining(&self) {
        let first = self.stop_requested.send_if_modified(|requested| {
            let changed = !*requested;
            *requested = true;
            changed
        });
        if first {
            self.state.store(Arc::new(HealthState::Draining));
            info!(in_flight = self.in_flight_count(), "Draining in-flight requests");
        }
    }

    /// Resolves once [`begin_draining`](Self::begin_draining) has been
    /// called, immediately if it already has.
    pub async fn stop_requested(&self) {
        let mut rx = self.stop_requested.subscribe();
        loop {
            let requested = *rx.borrow_and_update();
            if requested || rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Awaits `server` for at most `timeout`, then marks the server stopped.
    ///
    /// Returns the server's output, or `None` if the timeout cut the drain
    /// short. The caller decides what to do with the abandoned server.
    pub async fn drain<F: Future>(&self, server: F, timeout: Duration) -> Option<F::Output> {
        let outcome = tokio::time::timeout(timeout, server).await.ok();
        if outcome.is_none() {
            warn!(
                in_flight = self.in_flight_count(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Drain timeout expired with requests still in flight"
            );
        }
        self.mark_stopped();
        outcome
    }

    pub fn mark_stopped(&self) {
        self.state.store(Arc::new(HealthState::Stopped));
    }

    /// Counts one request as in flight until the guard is dropped.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
