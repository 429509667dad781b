// ============================================
// File: crates/veilpost-engine/src/replay.rs
// ============================================
//! # Nonce / Replay Tracker
//!
//! ## Creation Reason
//! Remembers every nonce accepted by the verification pipeline so a
//! captured envelope can never be replayed, while keeping memory
//! bounded under sustained traffic.
//!
//! ## Main Functionality
//! - `NonceTracker::record_if_new`: linearizable check-and-insert
//! - Capacity handling: age-based cleanup, then evict-oldest
//! - `sweep`: host-driven cleanup tick
//! - `spawn_sweeper`: optional periodic task with deterministic stop
//!
//! ## Capacity Policy
//! ```text
//! record_if_new(nonce):                      ┐
//!   if present        → ReplayDetected       │ one critical
//!   if len >= max:                           │ section; no
//!     drop entries older than cleanup window │ crypto inside
//!     if still full → evict the OLDEST entry │
//!   insert(nonce, now)                       ┘
//! ```
//! When cleanup frees nothing (all entries recent), the oldest entry is
//! evicted rather than admitting unboundedly: memory stays bounded at
//! `max_entries`. The evicted nonce becomes re-acceptable, but only
//! under traffic already saturating the capacity within the freshness
//! window - sized so that capacity >> window × peak rate.
//!
//! ## ⚠️ Important Note for Next Developer
//! - check-and-insert MUST stay one critical section; splitting it lets
//!   two threads replay-accept the same nonce
//! - The cleanup interval must be >= the freshness window (enforced by
//!   config validation) or eviction opens a replay hole
//! - `reset` is for tests/administration only - never call it from the
//!   send/receive path
//!
//! ## Last Modified
//! v0.1.0 - Initial replay tracker

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use veilpost_common::types::Nonce;

use crate::config::ReplayConfig;
use crate::error::{EngineError, Result};

// ============================================
// NonceTracker
// ============================================

/// Bounded, self-cleaning set of previously seen nonces.
///
/// # Thread Safety
/// All operations are safe under arbitrary concurrent callers. The
/// membership check and insert happen in one critical section, so no
/// two callers can both observe "not present" for the same nonce.
pub struct NonceTracker {
    /// Nonce → first-seen time.
    seen: Mutex<HashMap<Nonce, Instant>>,
    /// Capacity before eviction kicks in.
    max_entries: usize,
    /// Entries older than this are eligible for removal.
    cleanup_interval: Duration,
}

impl NonceTracker {
    /// Creates a tracker from validated configuration.
    #[must_use]
    pub fn new(config: &ReplayConfig) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            max_entries: config.max_entries,
            cleanup_interval: config.cleanup_interval(),
        }
    }

    /// Records a nonce if it has never been seen.
    ///
    /// # Errors
    /// Returns `ReplayDetected` if the nonce is already present.
    pub fn record_if_new(&self, nonce: &Nonce) -> Result<()> {
        let now = Instant::now();
        let mut seen = self.seen.lock();

        if seen.contains_key(nonce) {
            warn!(nonce = %nonce, "replay detected: nonce already seen");
            return Err(EngineError::ReplayDetected);
        }

        if seen.len() >= self.max_entries {
            Self::remove_expired(&mut seen, now, self.cleanup_interval);

            if seen.len() >= self.max_entries {
                // All entries still within the cleanup window: evict the
                // oldest so capacity stays a real memory bound.
                if let Some(oldest) = seen
                    .iter()
                    .min_by_key(|(_, first_seen)| **first_seen)
                    .map(|(nonce, _)| *nonce)
                {
                    seen.remove(&oldest);
                    debug!("nonce tracker at capacity; evicted oldest entry");
                }
            }
        }

        seen.insert(*nonce, now);
        Ok(())
    }

    /// Removes entries older than the cleanup interval.
    ///
    /// Host applications without a background sweeper call this on
    /// their own schedule; it is also invoked by [`spawn_sweeper`].
    ///
    /// [`spawn_sweeper`]: NonceTracker::spawn_sweeper
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut seen = self.seen.lock();
        let before = seen.len();
        Self::remove_expired(&mut seen, now, self.cleanup_interval);
        let removed = before - seen.len();
        if removed > 0 {
            trace!(removed, remaining = seen.len(), "nonce sweep");
        }
    }

    fn remove_expired(seen: &mut HashMap<Nonce, Instant>, now: Instant, interval: Duration) {
        // checked_sub: early in process life "now - interval" may not
        // exist; nothing can be expired yet in that case.
        if let Some(cutoff) = now.checked_sub(interval) {
            seen.retain(|_, first_seen| *first_seen >= cutoff);
        }
    }

    /// Number of tracked nonces. Administrative/inspection use only.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether the tracker is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    /// Clears all state.
    ///
    /// Administrative/test operation only; it must never be reachable
    /// from the protocol's send/receive path.
    pub fn reset(&self) {
        self.seen.lock().clear();
    }

    /// Spawns a periodic sweep task on the current tokio runtime.
    ///
    /// Returns a [`SweeperHandle`] whose `stop()` terminates the task
    /// deterministically, so tests and shutdown paths never leak
    /// timers. A typical period is half the cleanup interval.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> SweeperHandle {
        let tracker = Arc::clone(self);
        let shutdown = Arc::new(Notify::new());
        let shutdown_rx = Arc::clone(&shutdown);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => tracker.sweep(),
                    () = shutdown_rx.notified() => {
                        debug!("nonce sweeper received shutdown signal");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown, task }
    }

    #[cfg(test)]
    fn insert_aged(&self, nonce: Nonce, first_seen: Instant) {
        self.seen.lock().insert(nonce, first_seen);
    }
}

impl std::fmt::Debug for NonceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceTracker")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .field("cleanup_interval", &self.cleanup_interval)
            .finish()
    }
}

// ============================================
// SweeperHandle
// ============================================

/// Handle to a running background sweep task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper and waits for the task to exit.
    pub async fn stop(self) {
        // notify_one stores a permit, so the signal is not lost even if
        // the task is mid-sweep rather than parked on notified().
        self.shutdown.notify_one();
        let _ = self.task.await;
    }

    /// Aborts without waiting. Prefer [`stop`](Self::stop).
    pub fn abort(self) {
        self.task.abort();
    }
}

// ============================================
// Tests
// ============================================
