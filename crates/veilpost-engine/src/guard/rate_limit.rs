// ============================================
// File: crates/veilpost-engine/src/guard/rate_limit.rs
// ============================================
//! # Per-Client Rate Limiter
//!
//! ## Creation Reason
//! Bounds how often a single client may trigger cryptographic work,
//! the first line of defense against request floods.
//!
//! ## Main Functionality
//! - `RateLimiter::check`: atomic check-then-record per client
//! - Opportunistic purge of idle clients to bound memory
//!
//! ## Algorithm
//! ```text
//! check(client):
//!   entry = table[client]            ┐ one shard lock:
//!   if now - entry < min_interval:   │ check and record are
//!       reject (RateLimited)         │ inseparable
//!   entry = now                      ┘
//!   every Nth call: drop entries older than retention
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The DashMap entry API holds the shard lock across check+record;
//!   do not split this into contains_key + insert
//! - The purge runs AFTER the entry guard is dropped (shard re-entry
//!   would deadlock)
//!
//! ## Last Modified
//! v0.1.0 - Initial rate limiter

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, trace};

use veilpost_common::types::ClientId;

use crate::config::RateLimitConfig;
use crate::error::{EngineError, Result};

// ============================================
// Constants
// ============================================

/// How many accepted checks between opportunistic purges.
const PURGE_EVERY: u64 = 256;

// ============================================
// RateLimiter
// ============================================

/// Per-client minimum-interval rate limiter.
///
/// # Thread Safety
/// Safe under arbitrary concurrent callers; per-client state lives in a
/// sharded concurrent map so unrelated clients never contend.
pub struct RateLimiter {
    /// Client → time of last accepted operation.
    last_op: DashMap<ClientId, Instant>,
    /// Minimum interval between accepted operations per client.
    min_interval: Duration,
    /// Idle entries older than this are purged.
    retention: Duration,
    /// Accepted-check counter driving the opportunistic purge.
    checks: AtomicU64,
}

impl RateLimiter {
    /// Creates a rate limiter from validated configuration.
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            last_op: DashMap::new(),
            min_interval: config.min_interval(),
            retention: config.retention(),
            checks: AtomicU64::new(0),
        }
    }

    /// Checks whether `client` may perform an operation now.
    ///
    /// On acceptance the current time is recorded as the client's new
    /// "last operation"; rejection leaves the recorded time untouched.
    ///
    /// # Errors
    /// Returns `RateLimited` if less than the minimum interval has
    /// elapsed since the client's last accepted operation.
    pub fn check(&self, client: &ClientId) -> Result<()> {
        let now = Instant::now();

        {
            use dashmap::mapref::entry::Entry;
            match self.last_op.entry(client.clone()) {
                Entry::Occupied(mut occupied) => {
                    if now.duration_since(*occupied.get()) < self.min_interval {
                        debug!(client = %client, "rate limit rejection");
                        return Err(EngineError::RateLimited {
                            client: client.clone(),
                        });
                    }
                    occupied.insert(now);
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(now);
                }
            }
        }

        // Opportunistic purge, amortized across accepted checks.
        if self.checks.fetch_add(1, Ordering::Relaxed) % PURGE_EVERY == PURGE_EVERY - 1 {
            self.purge(now);
        }

        Ok(())
    }

    /// Removes entries idle for longer than the retention window.
    fn purge(&self, now: Instant) {
        let retention = self.retention;
        let before = self.last_op.len();
        self.last_op
            .retain(|_, last| now.duration_since(*last) <= retention);
        let purged = before.saturating_sub(self.last_op.len());
        if purged > 0 {
            trace!(purged, "purged idle rate-limit entries");
        }
    }

    /// Number of tracked clients. Administrative/inspection use only.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.last_op.len()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_interval", &self.min_interval)
            .field("retention", &self.retention)
            .field("tracked_clients", &self.last_op.len())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn limiter(min_interval_ms: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            min_interval_ms,
            retention_secs: 60,
        })
    }

    #[test]
    fn test_first_operation_accepted() {
        let limiter = limiter(10);
        limiter.check(&ClientId::from("a")).unwrap();
    }

    #[test]
    fn test_burst_rejected_then_recovers() {
        let limiter = limiter(10);
        let client = ClientId::from("a");

        limiter.check(&client).unwrap();
        assert!(matches!(
            limiter.check(&client),
            Err(EngineError::RateLimited { .. })
        ));

        thread::sleep(Duration::from_millis(25));
        limiter.check(&client).unwrap();
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter(1_000);
        limiter.check(&ClientId::from("a")).unwrap();
        // A different client is not affected by a's recent operation.
        limiter.check(&ClientId::from("b")).unwrap();
    }

    #[test]
    fn test_rejection_does_not_extend_penalty() {
        let limiter = limiter(30);
        let client = ClientId::from("a");

        limiter.check(&client).unwrap();
        thread::sleep(Duration::from_millis(15));
        // Rejected, but the recorded "last op" stays at the first call.
        assert!(limiter.check(&client).is_err());
        thread::sleep(Duration::from_millis(25));
        // 40ms after the accepted call: allowed again.
        limiter.check(&client).unwrap();
    }

    #[test]
    fn test_purge_bounds_memory() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            min_interval_ms: 1,
            retention_secs: 60,
        });
        for i in 0..100 {
            limiter.check(&ClientId::from(format!("client-{i}"))).unwrap();
        }
        assert!(limiter.tracked_clients() <= 100);

        // Direct purge with everything still fresh removes nothing.
        limiter.purge(Instant::now());
        assert_eq!(limiter.tracked_clients(), 100);
    }

    #[test]
    fn test_concurrent_same_client_single_winner() {
        let limiter = std::sync::Arc::new(limiter(1_000));
        let client = ClientId::from("contended");
        let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));

        let accepted: usize = (0..8)
            .map(|_| {
                let limiter = std::sync::Arc::clone(&limiter);
                let client = client.clone();
                let barrier = std::sync::Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    usize::from(limiter.check(&client).is_ok())
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .sum();

        assert_eq!(accepted, 1, "exactly one concurrent caller may win");
    }
}
