// ============================================
// File: crates/veilpost-engine/src/guard/concurrency.rs
// ============================================
//! # In-Flight Concurrency Cap
//!
//! ## Creation Reason
//! Bounds the number of simultaneous symmetric-crypto operations so a
//! flood of parallel requests cannot exhaust CPU or memory.
//!
//! ## Main Functionality
//! - `ConcurrencyGuard::acquire`: atomic test-and-increment up to the cap
//! - `SlotToken`: RAII token; dropping it decrements exactly once
//!
//! ## Atomicity
//! ```text
//! WRONG (racy):  if load() < cap { fetch_add(1) }   ← two callers can
//!                                                     both pass the test
//! RIGHT:         fetch_update(|n| (n < cap).then(n+1))
//!                one CAS loop; the counter can never exceed the cap
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Release happens in `Drop`, so every exit path (success, error,
//!   unwind) decrements exactly once - never add a manual decrement
//! - Do not hold a `SlotToken` across `.await` points longer than the
//!   operation it guards
//!
//! ## Last Modified
//! v0.1.0 - Initial concurrency guard

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::ConcurrencyConfig;
use crate::error::{EngineError, Result};

// ============================================
// ConcurrencyGuard
// ============================================

/// Shared in-flight operation counter with an upper bound.
///
/// # Thread Safety
/// Lock-free; a single compare-and-swap loop performs the bounded
/// increment, so the counter is linearizable and never exceeds the cap.
#[derive(Debug)]
pub struct ConcurrencyGuard {
    in_flight: Arc<AtomicU32>,
    limit: u32,
}

impl ConcurrencyGuard {
    /// Creates a guard from validated configuration.
    #[must_use]
    pub fn new(config: &ConcurrencyConfig) -> Self {
        Self {
            in_flight: Arc::new(AtomicU32::new(0)),
            limit: config.max_in_flight,
        }
    }

    /// Attempts to claim an operation slot.
    ///
    /// # Errors
    /// Returns `ConcurrencyExceeded` if the counter is at the cap. The
    /// check and increment are one atomic operation.
    pub fn acquire(&self) -> Result<SlotToken> {
        let limit = self.limit;
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .map_err(|_| {
                debug!(limit, "concurrency cap reached");
                EngineError::ConcurrencyExceeded { limit }
            })?;

        Ok(SlotToken {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Current number of in-flight operations. Inspection use only.
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The configured cap.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

// ============================================
// SlotToken
// ============================================

/// Proof of an acquired slot; releases it exactly once when dropped.
#[derive(Debug)]
pub struct SlotToken {
    in_flight: Arc<AtomicU32>,
}

impl Drop for SlotToken {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn guard(max_in_flight: u32) -> ConcurrencyGuard {
        ConcurrencyGuard::new(&ConcurrencyConfig { max_in_flight })
    }

    #[test]
    fn test_acquire_release_cycle() {
        let guard = guard(2);
        assert_eq!(guard.in_flight(), 0);

        let a = guard.acquire().unwrap();
        let b = guard.acquire().unwrap();
        assert_eq!(guard.in_flight(), 2);

        assert!(matches!(
            guard.acquire(),
            Err(EngineError::ConcurrencyExceeded { limit: 2 })
        ));

        drop(a);
        assert_eq!(guard.in_flight(), 1);
        let _c = guard.acquire().unwrap();
        drop(b);
        assert_eq!(guard.in_flight(), 1);
    }

    #[test]
    fn test_release_on_error_path() {
        let guard = guard(1);

        let result: std::result::Result<(), &str> = (|| {
            let _token = guard.acquire().map_err(|_| "admission")?;
            Err("operation failed")
        })();
        assert!(result.is_err());

        // The token dropped with the error; the slot is free again.
        assert_eq!(guard.in_flight(), 0);
        let _ = guard.acquire().unwrap();
    }

    #[test]
    fn test_release_on_unwind() {
        let guard = std::sync::Arc::new(guard(1));
        let cloned = std::sync::Arc::clone(&guard);

        let _ = thread::spawn(move || {
            let _token = cloned.acquire().unwrap();
            panic!("simulated failure mid-operation");
        })
        .join();

        assert_eq!(guard.in_flight(), 0, "unwind must release the slot");
    }

    #[test]
    fn test_counter_never_exceeds_cap_under_load() {
        const CAP: u32 = 8;
        const THREADS: usize = 32;
        const ITERATIONS: usize = 200;

        let guard = std::sync::Arc::new(guard(CAP));
        let barrier = std::sync::Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let guard = std::sync::Arc::clone(&guard);
                let barrier = std::sync::Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut max_seen = 0;
                    for _ in 0..ITERATIONS {
                        if let Ok(_token) = guard.acquire() {
                            // Sample while holding the slot.
                            max_seen = max_seen.max(guard.in_flight());
                            std::hint::spin_loop();
                        }
                    }
                    max_seen
                })
            })
            .collect();

        for handle in handles {
            let max_seen = handle.join().unwrap();
            assert!(max_seen <= CAP, "observed {max_seen} > cap {CAP}");
        }
        assert_eq!(guard.in_flight(), 0, "all slots released");
    }
}
