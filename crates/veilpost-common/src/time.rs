// ============================================
// File: crates/veilpost-common/src/time.rs
// ============================================
//! # Protocol Timestamps
//!
//! ## Creation Reason
//! Envelope freshness checking needs one authoritative definition of
//! "how old is too old", shared by the codec and its tests.
//!
//! ## Main Functionality
//! - `Timestamp`: Unix timestamp in seconds with freshness-window checks
//! - Window semantics used by the verification pipeline
//!
//! ## Freshness Semantics
//! ```text
//!        rejected      accepted       rejected
//!   ──────────────┤███████████████├──────────────►  time
//!            now-window    now     now+window
//!
//!   accepted  ⇔  |now - timestamp| <= window   (inclusive boundary)
//! ```
//! The window covers both directions: stale envelopes (replay exposure)
//! and future-dated envelopes (forged under clock skew) are rejected the
//! same way.
//!
//! ## ⚠️ Important Note for Next Developer
//! - The boundary is INCLUSIVE: an envelope exactly `window` seconds old
//!   is still accepted. Tests pin both sides of the boundary.
//! - Keep the window narrow (tens of seconds); it bounds replay exposure.
//!
//! ## Last Modified
//! v0.1.0 - Initial timestamp implementation

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================
// Constants
// ============================================

/// Default freshness window in seconds (matches the protocol default).
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 30;

// ============================================
// Timestamp
// ============================================

/// Unix timestamp in seconds, as carried in an envelope.
///
/// # Purpose
/// Stamped once at envelope construction and validated against the
/// freshness window on receipt. Immutable after construction.
///
/// # Example
/// ```
/// use veilpost_common::time::Timestamp;
///
/// let now = Timestamp::now();
/// assert!(now.is_fresh(30));
/// assert!(!Timestamp::from_secs(0).is_fresh(30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from Unix seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// Creates a timestamp for the current time.
    #[must_use]
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System time before Unix epoch")
            .as_secs() as i64;
        Self(secs)
    }

    /// Returns the Unix timestamp in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Returns the timestamp as little-endian bytes (for signing transcripts).
    #[must_use]
    pub const fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Signed difference `now - self` in seconds.
    ///
    /// Positive values mean the timestamp lies in the past, negative
    /// values mean it claims a future time.
    #[must_use]
    pub fn skew_secs(&self) -> i64 {
        Self::now().0 - self.0
    }

    /// Checks the timestamp against a freshness window.
    ///
    /// # Returns
    /// `true` if `|now - timestamp| <= window_secs`. The boundary is
    /// inclusive on both sides.
    #[must_use]
    pub fn is_fresh(&self, window_secs: u64) -> bool {
        self.skew_secs().unsigned_abs() <= window_secs
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_fresh() {
        assert!(Timestamp::now().is_fresh(DEFAULT_FRESHNESS_WINDOW_SECS));
    }

    #[test]
    fn test_freshness_boundary_inclusive() {
        let window = 30;
        let now = Timestamp::now().as_secs();

        // Exactly at the boundary, both directions: accepted.
        assert!(Timestamp::from_secs(now - 30).is_fresh(window));
        assert!(Timestamp::from_secs(now + 30).is_fresh(window));

        // One past the boundary, both directions: rejected.
        assert!(!Timestamp::from_secs(now - 31).is_fresh(window));
        assert!(!Timestamp::from_secs(now + 31).is_fresh(window));
    }

    #[test]
    fn test_skew_sign() {
        let now = Timestamp::now().as_secs();
        assert!(Timestamp::from_secs(now - 100).skew_secs() >= 100);
        assert!(Timestamp::from_secs(now + 100).skew_secs() <= -99);
    }

    #[test]
    fn test_le_bytes_round_trip() {
        let ts = Timestamp::from_secs(1_700_000_000);
        assert_eq!(
            i64::from_le_bytes(ts.to_le_bytes()),
            ts.as_secs()
        );
    }

    #[test]
    fn test_serde_transparent() {
        let ts = Timestamp::from_secs(42);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "42");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
