// ============================================
// File: crates/veilpost-engine/src/metrics.rs
// ============================================
//! # Operation Metrics
//!
//! ## Creation Reason
//! The engine reports how long each cryptographic operation took so
//! hosts can watch for load problems and timing anomalies. Reporting is
//! strictly one-way: no metric ever feeds back into a protocol
//! decision.
//!
//! ## Main Functionality
//! - [`MetricsSink`]: the reporting seam the engine calls into
//! - [`NoopSink`]: default sink that discards everything
//! - [`OpStats`]: in-memory count/total recorder for tests and simple
//!   deployments
//!
//! ## ⚠️ Important Note for Next Developer
//! - `record` is called from the hot path; implementations must not
//!   block, allocate per call, or return errors
//! - Never branch on recorded values inside the engine - durations are
//!   diagnostics, not policy
//!
//! ## Last Modified
//! v0.1.0 - Initial metrics sink

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// ============================================
// OpKind
// ============================================

/// The cryptographic operations the engine reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Symmetric encryption of a plaintext.
    Encrypt,
    /// Symmetric decryption of a ciphertext.
    Decrypt,
    /// MAC generation or verification.
    Mac,
    /// Signature creation (either scheme).
    Sign,
    /// Signature verification (either scheme).
    Verify,
    /// Shared-secret derivation.
    KeyAgreement,
}

impl OpKind {
    /// All kinds, for iteration in recorders and dashboards.
    pub const ALL: [Self; 6] = [
        Self::Encrypt,
        Self::Decrypt,
        Self::Mac,
        Self::Sign,
        Self::Verify,
        Self::KeyAgreement,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Encrypt => 0,
            Self::Decrypt => 1,
            Self::Mac => 2,
            Self::Sign => 3,
            Self::Verify => 4,
            Self::KeyAgreement => 5,
        }
    }

    /// Stable label for log and dashboard output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::Mac => "mac",
            Self::Sign => "sign",
            Self::Verify => "verify",
            Self::KeyAgreement => "key_agreement",
        }
    }
}

// ============================================
// MetricsSink
// ============================================

/// One-way reporting sink for operation durations.
///
/// Implementations must be cheap and infallible; the engine calls
/// `record` inline on the send/receive path and ignores nothing it
/// returns because it returns nothing.
pub trait MetricsSink: Send + Sync {
    /// Records that one operation of `kind` took `elapsed`.
    fn record(&self, kind: OpKind, elapsed: Duration);
}

// ============================================
// NoopSink
// ============================================

/// Discards every measurement. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _kind: OpKind, _elapsed: Duration) {}
}

// ============================================
// OpStats
// ============================================

/// Lock-free per-kind counters: operation count and total duration.
///
/// Good enough for tests and single-process deployments; hosts with a
/// real telemetry pipeline implement [`MetricsSink`] over it instead.
#[derive(Debug, Default)]
pub struct OpStats {
    counts: [AtomicU64; 6],
    total_nanos: [AtomicU64; 6],
}

impl OpStats {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded operations of `kind`.
    #[must_use]
    pub fn count(&self, kind: OpKind) -> u64 {
        self.counts[kind.index()].load(Ordering::Relaxed)
    }

    /// Total recorded duration for `kind`.
    #[must_use]
    pub fn total(&self, kind: OpKind) -> Duration {
        Duration::from_nanos(self.total_nanos[kind.index()].load(Ordering::Relaxed))
    }

    /// Mean duration for `kind`, or `None` if nothing was recorded.
    #[must_use]
    pub fn mean(&self, kind: OpKind) -> Option<Duration> {
        let count = self.count(kind);
        if count == 0 {
            return None;
        }
        Some(self.total(kind) / u32::try_from(count).unwrap_or(u32::MAX))
    }
}

impl MetricsSink for OpStats {
    fn record(&self, kind: OpKind, elapsed: Duration) {
        let i = kind.index();
        self.counts[i].fetch_add(1, Ordering::Relaxed);
        // Saturating: a pathological duration must not wrap the total.
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos[i].fetch_add(nanos, Ordering::Relaxed);
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = OpStats::new();
        for kind in OpKind::ALL {
            assert_eq!(stats.count(kind), 0);
            assert_eq!(stats.mean(kind), None);
        }
    }

    #[test]
    fn test_record_accumulates_per_kind() {
        let stats = OpStats::new();
        stats.record(OpKind::Encrypt, Duration::from_micros(10));
        stats.record(OpKind::Encrypt, Duration::from_micros(30));
        stats.record(OpKind::Verify, Duration::from_micros(5));

        assert_eq!(stats.count(OpKind::Encrypt), 2);
        assert_eq!(stats.total(OpKind::Encrypt), Duration::from_micros(40));
        assert_eq!(stats.mean(OpKind::Encrypt), Some(Duration::from_micros(20)));

        assert_eq!(stats.count(OpKind::Verify), 1);
        assert_eq!(stats.count(OpKind::Decrypt), 0);
    }

    #[test]
    fn test_sink_object_safety() {
        // The engine stores the sink as Arc<dyn MetricsSink>.
        let sink: std::sync::Arc<dyn MetricsSink> = std::sync::Arc::new(NoopSink);
        sink.record(OpKind::Mac, Duration::from_nanos(1));
    }

    #[test]
    fn test_labels_are_distinct() {
        let mut labels: Vec<_> = OpKind::ALL.iter().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), OpKind::ALL.len());
    }
}
