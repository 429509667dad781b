// ============================================
// File: crates/veilpost-engine/src/error.rs
// ============================================
//! # Engine Error Taxonomy
//!
//! ## Creation Reason
//! Maps every failure of the send/receive pipelines into the protocol's
//! taxonomy: transient admission rejections, replay detection,
//! authenticity failures, and fatal configuration errors.
//!
//! ## Taxonomy
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────┐
//! │ Transient/admission  │ RateLimited, ConcurrencyExceeded     │
//! │                      │ → back off and retry                 │
//! ├──────────────────────┼──────────────────────────────────────┤
//! │ Replay               │ ReplayDetected                       │
//! │                      │ → never retried with same envelope   │
//! ├──────────────────────┼──────────────────────────────────────┤
//! │ Authenticity/format  │ TimestampOutOfWindow, Core(MAC/sig/  │
//! │                      │ decrypt/malformed-key)               │
//! │                      │ → terminal for that envelope         │
//! ├──────────────────────┼──────────────────────────────────────┤
//! │ Fatal/configuration  │ Core(KeyGeneration...), Config       │
//! │                      │ → abort, never substitute defaults   │
//! └──────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! ## External Collapse
//! `external_outcome()` reduces everything to two values: `RetryLater`
//! for transient admission failures and `Rejected` for everything else.
//! An untrusted sender learns nothing about WHICH check failed.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Detailed variants are for internal logs and tests only; anything
//!   that crosses a trust boundary goes through `external_outcome()`
//! - Do not add externally visible sub-categories to authenticity
//!   failures
//!
//! ## Last Modified
//! v0.1.0 - Initial taxonomy

use thiserror::Error;

use veilpost_common::types::ClientId;
use veilpost_core::error::CoreError;

// ============================================
// Result Type Alias
// ============================================

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

// ============================================
// EngineError
// ============================================

/// Failures of the protocol engine, classified per the taxonomy.
#[derive(Error, Debug)]
pub enum EngineError {
    // ========================================
    // Transient / Admission
    // ========================================

    /// Operations from this client are arriving faster than the
    /// minimum interval allows.
    #[error("Rate limited: client {client} must back off")]
    RateLimited {
        /// Which client exceeded the rate
        client: ClientId,
    },

    /// The in-flight operation cap was reached.
    #[error("Concurrency limit reached: {limit} operations in flight")]
    ConcurrencyExceeded {
        /// The configured cap
        limit: u32,
    },

    // ========================================
    // Replay
    // ========================================

    /// The envelope's nonce was seen before.
    #[error("Replay detected: nonce already seen")]
    ReplayDetected,

    // ========================================
    // Authenticity
    // ========================================

    /// The envelope timestamp falls outside the freshness window
    /// (stale, or future-dated beyond tolerated clock skew).
    #[error("Timestamp outside freshness window: skew {skew_secs}s, window {window_secs}s")]
    TimestampOutOfWindow {
        /// Signed `now - timestamp` in seconds
        skew_secs: i64,
        /// The configured window
        window_secs: u64,
    },

    // ========================================
    // Configuration
    // ========================================

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {field}: {reason}")]
    Config {
        /// Which setting is invalid
        field: String,
        /// Why it was rejected
        reason: String,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Cryptographic failure from the core crate (MAC mismatch,
    /// signature invalid, decryption failure, key errors).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EngineError {
    /// Creates a `Config` error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    // ========================================
    // Classification
    // ========================================

    /// Transient admission failure: the caller should back off and
    /// retry. Never a security incident by itself.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ConcurrencyExceeded { .. }
        )
    }

    /// Replay rejection: terminal for that envelope, useful to count
    /// separately in diagnostics.
    #[must_use]
    pub const fn is_replay(&self) -> bool {
        matches!(self, Self::ReplayDetected)
    }

    /// Authenticity or format failure: the envelope is not trustworthy
    /// and must never be retried verbatim.
    #[must_use]
    pub fn is_authenticity(&self) -> bool {
        match self {
            Self::TimestampOutOfWindow { .. } => true,
            Self::Core(e) => e.is_authenticity(),
            _ => false,
        }
    }

    /// Suspicious failures worth elevated logging.
    #[must_use]
    pub fn is_suspicious(&self) -> bool {
        self.is_replay() || self.is_authenticity()
    }

    /// Collapses the failure into the externally visible outcome.
    #[must_use]
    pub fn external_outcome(&self) -> Rejection {
        if self.is_transient() {
            Rejection::RetryLater
        } else {
            Rejection::Rejected
        }
    }
}

// ============================================
// Rejection (external view)
// ============================================

/// The only two outcomes an untrusted counterparty may observe.
///
/// Replay, freshness, MAC, signature and format failures are all
/// `Rejected`; distinguishing them externally would hand an attacker a
/// verification oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Transient admission failure; retry after a delay.
    RetryLater,
    /// The envelope was rejected. No further detail is provided.
    Rejected,
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let err = EngineError::RateLimited {
            client: ClientId::from("c1"),
        };
        assert!(err.is_transient());
        assert!(!err.is_suspicious());
        assert_eq!(err.external_outcome(), Rejection::RetryLater);

        let err = EngineError::ConcurrencyExceeded { limit: 100 };
        assert!(err.is_transient());
        assert_eq!(err.external_outcome(), Rejection::RetryLater);
    }

    #[test]
    fn test_replay_classification() {
        let err = EngineError::ReplayDetected;
        assert!(err.is_replay());
        assert!(!err.is_transient());
        assert!(err.is_suspicious());
        assert_eq!(err.external_outcome(), Rejection::Rejected);
    }

    #[test]
    fn test_authenticity_failures_collapse_identically() {
        // Every authenticity-class failure must be externally identical.
        let failures: Vec<EngineError> = vec![
            EngineError::TimestampOutOfWindow {
                skew_secs: 31,
                window_secs: 30,
            },
            EngineError::Core(CoreError::MacMismatch),
            EngineError::Core(CoreError::SignatureVerification),
            EngineError::Core(CoreError::Decryption),
            EngineError::Core(CoreError::malformed_key("bad point")),
        ];
        for err in failures {
            assert!(err.is_authenticity(), "{err} should be authenticity-class");
            assert_eq!(err.external_outcome(), Rejection::Rejected);
        }
    }

    #[test]
    fn test_fatal_not_retriable() {
        let err = EngineError::Core(CoreError::key_generation("RSA"));
        assert!(!err.is_transient());
        assert_eq!(err.external_outcome(), Rejection::Rejected);
    }
}
