// ============================================
// File: crates/veilpost-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines error types for cryptographic operations and envelope
//! handling in the Veilpost core crate.
//!
//! ## Error Categories
//! 1. **Fatal/configuration**: key generation, malformed key material -
//!    abort the calling operation, never substitute defaults
//! 2. **Authenticity**: MAC mismatch, signature invalid, decryption
//!    failure - terminal for the envelope being verified
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include key material in error messages
//! - `Decryption` carries no detail on purpose: distinguishing "bad
//!   padding" from "bad key" creates a padding oracle
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use veilpost_common::error::CommonError;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Core error types for cryptographic operations.
///
/// # Security Note
/// Error messages are informative for internal logs without revealing
/// key material or which byte of a comparison failed.
#[derive(Error, Debug)]
pub enum CoreError {
    // ========================================
    // Fatal / Configuration Errors
    // ========================================

    /// Failed to generate cryptographic key material.
    #[error("Key generation failed: {context}")]
    KeyGeneration {
        /// What key was being generated
        context: String,
    },

    /// Key material could not be parsed or has the wrong shape.
    #[error("Malformed key material: {reason}")]
    MalformedKey {
        /// Why the key was rejected
        reason: String,
    },

    // ========================================
    // Authenticity Errors
    // ========================================

    /// MAC did not match the ciphertext.
    #[error("MAC verification failed")]
    MacMismatch,

    /// An asymmetric signature failed verification.
    #[error("Signature verification failed")]
    SignatureVerification,

    /// Signature creation failed.
    #[error("Failed to create signature: {reason}")]
    SignatureCreation {
        /// Why signing failed
        reason: String,
    },

    /// Encryption operation failed.
    #[error("Encryption failed: {context}")]
    Encryption {
        /// What was being encrypted
        context: String,
    },

    /// Decryption failed.
    ///
    /// Deliberately generic: covers wrong key, corrupted ciphertext and
    /// malformed padding without distinguishing them.
    #[error("Decryption failed")]
    Decryption,

    /// Key agreement failed.
    #[error("Key agreement failed: {reason}")]
    KeyAgreement {
        /// Why agreement was aborted
        reason: String,
    },

    /// Key derivation failed.
    #[error("Key derivation failed: {reason}")]
    KeyDerivation {
        /// Why derivation failed
        reason: String,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Error from the common crate.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl CoreError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `KeyGeneration` error.
    pub fn key_generation(context: impl Into<String>) -> Self {
        Self::KeyGeneration {
            context: context.into(),
        }
    }

    /// Creates a `MalformedKey` error.
    pub fn malformed_key(reason: impl Into<String>) -> Self {
        Self::MalformedKey {
            reason: reason.into(),
        }
    }

    /// Creates a `KeyAgreement` error.
    pub fn key_agreement(reason: impl Into<String>) -> Self {
        Self::KeyAgreement {
            reason: reason.into(),
        }
    }

    /// Creates an `Encryption` error.
    pub fn encryption(context: impl Into<String>) -> Self {
        Self::Encryption {
            context: context.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this failure means the envelope is not
    /// authentic (terminal for that envelope, never retried verbatim).
    #[must_use]
    pub const fn is_authenticity(&self) -> bool {
        matches!(
            self,
            Self::MacMismatch
                | Self::SignatureVerification
                | Self::Decryption
                | Self::MalformedKey { .. }
                | Self::Common(_)
        )
    }

    /// Returns `true` if this is a fatal configuration failure: the
    /// caller must abort, not retry.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::KeyGeneration { .. }
                | Self::SignatureCreation { .. }
                | Self::Encryption { .. }
                | Self::KeyDerivation { .. }
        )
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(CoreError::MacMismatch.to_string().contains("MAC"));
        assert_eq!(CoreError::Decryption.to_string(), "Decryption failed");

        let err = CoreError::key_generation("RSA-2048");
        assert!(err.to_string().contains("RSA-2048"));
    }

    #[test]
    fn test_decryption_error_is_generic() {
        // Padding-oracle defense: the message must not mention padding.
        let msg = CoreError::Decryption.to_string().to_lowercase();
        assert!(!msg.contains("padding"));
        assert!(!msg.contains("key"));
    }

    #[test]
    fn test_classification() {
        assert!(CoreError::MacMismatch.is_authenticity());
        assert!(CoreError::SignatureVerification.is_authenticity());
        assert!(CoreError::Decryption.is_authenticity());
        assert!(!CoreError::MacMismatch.is_fatal());

        assert!(CoreError::key_generation("ECDSA").is_fatal());
        assert!(!CoreError::key_generation("ECDSA").is_authenticity());
    }

    #[test]
    fn test_common_error_conversion() {
        let common = CommonError::invalid_length(16, 3);
        let core: CoreError = common.into();
        assert!(core.is_authenticity());
    }
}
