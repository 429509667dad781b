// ============================================
// File: crates/veilpost-common/src/error.rs
// ============================================
//! # Common Error Types
//!
//! ## Creation Reason
//! Defines the error type shared by all Veilpost crates for failures that
//! are not specific to cryptography or protocol orchestration.
//!
//! ## Main Functionality
//! - `CommonError`: validation and encoding failures on shared types
//! - `Result<T>`: convenience alias
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include key material in error messages
//! - Higher-level crates wrap this via `#[from]`
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Result type for common operations.
pub type Result<T> = std::result::Result<T, CommonError>;

// ============================================
// CommonError
// ============================================

/// Errors produced by the shared leaf types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// A field failed validation.
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput {
        /// Which field was invalid
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A byte string had the wrong length.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// A base64 or hex encoded value could not be decoded.
    #[error("Invalid encoding: {reason}")]
    InvalidEncoding {
        /// Why decoding failed
        reason: String,
    },
}

impl CommonError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidLength` error.
    #[must_use]
    pub const fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }

    /// Creates an `InvalidEncoding` error.
    pub fn invalid_encoding(reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            reason: reason.into(),
        }
    }
}

// ============================================
// Tests
// ============================================
