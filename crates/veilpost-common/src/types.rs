// ============================================
// File: crates/veilpost-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes the small identifier types used throughout the protocol:
//! the replay-detection nonce and the admission-control client identifier.
//!
//! ## Main Functionality
//! - `Nonce`: 16-byte single-use random value for replay detection
//! - `ClientId`: opaque caller identifier for rate limiting
//!
//! ## Main Logical Flow
//! 1. A fresh `Nonce` is generated per envelope at construction
//! 2. The receive path records it in the nonce tracker exactly once
//! 3. `ClientId` keys the rate-limit table; it carries no trust
//!
//! ## ⚠️ Important Note for Next Developer
//! - `Nonce` MUST come from a cryptographically secure RNG
//! - The nonce is distinct from the cipher IV; never reuse one as the other
//! - `ClientId` is advisory (DoS defense), not authentication
//!
//! ## Last Modified
//! v0.1.0 - Initial type definitions

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CommonError;

// ============================================
// Constants
// ============================================

/// Size of a replay-detection nonce in bytes.
pub const NONCE_SIZE: usize = 16;

// ============================================
// Nonce
// ============================================

/// Single-use random value for replay detection.
///
/// # Security Properties
/// - Generated from the operating system's secure RNG (128 bits of entropy)
/// - Unique per envelope; the tracker rejects any value seen before
/// - Public data: carried in the clear, safe to log encoded
///
/// # Example
/// ```
/// use veilpost_common::types::Nonce;
///
/// let nonce = Nonce::generate();
/// let restored = Nonce::from_bytes(nonce.as_bytes()).unwrap();
/// assert_eq!(nonce, restored);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Generates a new random nonce from the OS secure RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Creates a nonce from a byte slice.
    ///
    /// # Errors
    /// Returns `InvalidLength` if the slice is not exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CommonError> {
        if bytes.len() != NONCE_SIZE {
            return Err(CommonError::invalid_length(NONCE_SIZE, bytes.len()));
        }
        let mut arr = [0u8; NONCE_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Returns the raw nonce bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nonce({:02x}{:02x}{:02x}{:02x}...)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64.encode(self.0))
    }
}

// ============================================
// ClientId
// ============================================

/// Opaque identifier for an admission-control caller.
///
/// Typically a remote address or connection label. The rate limiter keys
/// its per-client state on this value; it is never used for
/// authentication decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a client identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_generate_unique() {
        let a = Nonce::generate();
        let b = Nonce::generate();
        assert_ne!(a, b, "two random nonces collided");
    }

    #[test]
    fn test_nonce_from_bytes() {
        let nonce = Nonce::generate();
        let restored = Nonce::from_bytes(nonce.as_bytes()).unwrap();
        assert_eq!(nonce, restored);

        assert!(matches!(
            Nonce::from_bytes(&[0u8; 7]),
            Err(CommonError::InvalidLength {
                expected: NONCE_SIZE,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_nonce_debug_is_truncated() {
        let nonce = Nonce::from_bytes(&[0xAB; NONCE_SIZE]).unwrap();
        let dbg = format!("{nonce:?}");
        assert!(dbg.starts_with("Nonce(abab"));
        assert!(dbg.len() < 24, "debug output should be truncated");
    }

    #[test]
    fn test_client_id_round_trip() {
        let id = ClientId::from("10.0.0.7:4455");
        assert_eq!(id.as_str(), "10.0.0.7:4455");
        assert_eq!(id.to_string(), "10.0.0.7:4455");
    }
}
