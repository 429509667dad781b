// ============================================
// File: crates/veilpost-core/src/lib.rs
// ============================================
//! # Veilpost Core - Cryptography & Envelope Library
//!
//! ## Creation Reason
//! Implements the cryptographic building blocks of the Veilpost secure
//! message protocol: the symmetric cipher, the keyed MAC, the two
//! signature schemes, key agreement, and the envelope record itself.
//! This crate is pure computation; all concurrent state (replay tracking,
//! admission control) lives in `veilpost-engine`.
//!
//! ## Main Functionality
//!
//! ### Crypto Module ([`crypto`])
//! - Symmetric encryption: AES-256-CBC with PKCS#7 padding
//! - Integrity: HMAC-SHA256 with constant-time verification
//! - Authenticity: ECDSA P-256 and RSA-2048 PKCS#1 v1.5 signatures
//! - Key agreement: ECDH on P-256 and RSA-authenticated classic DH
//!   (RFC 3526 group 14), both expanded to a 64-byte shared secret
//!
//! ### Protocol Module ([`protocol`])
//! - `Envelope`: the transportable unit (timestamp, nonce, IV,
//!   ciphertext, MAC, dual signatures, sender public key)
//! - The signing transcript binding header fields to the signatures
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │             veilpost-engine                   │
//! │                   │                           │
//! │                   ▼                           │
//! │             veilpost-core  ◄── You are here   │
//! │                   │                           │
//! │                   ▼                           │
//! │             veilpost-common                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Security Guarantees
//! - **Confidentiality**: AES-256-CBC under the cipher segment of the
//!   shared secret
//! - **Integrity**: HMAC-SHA256 under the disjoint MAC segment
//! - **Authenticity**: two independent signature schemes; compromise of
//!   one does not forge the other
//! - **Key separation**: cipher and MAC keys never share bytes
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL cryptographic code uses audited RustCrypto implementations
//! - NEVER implement custom crypto primitives
//! - The shared secret implements Zeroize; keep it that way
//! - Decryption failures are deliberately generic - do not add padding
//!   detail to errors (padding-oracle side channel)
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crypto;
pub mod error;
pub mod protocol;

// Re-export commonly used items
pub use crypto::{
    agreement::{AuthenticatedDh, DhKeyPair, DhParams, EcdhKeyPair, EcdhPublicKey},
    keys::{EcdsaKeyPair, EcdsaPublicKey, RsaKeyPair, RsaVerifier, SharedSecret},
};
pub use error::{CoreError, Result};
pub use protocol::Envelope;
