// ============================================
// File: crates/veilpost-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Centralizes all cryptographic operations of the Veilpost protocol,
//! built exclusively on audited RustCrypto implementations.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`cipher`]: AES-256-CBC symmetric encryption with PKCS#7 padding
//! - [`mac`]: HMAC-SHA256 generation and constant-time verification
//! - [`keys`]: Typed key material (ECDSA, RSA, shared secret)
//! - [`agreement`]: ECDH and RSA-authenticated classic Diffie-Hellman
//! - [`kdf`]: HKDF-SHA256 expansion of agreement output into the
//!   64-byte shared secret
//!
//! ## Cryptographic Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Key Agreement Phase                        │
//! │                                                             │
//! │   ECDH(P-256)  ─or─  DH(RFC 3526 g14, RSA-signed)           │
//! │        │                      │                             │
//! │        └──────────┬───────────┘                             │
//! │                   ▼                                         │
//! │        HKDF-SHA256 ──► SharedSecret (64 bytes)              │
//! │                         ├─ bytes  0..32 : cipher key        │
//! │                         └─ bytes 32..64 : MAC key           │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Envelope Phase                             │
//! │                                                             │
//! │   plaintext ──AES-256-CBC──► ciphertext ──HMAC-SHA256──► mac│
//! │   transcript ──ECDSA P-256──► signature_a                   │
//! │   transcript ──RSA-2048 PKCS#1v1.5──► signature_b           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//! - **Encrypt-then-MAC**: the MAC is computed over the ciphertext
//! - **Key separation**: cipher and MAC segments are disjoint
//! - **Defense in depth**: two independent signature schemes
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER roll your own crypto
//! - MAC comparison MUST stay constant-time (`subtle`)
//! - Never decrypt unauthenticated ciphertext
//!
//! ## Last Modified
//! v0.1.0 - Initial crypto implementation

pub mod agreement;
pub mod cipher;
pub mod kdf;
pub mod keys;
pub mod mac;

// Re-export primary types at module level
pub use agreement::{AuthenticatedDh, DhKeyPair, DhParams, EcdhKeyPair, EcdhPublicKey};
pub use keys::{EcdsaKeyPair, EcdsaPublicKey, RsaKeyPair, RsaVerifier, SharedSecret};

// ============================================
// Constants
// ============================================

/// Size of the AES-256 cipher key segment in bytes.
pub const CIPHER_KEY_SIZE: usize = 32;

/// Size of the AES block (and CBC IV) in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

/// Size of the cipher initialization vector in bytes.
pub const IV_SIZE: usize = AES_BLOCK_SIZE;

/// Size of the HMAC-SHA256 key segment in bytes.
pub const MAC_KEY_SIZE: usize = 32;

/// Size of the HMAC-SHA256 authentication tag in bytes.
pub const MAC_TAG_SIZE: usize = 32;

/// Total size of the shared secret: disjoint cipher + MAC segments.
pub const SHARED_SECRET_SIZE: usize = CIPHER_KEY_SIZE + MAC_KEY_SIZE;

/// Size of a SEC1 uncompressed P-256 public key in bytes.
pub const ECDSA_PUBLIC_KEY_SIZE: usize = 65;

/// RSA modulus size in bits for signature keys.
pub const RSA_KEY_BITS: usize = 2048;

/// HKDF salt for shared-secret derivation.
pub const HKDF_SALT: &[u8] = b"veilpost-v1";

/// HKDF info label for shared-secret derivation.
pub const HKDF_INFO: &[u8] = b"veilpost-shared-secret";
