// ============================================
// File: crates/veilpost-core/src/crypto/keys.rs
// ============================================
//! # Cryptographic Key Types
//!
//! ## Creation Reason
//! Defines the closed set of key kinds used by the protocol, each as a
//! distinct type checked at construction time. There is no "any key"
//! parameter anywhere: a caller can only hand an ECDSA key where an
//! ECDSA key belongs, which removes runtime type-assertion failure as
//! an error class.
//!
//! ## Main Functionality
//! - `EcdsaKeyPair` / `EcdsaPublicKey`: P-256 signing keys (signature A)
//! - `RsaKeyPair` / `RsaVerifier`: RSA-2048 PKCS#1 v1.5 keys (signature B)
//! - `SharedSecret`: 64-byte symmetric key material with disjoint
//!   cipher and MAC segments, zeroized on drop
//!
//! ## Key Lifecycle
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  EcdsaKeyPair / RsaKeyPair (long-term)                     │
//! │  ├─ Generated once per endpoint                            │
//! │  ├─ Sign the envelope transcript (both, independently)     │
//! │  └─ RSA key also authenticates classic-DH public values    │
//! │                                                            │
//! │  SharedSecret (per peer pair)                              │
//! │  ├─ Derived via key agreement + HKDF                       │
//! │  ├─ bytes 0..32  → AES-256-CBC key                         │
//! │  ├─ bytes 32..64 → HMAC-SHA256 key                         │
//! │  └─ Zeroized when dropped                                  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Private keys must NEVER appear in Debug output or logs
//! - The cipher and MAC segments must stay disjoint - the protocol's
//!   encrypt-then-MAC argument depends on it
//! - Key generation failure is fatal: never substitute a default key
//!
//! ## Last Modified
//! v0.1.0 - Initial key type definitions

use std::fmt;

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1v15::{
    Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey,
};
use rsa::signature::{Keypair, SignatureEncoding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

use super::{CIPHER_KEY_SIZE, RSA_KEY_BITS, SHARED_SECRET_SIZE};

// ============================================
// EcdsaKeyPair (P-256, signature A)
// ============================================

/// Long-term ECDSA P-256 key pair.
///
/// Produces `signature_a` of the envelope. The public key travels in
/// the envelope itself (`sender_public_key`) so the receiver can verify
/// without prior exchange.
#[derive(Clone)]
pub struct EcdsaKeyPair {
    signing_key: SigningKey,
}

impl EcdsaKeyPair {
    /// Generates a new random key pair from the OS secure RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Returns the public key component.
    #[must_use]
    pub fn public_key(&self) -> EcdsaPublicKey {
        EcdsaPublicKey(*self.signing_key.verifying_key())
    }

    /// Signs a message; returns the DER-encoded ECDSA signature.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: EcdsaSignature = self.signing_key.sign(message);
        signature.to_der().as_bytes().to_vec()
    }
}

impl fmt::Debug for EcdsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print private key material
        f.debug_struct("EcdsaKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

// ============================================
// EcdsaPublicKey
// ============================================

/// Public component of a P-256 ECDSA key.
///
/// Safe to share; carried in the envelope as SEC1 uncompressed bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EcdsaPublicKey(VerifyingKey);

impl EcdsaPublicKey {
    /// Parses a public key from SEC1-encoded bytes.
    ///
    /// # Errors
    /// Returns `MalformedKey` if the bytes do not encode a valid curve
    /// point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let key = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| CoreError::malformed_key("invalid P-256 public key encoding"))?;
        Ok(Self(key))
    }

    /// Returns the SEC1 uncompressed encoding (65 bytes).
    #[must_use]
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Verifies a DER-encoded ECDSA signature over `message`.
    ///
    /// # Errors
    /// Returns `SignatureVerification` if the signature is malformed or
    /// does not verify. The two cases are deliberately merged.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let sig = EcdsaSignature::from_der(signature)
            .map_err(|_| CoreError::SignatureVerification)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CoreError::SignatureVerification)
    }
}

impl fmt::Debug for EcdsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_sec1_bytes();
        write!(
            f,
            "EcdsaPublicKey({:02x}{:02x}{:02x}{:02x}...)",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

// ============================================
// RsaKeyPair (RSA-2048, signature B)
// ============================================

/// Long-term RSA-2048 key pair for PKCS#1 v1.5 / SHA-256 signatures.
///
/// Produces `signature_b` of the envelope and authenticates classic-DH
/// public values during key agreement. The verifying half is exchanged
/// out of band as [`RsaVerifier`].
#[derive(Clone)]
pub struct RsaKeyPair {
    signing_key: RsaSigningKey<Sha256>,
}

impl RsaKeyPair {
    /// Generates a new RSA-2048 key pair.
    ///
    /// This is by far the slowest key generation in the suite; long-term
    /// keys should be generated once and reused.
    ///
    /// # Errors
    /// Returns `KeyGeneration` if the RNG or prime search fails. Fatal:
    /// callers must abort rather than continue with a weaker key.
    pub fn generate() -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| CoreError::key_generation(format!("RSA-{RSA_KEY_BITS}: {e}")))?;
        Ok(Self {
            signing_key: RsaSigningKey::new(private),
        })
    }

    /// Returns the verifying half of this key pair.
    #[must_use]
    pub fn verifier(&self) -> RsaVerifier {
        RsaVerifier(self.signing_key.verifying_key())
    }

    /// Signs a message; returns the PKCS#1 v1.5 signature bytes.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: RsaSignature = self.signing_key.sign(message);
        signature.to_vec()
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair").finish_non_exhaustive()
    }
}

// ============================================
// RsaVerifier
// ============================================

/// Public half of an RSA signing key.
#[derive(Clone)]
pub struct RsaVerifier(RsaVerifyingKey<Sha256>);

impl RsaVerifier {
    /// Wraps an RSA public key for signature verification.
    #[must_use]
    pub fn new(public: RsaPublicKey) -> Self {
        Self(RsaVerifyingKey::new(public))
    }

    /// Verifies a PKCS#1 v1.5 signature over `message`.
    ///
    /// # Errors
    /// Returns `SignatureVerification` for malformed and mismatching
    /// signatures alike.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let sig = RsaSignature::try_from(signature)
            .map_err(|_| CoreError::SignatureVerification)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CoreError::SignatureVerification)
    }
}

impl fmt::Debug for RsaVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaVerifier").finish_non_exhaustive()
    }
}

// ============================================
// SharedSecret
// ============================================

/// Symmetric key material derived once via key agreement.
///
/// # Layout
/// At least 64 bytes: the leading 32 bytes are the cipher key, the
/// remainder is the MAC key. The two segments never overlap.
///
/// # Security
/// - Zeroized on drop
/// - `Debug` prints only the length
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl SharedSecret {
    /// Creates a shared secret from raw bytes.
    ///
    /// # Errors
    /// Returns `KeyGeneration` if fewer than 64 bytes are supplied.
    /// Short secrets are never padded or accepted silently.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < SHARED_SECRET_SIZE {
            return Err(CoreError::key_generation(format!(
                "shared secret must be at least {SHARED_SECRET_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    /// Generates a random shared secret.
    ///
    /// For tests and harnesses that skip key agreement; production
    /// secrets come from [`crate::crypto::agreement`].
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = vec![0u8; SHARED_SECRET_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// The cipher-key segment (leading 32 bytes).
    #[must_use]
    pub fn cipher_key(&self) -> &[u8] {
        &self.bytes[..CIPHER_KEY_SIZE]
    }

    /// The MAC-key segment (everything after the cipher key).
    #[must_use]
    pub fn mac_key(&self) -> &[u8] {
        &self.bytes[CIPHER_KEY_SIZE..]
    }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`: construction enforces a minimum length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Constant-time equality, for key-agreement symmetry checks.
    #[must_use]
    pub fn ct_eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret({} bytes)", self.bytes.len())
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecdsa_sign_verify() {
        let pair = EcdsaKeyPair::generate();
        let sig = pair.sign(b"transcript");

        pair.public_key().verify(b"transcript", &sig).unwrap();
        assert!(pair.public_key().verify(b"tampered", &sig).is_err());
    }

    #[test]
    fn test_ecdsa_public_key_sec1_round_trip() {
        let pair = EcdsaKeyPair::generate();
        let bytes = pair.public_key().to_sec1_bytes();
        assert_eq!(bytes.len(), super::super::ECDSA_PUBLIC_KEY_SIZE);

        let restored = EcdsaPublicKey::from_sec1_bytes(&bytes).unwrap();
        assert_eq!(restored, pair.public_key());
    }

    #[test]
    fn test_ecdsa_garbage_key_rejected() {
        assert!(matches!(
            EcdsaPublicKey::from_sec1_bytes(&[0u8; 65]),
            Err(CoreError::MalformedKey { .. })
        ));
    }

    #[test]
    fn test_rsa_sign_verify() {
        let pair = RsaKeyPair::generate().unwrap();
        let sig = pair.sign(b"transcript");

        pair.verifier().verify(b"transcript", &sig).unwrap();
        assert!(pair.verifier().verify(b"tampered", &sig).is_err());
    }

    #[test]
    fn test_rsa_garbage_signature_rejected() {
        let pair = RsaKeyPair::generate().unwrap();
        assert!(matches!(
            pair.verifier().verify(b"msg", &[0u8; 7]),
            Err(CoreError::SignatureVerification)
        ));
    }

    #[test]
    fn test_shared_secret_segments_disjoint() {
        let secret = SharedSecret::random();
        assert_eq!(secret.len(), SHARED_SECRET_SIZE);
        assert_eq!(secret.cipher_key().len(), CIPHER_KEY_SIZE);
        assert_eq!(secret.mac_key().len(), SHARED_SECRET_SIZE - CIPHER_KEY_SIZE);

        // The segments partition the secret with no overlap.
        let mut recombined = secret.cipher_key().to_vec();
        recombined.extend_from_slice(secret.mac_key());
        assert_eq!(recombined.len(), secret.len());
    }

    #[test]
    fn test_shared_secret_minimum_length_enforced() {
        assert!(SharedSecret::from_bytes(vec![0u8; 63]).is_err());
        assert!(SharedSecret::from_bytes(vec![0u8; 64]).is_ok());
        assert!(SharedSecret::from_bytes(vec![0u8; 96]).is_ok());
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let secret = SharedSecret::from_bytes(vec![0xAB; 64]).unwrap();
        let dbg = format!("{secret:?}");
        assert!(!dbg.contains("ab"), "debug output leaked secret bytes");

        let pair = EcdsaKeyPair::generate();
        assert!(!format!("{pair:?}").contains("signing"));
    }
}
