// ============================================
// File: crates/veilpost-core/src/crypto/agreement.rs
// ============================================
//! # Key Agreement
//!
//! ## Creation Reason
//! Two interchangeable constructions derive the shared secret that the
//! envelope codec consumes: an elliptic-curve exchange for the common
//! case, and an RSA-authenticated classic Diffie-Hellman exchange for
//! peers that require the standardized group.
//!
//! ## Main Functionality
//! - `EcdhKeyPair` / `EcdhPublicKey`: P-256 ECDH agreement
//! - `DhParams` / `DhKeyPair`: classic DH over RFC 3526 group 14
//! - `AuthenticatedDh`: a DH public value signed with the long-term RSA
//!   key; verification precedes any secret computation
//!
//! ## Authenticated DH Flow
//! ```text
//!  A                                             B
//!  │  pub_a = g^a mod p                          │
//!  │  sig_a = RSA-sign(pub_a)                    │
//!  │ ───────── AuthenticatedDh{pub_a, sig_a} ──► │
//!  │                                             │ verify sig_a FIRST
//!  │ ◄──────── AuthenticatedDh{pub_b, sig_b} ─── │ then pub_a^b mod p
//!  │ verify sig_b, then pub_b^a mod p            │
//!  │                                             │
//!  └────── both: HKDF ──► SharedSecret ──────────┘
//! ```
//! An unsigned DH public value is never used: without the signature an
//! active attacker substitutes their own value (man in the middle).
//!
//! ## ⚠️ Important Note for Next Developer
//! - Signature verification MUST abort agreement before any modular
//!   exponentiation with the peer value
//! - Peer public values outside (1, p-1) are rejected (trivial
//!   subgroup elements force a predictable secret)
//! - Private exponents stay in [1, p-2]
//!
//! ## Last Modified
//! v0.1.0 - Initial key agreement implementation

use num_bigint::{BigUint, RandBigInt};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{ecdh, PublicKey, SecretKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroize;

use crate::error::{CoreError, Result};

use super::kdf::expand_shared_secret;
use super::keys::{RsaKeyPair, RsaVerifier, SharedSecret};

// ============================================
// ECDH (P-256)
// ============================================

/// P-256 key pair for elliptic-curve Diffie-Hellman.
pub struct EcdhKeyPair {
    secret: SecretKey,
}

impl EcdhKeyPair {
    /// Generates a fresh key pair from the OS secure RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut OsRng),
        }
    }

    /// Returns the public component.
    #[must_use]
    pub fn public_key(&self) -> EcdhPublicKey {
        EcdhPublicKey(self.secret.public_key())
    }

    /// Derives the shared secret with a peer's public key.
    ///
    /// Symmetric by construction: `a.agree(pub_b) == b.agree(pub_a)`.
    /// The raw agreement output is the x-coordinate of the scalar
    /// multiplication, expanded through HKDF.
    ///
    /// # Errors
    /// Returns `KeyDerivation` if the HKDF expansion fails.
    pub fn agree(&self, peer: &EcdhPublicKey) -> Result<SharedSecret> {
        let shared = ecdh::diffie_hellman(self.secret.to_nonzero_scalar(), peer.0.as_affine());
        expand_shared_secret(shared.raw_secret_bytes().as_slice())
    }
}

impl std::fmt::Debug for EcdhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdhKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Public component of an ECDH key pair.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EcdhPublicKey(PublicKey);

impl EcdhPublicKey {
    /// Parses a public key from SEC1-encoded bytes.
    ///
    /// # Errors
    /// Returns `MalformedKey` if the bytes do not encode a valid,
    /// non-identity curve point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let key = PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| CoreError::malformed_key("invalid P-256 ECDH public key"))?;
        Ok(Self(key))
    }

    /// Returns the SEC1 uncompressed encoding (65 bytes).
    #[must_use]
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }
}

impl std::fmt::Debug for EcdhPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_sec1_bytes();
        write!(
            f,
            "EcdhPublicKey({:02x}{:02x}{:02x}{:02x}...)",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

// ============================================
// Classic DH Parameters (RFC 3526)
// ============================================

/// 2048-bit MODP prime from RFC 3526, group 14.
const GROUP14_PRIME_HEX: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
                                 020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
                                 4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
                                 EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
                                 98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
                                 9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
                                 E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
                                 3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

/// Classic Diffie-Hellman group parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct DhParams {
    p: BigUint,
    g: BigUint,
}

impl DhParams {
    /// Returns the standardized RFC 3526 group 14 parameters
    /// (2048-bit safe prime, generator 2).
    #[must_use]
    pub fn rfc3526_group14() -> Self {
        // Fixed well-known constant; parsing cannot fail.
        let p = BigUint::parse_bytes(GROUP14_PRIME_HEX.as_bytes(), 16)
            .expect("RFC 3526 group 14 prime is valid hex");
        Self {
            p,
            g: BigUint::from(2u32),
        }
    }

    /// The group modulus.
    #[must_use]
    pub fn prime(&self) -> &BigUint {
        &self.p
    }

    /// The group generator.
    #[must_use]
    pub fn generator(&self) -> &BigUint {
        &self.g
    }
}

impl std::fmt::Debug for DhParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DhParams({} bits, g={})", self.p.bits(), self.g)
    }
}

// ============================================
// DhKeyPair
// ============================================

/// A classic-DH key pair over fixed group parameters.
pub struct DhKeyPair {
    private: BigUint,
    public: BigUint,
    params: DhParams,
}

impl DhKeyPair {
    /// Generates a key pair: private exponent uniform in `[1, p-2]`,
    /// public value `g^private mod p`.
    #[must_use]
    pub fn generate(params: &DhParams) -> Self {
        let mut rng = OsRng;
        // gen_biguint_below yields [0, p-3]; shifting by one gives [1, p-2].
        let upper = params.p.clone() - 2u32;
        let private = rng.gen_biguint_below(&upper) + 1u32;
        let public = params.g.modpow(&private, &params.p);
        Self {
            private,
            public,
            params: params.clone(),
        }
    }

    /// The public value as big-endian bytes.
    #[must_use]
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.to_bytes_be()
    }

    /// The group parameters this pair was generated for.
    #[must_use]
    pub fn params(&self) -> &DhParams {
        &self.params
    }
}

impl Drop for DhKeyPair {
    fn drop(&mut self) {
        self.private.zeroize();
    }
}

impl std::fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// ============================================
// AuthenticatedDh
// ============================================

/// A transmitted DH public value, signed with the sender's long-term
/// RSA key.
///
/// Plain (unsigned) DH is deliberately not exposed: the signature is
/// what defeats active substitution of the public value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedDh {
    /// Big-endian bytes of `g^private mod p`.
    pub public_value: Vec<u8>,
    /// RSA PKCS#1 v1.5 signature over `public_value`.
    pub signature: Vec<u8>,
}

impl AuthenticatedDh {
    /// Signs a key pair's public value for transmission.
    #[must_use]
    pub fn create(pair: &DhKeyPair, signer: &RsaKeyPair) -> Self {
        let public_value = pair.public_bytes();
        let signature = signer.sign(&public_value);
        Self {
            public_value,
            signature,
        }
    }

    /// Verifies the peer's signature, then computes the shared secret.
    ///
    /// # Order of operations
    /// 1. RSA signature over the peer public value, against the peer's
    ///    asserted long-term key - failure aborts agreement
    /// 2. Range check on the peer value (must lie in `(1, p-1)`)
    /// 3. `peer^private mod p`, expanded through HKDF
    ///
    /// # Errors
    /// - `KeyAgreement` if the signature is invalid or the peer value
    ///   is out of range
    /// - `KeyDerivation` if HKDF expansion fails
    pub fn verify_and_agree(
        &self,
        ours: &DhKeyPair,
        peer_rsa: &RsaVerifier,
    ) -> Result<SharedSecret> {
        if peer_rsa.verify(&self.public_value, &self.signature).is_err() {
            warn!("DH public value signature failed verification; aborting agreement");
            return Err(CoreError::key_agreement(
                "peer DH public value signature invalid",
            ));
        }

        let peer_public = BigUint::from_bytes_be(&self.public_value);
        let p_minus_1 = ours.params.p.clone() - 1u32;
        if peer_public <= BigUint::from(1u32) || peer_public >= p_minus_1 {
            return Err(CoreError::key_agreement(
                "peer DH public value out of range",
            ));
        }

        let secret = peer_public.modpow(&ours.private, &ours.params.p);
        let mut ikm = secret.to_bytes_be();
        let shared = expand_shared_secret(&ikm);
        ikm.zeroize();
        shared
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn test_rsa() -> &'static RsaKeyPair {
        static KEY: OnceLock<RsaKeyPair> = OnceLock::new();
        KEY.get_or_init(|| RsaKeyPair::generate().unwrap())
    }

    #[test]
    fn test_ecdh_symmetry() {
        let a = EcdhKeyPair::generate();
        let b = EcdhKeyPair::generate();

        let secret_a = a.agree(&b.public_key()).unwrap();
        let secret_b = b.agree(&a.public_key()).unwrap();
        assert!(secret_a.ct_eq(&secret_b));
    }

    #[test]
    fn test_ecdh_distinct_peers_distinct_secrets() {
        let a = EcdhKeyPair::generate();
        let b = EcdhKeyPair::generate();
        let c = EcdhKeyPair::generate();

        let ab = a.agree(&b.public_key()).unwrap();
        let ac = a.agree(&c.public_key()).unwrap();
        assert!(!ab.ct_eq(&ac));
    }

    #[test]
    fn test_ecdh_public_key_round_trip() {
        let pair = EcdhKeyPair::generate();
        let bytes = pair.public_key().to_sec1_bytes();
        let restored = EcdhPublicKey::from_sec1_bytes(&bytes).unwrap();
        assert_eq!(restored, pair.public_key());
    }

    #[test]
    fn test_dh_symmetry() {
        let params = DhParams::rfc3526_group14();
        let a = DhKeyPair::generate(&params);
        let b = DhKeyPair::generate(&params);
        let rsa = test_rsa();

        let offer_a = AuthenticatedDh::create(&a, rsa);
        let offer_b = AuthenticatedDh::create(&b, rsa);

        let secret_a = offer_b.verify_and_agree(&a, &rsa.verifier()).unwrap();
        let secret_b = offer_a.verify_and_agree(&b, &rsa.verifier()).unwrap();
        assert!(secret_a.ct_eq(&secret_b));
    }

    #[test]
    fn test_dh_tampered_public_value_aborts() {
        let params = DhParams::rfc3526_group14();
        let a = DhKeyPair::generate(&params);
        let b = DhKeyPair::generate(&params);
        let rsa = test_rsa();

        let mut offer = AuthenticatedDh::create(&b, rsa);
        offer.public_value[0] ^= 0x01;

        let result = offer.verify_and_agree(&a, &rsa.verifier());
        assert!(matches!(result, Err(CoreError::KeyAgreement { .. })));
    }

    #[test]
    fn test_dh_tampered_signature_aborts() {
        let params = DhParams::rfc3526_group14();
        let a = DhKeyPair::generate(&params);
        let b = DhKeyPair::generate(&params);
        let rsa = test_rsa();

        let mut offer = AuthenticatedDh::create(&b, rsa);
        let last = offer.signature.len() - 1;
        offer.signature[last] ^= 0x80;

        assert!(offer.verify_and_agree(&a, &rsa.verifier()).is_err());
    }

    #[test]
    fn test_dh_trivial_public_value_rejected() {
        let params = DhParams::rfc3526_group14();
        let a = DhKeyPair::generate(&params);
        let rsa = test_rsa();

        // A correctly signed but degenerate public value must still be
        // rejected by the range check.
        let one = BigUint::from(1u32).to_bytes_be();
        let offer = AuthenticatedDh {
            signature: rsa.sign(&one),
            public_value: one,
        };
        assert!(matches!(
            offer.verify_and_agree(&a, &rsa.verifier()),
            Err(CoreError::KeyAgreement { .. })
        ));
    }

    #[test]
    fn test_dh_private_exponent_in_range() {
        let params = DhParams::rfc3526_group14();
        for _ in 0..4 {
            let pair = DhKeyPair::generate(&params);
            assert!(pair.private >= BigUint::from(1u32));
            assert!(pair.private <= params.p.clone() - 2u32);
        }
    }
}
