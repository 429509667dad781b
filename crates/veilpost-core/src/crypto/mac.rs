// ============================================
// File: crates/veilpost-core/src/crypto/mac.rs
// ============================================
//! # Message Authentication
//!
//! ## Creation Reason
//! Provides the keyed integrity check over the ciphertext: HMAC-SHA256
//! under the MAC segment of the shared secret, verified in constant
//! time.
//!
//! ## Main Functionality
//! - `generate`: compute HMAC-SHA256 over data
//! - `verify`: recompute and compare with a timing-safe equality
//!
//! ## Timing-Safety
//! The comparison uses `subtle::ConstantTimeEq`, so verification time
//! does not depend on where the first mismatching byte occurs. An
//! early-exit `==` here would let an attacker binary-search a valid tag
//! byte by byte.
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER replace the `subtle` comparison with `==` or `iter().eq()`
//! - The MAC key must be the segment DISJOINT from the cipher key
//!
//! ## Last Modified
//! v0.1.0 - Initial MAC implementation

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{CoreError, Result};

use super::MAC_TAG_SIZE;

type HmacSha256 = Hmac<Sha256>;

// ============================================
// MAC Generation / Verification
// ============================================

/// Computes HMAC-SHA256 over `data`.
///
/// # Arguments
/// * `key` - MAC key (the MAC segment of the shared secret)
/// * `data` - Data to authenticate (the envelope ciphertext)
///
/// # Errors
/// Returns `MalformedKey` if the key is empty. HMAC itself accepts any
/// key length; an empty key is always a caller bug.
pub fn generate(key: &[u8], data: &[u8]) -> Result<[u8; MAC_TAG_SIZE]> {
    if key.is_empty() {
        return Err(CoreError::malformed_key("empty MAC key"));
    }

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|_| CoreError::malformed_key("invalid MAC key"))?;
    mac.update(data);

    let tag = mac.finalize().into_bytes();
    let mut out = [0u8; MAC_TAG_SIZE];
    out.copy_from_slice(&tag);
    Ok(out)
}

/// Verifies an HMAC-SHA256 tag in constant time.
///
/// # Returns
/// `true` if the tag matches. A wrong-length tag returns `false`
/// immediately; the length of a tag is public information.
///
/// # Errors
/// Returns `MalformedKey` only for an unusable key; a mismatching tag
/// is a `false` return, not an error, so callers decide how to report
/// it.
pub fn verify(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool> {
    let expected = generate(key, data)?;

    if tag.len() != MAC_TAG_SIZE {
        return Ok(false);
    }

    Ok(expected.as_slice().ct_eq(tag).into())
}

// ============================================
// Tests
// ============================================
