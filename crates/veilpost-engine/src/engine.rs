// ============================================
// File: crates/veilpost-engine/src/engine.rs
// ============================================
//! # Message Engine
//!
//! ## Creation Reason
//! Orchestrates the full protocol: sequences admission control, the
//! freshness and replay defenses, and the cryptographic pipelines into
//! the two public operations `seal` and `open`.
//!
//! ## Pipelines
//! ```text
//! seal(plaintext, client):
//!   rate limit → stamp time/nonce/IV → [slot] encrypt → MAC
//!             → sign transcript (ECDSA, then RSA) → Envelope
//!
//! open(envelope, client):
//!   rate limit → freshness → replay record → MAC (ciphertext)
//!             → ECDSA over transcript (key from envelope)
//!             → RSA over transcript (pinned peer key)
//!             → [slot] decrypt
//! ```
//! The receive order is load-bearing: cheap stateful gates run before
//! any asymmetric work, the MAC runs before decryption
//! (encrypt-then-MAC), and the replay record happens before signature
//! checks so a replayed envelope never costs two verifications.
//!
//! ## ⚠️ Important Note for Next Developer
//! - The nonce is recorded BEFORE the signatures are checked. A forged
//!   envelope therefore burns its nonce; that is fine - the nonce space
//!   is 2^128 and a forger gains nothing from burning values
//! - `signature_a` verifies against the key INSIDE the envelope (it
//!   proves transcript consistency); `signature_b` verifies against the
//!   pinned peer key and carries the actual sender authentication
//! - Failures returned to untrusted counterparties must pass through
//!   `EngineError::external_outcome()` first
//!
//! ## Last Modified
//! v0.1.0 - Initial engine implementation

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use veilpost_common::time::Timestamp;
use veilpost_common::types::{ClientId, Nonce};
use veilpost_core::crypto::{cipher, mac};
use veilpost_core::error::CoreError;
use veilpost_core::{EcdsaKeyPair, EcdsaPublicKey, Envelope, RsaKeyPair, RsaVerifier, SharedSecret};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::guard::{ConcurrencyGuard, RateLimiter};
use crate::metrics::{MetricsSink, NoopSink, OpKind};
use crate::replay::NonceTracker;

// ============================================
// Key Bundles
// ============================================

/// The local endpoint's long-term signing keys.
#[derive(Clone, Debug)]
pub struct SenderKeys {
    /// ECDSA P-256 pair producing `signature_a`.
    pub ecdsa: EcdsaKeyPair,
    /// RSA-2048 pair producing `signature_b`.
    pub rsa: RsaKeyPair,
}

impl SenderKeys {
    /// Generates a fresh pair of long-term keys.
    ///
    /// RSA generation dominates the cost; call once per endpoint, not
    /// per message.
    ///
    /// # Errors
    /// Returns `Core` on key-generation failure. Fatal: abort rather
    /// than continue with partial keys.
    pub fn generate() -> Result<Self> {
        Ok(Self {
            ecdsa: EcdsaKeyPair::generate(),
            rsa: RsaKeyPair::generate()?,
        })
    }
}

/// Verification material for the remote endpoint.
#[derive(Clone, Debug)]
pub struct PeerKeys {
    /// Pinned RSA verifying key; checks `signature_b`. Exchanged out of
    /// band, never taken from an envelope.
    pub rsa: RsaVerifier,
}

// ============================================
// MessageEngine
// ============================================

/// The protocol orchestrator.
///
/// Owns one shared secret, one set of signing keys, one pinned peer,
/// and all mutable protocol state (replay tracker, rate table,
/// in-flight counter). Every method is safe under arbitrary concurrent
/// callers through a shared reference.
pub struct MessageEngine {
    config: EngineConfig,
    secret: SharedSecret,
    sender: SenderKeys,
    peer: PeerKeys,
    replay: Arc<NonceTracker>,
    rate: RateLimiter,
    concurrency: ConcurrencyGuard,
    metrics: Arc<dyn MetricsSink>,
}

impl MessageEngine {
    /// Builds an engine from validated configuration and key material.
    ///
    /// # Errors
    /// Returns `Config` if the configuration fails validation.
    pub fn new(
        config: EngineConfig,
        secret: SharedSecret,
        sender: SenderKeys,
        peer: PeerKeys,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            freshness_window_secs = config.freshness.window_secs,
            replay_capacity = config.replay.max_entries,
            max_in_flight = config.concurrency.max_in_flight,
            "message engine initialized"
        );
        Ok(Self {
            replay: Arc::new(NonceTracker::new(&config.replay)),
            rate: RateLimiter::new(&config.rate_limit),
            concurrency: ConcurrencyGuard::new(&config.concurrency),
            metrics: Arc::new(NoopSink),
            config,
            secret,
            sender,
            peer,
        })
    }

    /// Replaces the metrics sink. Builder-style, call before sharing.
    #[must_use]
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    /// The replay tracker, for hosts that run a background sweeper.
    #[must_use]
    pub fn replay_tracker(&self) -> &Arc<NonceTracker> {
        &self.replay
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================
    // Send Pipeline
    // ========================================

    /// Constructs a complete envelope around `plaintext`.
    ///
    /// # Errors
    /// - `RateLimited` / `ConcurrencyExceeded`: transient, retry later
    /// - `Core`: cryptographic failure (should not occur with valid
    ///   key material)
    pub fn seal(&self, plaintext: &[u8], client: &ClientId) -> Result<Envelope> {
        self.rate.check(client)?;
        self.seal_at(Timestamp::now(), plaintext)
    }

    /// Builds an envelope stamped with an explicit timestamp.
    ///
    /// Split out so freshness-window behavior is testable without
    /// manipulating the clock; `seal` is the only production caller and
    /// always passes `Timestamp::now()`.
    fn seal_at(&self, timestamp: Timestamp, plaintext: &[u8]) -> Result<Envelope> {
        let nonce = Nonce::generate();
        let iv = cipher::generate_iv();

        let ciphertext = {
            let _slot = self.concurrency.acquire()?;
            self.timed(OpKind::Encrypt, || {
                cipher::encrypt(self.secret.cipher_key(), &iv, plaintext)
            })?
        };

        let tag = self.timed(OpKind::Mac, || {
            mac::generate(self.secret.mac_key(), &ciphertext)
        })?;

        let transcript = Envelope::signing_transcript(timestamp, &nonce, &iv, &ciphertext);
        let signature_a = self.timed(OpKind::Sign, || self.sender.ecdsa.sign(&transcript));
        let signature_b = self.timed(OpKind::Sign, || self.sender.rsa.sign(&transcript));

        debug!(
            ciphertext_len = ciphertext.len(),
            nonce = %nonce,
            "envelope sealed"
        );

        Ok(Envelope {
            timestamp,
            nonce,
            iv,
            ciphertext,
            mac: tag.to_vec(),
            signature_a,
            signature_b,
            sender_public_key: self.sender.ecdsa.public_key().to_sec1_bytes(),
        })
    }

    // ========================================
    // Receive Pipeline
    // ========================================

    /// Verifies an envelope end to end and returns the plaintext.
    ///
    /// Runs the full defense sequence: rate limit, freshness, replay,
    /// MAC, both signatures, then decryption. The first failing check
    /// aborts the pipeline.
    ///
    /// # Errors
    /// Any variant of [`EngineError`]; collapse with
    /// [`external_outcome`](EngineError::external_outcome) before
    /// reporting to an untrusted counterparty.
    pub fn open(&self, envelope: &Envelope, client: &ClientId) -> Result<Vec<u8>> {
        let result = self.open_inner(envelope, client);
        if let Err(e) = &result {
            if e.is_suspicious() {
                warn!(client = %client, error = %e, "envelope rejected");
            }
        }
        result
    }

    fn open_inner(&self, envelope: &Envelope, client: &ClientId) -> Result<Vec<u8>> {
        self.rate.check(client)?;

        let window_secs = self.config.freshness.window_secs;
        if !envelope.timestamp.is_fresh(window_secs) {
            return Err(EngineError::TimestampOutOfWindow {
                skew_secs: envelope.timestamp.skew_secs(),
                window_secs,
            });
        }

        self.replay.record_if_new(&envelope.nonce)?;

        let mac_ok = self.timed(OpKind::Mac, || {
            mac::verify(self.secret.mac_key(), &envelope.ciphertext, &envelope.mac)
        })?;
        if !mac_ok {
            return Err(CoreError::MacMismatch.into());
        }

        let transcript = envelope.transcript();

        let sender_key = EcdsaPublicKey::from_sec1_bytes(&envelope.sender_public_key)?;
        self.timed(OpKind::Verify, || {
            sender_key.verify(&transcript, &envelope.signature_a)
        })?;
        self.timed(OpKind::Verify, || {
            self.peer.rsa.verify(&transcript, &envelope.signature_b)
        })?;

        let plaintext = {
            let _slot = self.concurrency.acquire()?;
            self.timed(OpKind::Decrypt, || {
                cipher::decrypt(self.secret.cipher_key(), &envelope.iv, &envelope.ciphertext)
            })?
        };

        debug!(plaintext_len = plaintext.len(), "envelope opened");
        Ok(plaintext)
    }

    fn timed<T>(&self, kind: OpKind, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.metrics.record(kind, start.elapsed());
        out
    }
}

impl std::fmt::Debug for MessageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageEngine")
            .field("config", &self.config)
            .field("replay", &self.replay)
            .field("rate", &self.rate)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
