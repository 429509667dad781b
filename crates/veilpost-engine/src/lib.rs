// ============================================
// File: crates/veilpost-engine/src/lib.rs
// ============================================
//! # Veilpost Engine - Protocol Orchestration Library
//!
//! ## Creation Reason
//! Hosts everything in the protocol that owns mutable shared state:
//! the admission-control gate (rate limiter + concurrency cap), the
//! replay-defense nonce tracker, and the `MessageEngine` orchestrator
//! that sequences them around the cryptographic pipelines.
//!
//! ## Main Functionality
//! - [`guard`]: admission control (per-client rate limit, in-flight cap)
//! - [`replay`]: bounded, self-cleaning nonce tracker
//! - [`engine`]: `MessageEngine` with the `seal`/`open` pipelines
//! - [`config`]: validated engine configuration (TOML)
//! - [`metrics`]: one-way reporting sink for operation durations
//! - [`error`]: failure taxonomy and external collapse
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │      veilpost-engine  ◄── You are here        │
//! │                   │                           │
//! │                   ▼                           │
//! │             veilpost-core                     │
//! │                   │                           │
//! │                   ▼                           │
//! │             veilpost-common                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Receive Pipeline (order is load-bearing)
//! ```text
//! rate limit → freshness → replay → MAC → sig A → sig B → decrypt
//!   cheap, stateful gates first ──────► expensive asymmetric work last
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Every public operation here is safe under arbitrary concurrency
//! - The three pieces of shared state (nonce map, rate table, in-flight
//!   counter) are each owned by exactly one module; never reach inside
//! - Admission failures are transient, NOT security incidents
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod metrics;
pub mod replay;

// Re-export commonly used items
pub use config::EngineConfig;
pub use engine::{MessageEngine, PeerKeys, SenderKeys};
pub use error::{EngineError, Rejection, Result};
pub use guard::{ConcurrencyGuard, RateLimiter, SlotToken};
pub use metrics::{MetricsSink, NoopSink, OpKind, OpStats};
pub use replay::{NonceTracker, SweeperHandle};
