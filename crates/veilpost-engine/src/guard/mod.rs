// ============================================
// File: crates/veilpost-engine/src/guard/mod.rs
// ============================================
//! # Admission Control
//!
//! ## Creation Reason
//! Gatekeeps every symmetric-crypto call with two advisory defenses:
//! a per-client rate limit against DoS floods and a global in-flight
//! cap against parallel resource-exhaustion attacks.
//!
//! ## Main Functionality
//! - [`rate_limit`]: `RateLimiter` - minimum interval between
//!   operations from one client
//! - [`concurrency`]: `ConcurrencyGuard` - atomic in-flight cap with an
//!   RAII release token
//!
//! ## Failure Semantics
//! Both gates reject with TRANSIENT errors: the caller backs off and
//! retries. Neither is authentication; a caller that fails admission
//! simply does not get to perform the cryptographic operation.
//!
//! ## ⚠️ Important Note for Next Developer
//! - No I/O and no crypto inside these modules; critical sections must
//!   stay short
//! - The counters here are the modules' private state - nothing else
//!   may mutate them
//!
//! ## Last Modified
//! v0.1.0 - Initial admission control

pub mod concurrency;
pub mod rate_limit;

pub use concurrency::{ConcurrencyGuard, SlotToken};
pub use rate_limit::RateLimiter;
