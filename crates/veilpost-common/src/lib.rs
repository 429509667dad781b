// ============================================
// File: crates/veilpost-common/src/lib.rs
// ============================================
//! # Veilpost Common - Shared Types Library
//!
//! ## Creation Reason
//! Provides foundational types shared by every Veilpost crate: protocol
//! timestamps, replay nonces, client identifiers, and the common error type.
//!
//! ## Main Functionality
//! - [`types`]: Core type definitions (`Nonce`, `ClientId`)
//! - [`time`]: Protocol timestamps and freshness-window arithmetic
//! - [`error`]: Common error type and result alias
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │             veilpost-engine                   │
//! │                   │                           │
//! │                   ▼                           │
//! │             veilpost-core                     │
//! │                   │                           │
//! │                   ▼                           │
//! │             veilpost-common  ◄── You are here │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate is the foundation - keep dependencies minimal
//! - Freshness semantics live in `time::Timestamp`; the verification
//!   pipeline in the engine crate relies on them being inclusive at the
//!   window boundary
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CommonError, Result};
pub use time::Timestamp;
pub use types::{ClientId, Nonce};
