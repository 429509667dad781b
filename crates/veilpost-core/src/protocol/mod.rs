// ============================================
// File: crates/veilpost-core/src/protocol/mod.rs
// ============================================
//! # Protocol Module
//!
//! ## Creation Reason
//! Defines the wire-level unit of the protocol: the envelope and the
//! transcript its signatures cover.
//!
//! ## Main Functionality
//! - [`envelope`]: the `Envelope` record and signing transcript
//!
//! ## ⚠️ Important Note for Next Developer
//! - Envelope field order is significant for external serializers;
//!   never reorder fields
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol module

pub mod envelope;

pub use envelope::Envelope;
