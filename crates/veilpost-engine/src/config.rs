// ============================================
// File: crates/veilpost-engine/src/config.rs
// ============================================
//! # Engine Configuration
//!
//! ## Creation Reason
//! Provides validated configuration for the protocol engine: freshness
//! window, replay-tracker bounds, rate-limit intervals, and the
//! concurrency cap. Supports TOML files for deployment and `from_str`
//! for tests.
//!
//! ## Example Configuration
//! ```toml
//! [freshness]
//! window_secs = 30
//!
//! [replay]
//! max_entries = 10000
//! cleanup_interval_secs = 300
//!
//! [rate_limit]
//! min_interval_ms = 10
//! retention_secs = 60
//!
//! [concurrency]
//! max_in_flight = 100
//! ```
//!
//! ## Validation Invariants
//! - All security parameters must be non-zero; missing values get the
//!   protocol defaults, but explicit zeros are rejected, never patched
//! - `replay.cleanup_interval_secs >= freshness.window_secs`: if nonces
//!   can be evicted while their envelope would still pass the freshness
//!   check, replay protection has a hole
//!
//! ## ⚠️ Important Note for Next Developer
//! - Validate BEFORE constructing any engine component
//! - Config changes require rebuilding the engine; components read
//!   their parameters once at construction
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};

// ============================================
// EngineConfig
// ============================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Freshness-window settings.
    #[serde(default)]
    pub freshness: FreshnessConfig,

    /// Replay-tracker bounds.
    #[serde(default)]
    pub replay: ReplayConfig,

    /// Per-client rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// In-flight operation cap.
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read, parsed, or fails
    /// validation.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading engine configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::config(&path_str, e.to_string()))?;

        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string (useful for testing).
    ///
    /// # Errors
    /// Returns `Config` on parse or validation failure.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| EngineError::config("<toml>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections and their cross-field constraints.
    ///
    /// # Errors
    /// Returns `Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.freshness.window_secs == 0 {
            return Err(EngineError::config(
                "freshness.window_secs",
                "must be non-zero",
            ));
        }
        if self.replay.max_entries == 0 {
            return Err(EngineError::config("replay.max_entries", "must be non-zero"));
        }
        if self.replay.cleanup_interval_secs == 0 {
            return Err(EngineError::config(
                "replay.cleanup_interval_secs",
                "must be non-zero",
            ));
        }
        if self.rate_limit.min_interval_ms == 0 {
            return Err(EngineError::config(
                "rate_limit.min_interval_ms",
                "must be non-zero",
            ));
        }
        if self.rate_limit.retention_secs == 0 {
            return Err(EngineError::config(
                "rate_limit.retention_secs",
                "must be non-zero",
            ));
        }
        if self.concurrency.max_in_flight == 0 {
            return Err(EngineError::config(
                "concurrency.max_in_flight",
                "must be non-zero",
            ));
        }

        // A nonce must outlive every envelope that could still pass the
        // freshness check, or replays slip through after eviction.
        if self.replay.cleanup_interval_secs < self.freshness.window_secs {
            return Err(EngineError::config(
                "replay.cleanup_interval_secs",
                format!(
                    "must be >= freshness.window_secs ({} < {})",
                    self.replay.cleanup_interval_secs, self.freshness.window_secs
                ),
            ));
        }

        Ok(())
    }
}

// ============================================
// Sections
// ============================================

/// Freshness-window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshnessConfig {
    /// Maximum tolerated `|now - timestamp|` in seconds (inclusive).
    pub window_secs: u64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self { window_secs: 30 }
    }
}

/// Replay-tracker bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Capacity of the nonce set before eviction kicks in.
    pub max_entries: usize,
    /// Entries older than this are eligible for removal (seconds).
    pub cleanup_interval_secs: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            cleanup_interval_secs: 300,
        }
    }
}

impl ReplayConfig {
    /// Cleanup interval as a `Duration`.
    #[must_use]
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Per-client rate-limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum interval between operations from one client (ms).
    pub min_interval_ms: u64,
    /// Idle clients are forgotten after this long (seconds).
    pub retention_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 10,
            retention_secs: 60,
        }
    }
}

impl RateLimitConfig {
    /// Minimum interval as a `Duration`.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Retention window as a `Duration`.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

/// In-flight operation cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Maximum simultaneous symmetric-crypto operations.
    pub max_in_flight: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_in_flight: 100 }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.freshness.window_secs, 30);
        assert_eq!(config.replay.max_entries, 10_000);
        assert_eq!(config.rate_limit.min_interval_ms, 10);
        assert_eq!(config.concurrency.max_in_flight, 100);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = EngineConfig::from_str(
            r"
            [freshness]
            window_secs = 45

            [replay]
            max_entries = 500
            cleanup_interval_secs = 120
            ",
        )
        .unwrap();
        assert_eq!(config.freshness.window_secs, 45);
        assert_eq!(config.replay.max_entries, 500);
        // Untouched sections keep their defaults.
        assert_eq!(config.concurrency.max_in_flight, 100);
    }

    #[test]
    fn test_zero_security_parameter_rejected() {
        let result = EngineConfig::from_str(
            r"
            [concurrency]
            max_in_flight = 0
            ",
        );
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn test_cleanup_shorter_than_window_rejected() {
        let result = EngineConfig::from_str(
            r"
            [freshness]
            window_secs = 60

            [replay]
            max_entries = 1000
            cleanup_interval_secs = 30
            ",
        );
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn test_cleanup_equal_to_window_accepted() {
        EngineConfig::from_str(
            r"
            [freshness]
            window_secs = 60

            [replay]
            max_entries = 1000
            cleanup_interval_secs = 60
            ",
        )
        .unwrap();
    }

    #[test]
    fn test_garbage_toml_rejected() {
        assert!(EngineConfig::from_str("not toml at all [[[").is_err());
    }
}
