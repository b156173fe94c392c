// crates/formgate-core/src/core/time.rs
// ============================================================================
// Module: Formgate Time Model
// Description: Canonical timestamp representation for templates and submissions.
// Purpose: Provide deterministic, caller-supplied time values across Formgate records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Formgate uses explicit time values embedded in requests and records to keep
//! validation and deduplication deterministic. The core never reads wall-clock
//! time directly; hosts (stores, transports, tests) must supply timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Formgate records, in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads
///   wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns this timestamp shifted backwards by `window_ms` milliseconds.
    ///
    /// Saturates at the minimum representable instant instead of wrapping.
    #[must_use]
    pub const fn rewind_ms(self, window_ms: u64) -> Self {
        let window = if window_ms > i64::MAX as u64 { i64::MAX } else { window_ms as i64 };
        Self(self.0.saturating_sub(window))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
