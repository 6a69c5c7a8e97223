// crates/ruleflow-core/src/core/time.rs
// ============================================================================
// Module: Ruleflow Time Model
// Description: Unix-millisecond timestamps for audit and notification records.
// Purpose: Give engine records a stable, comparable time value.
// Dependencies: serde, std
// ============================================================================

//! ## Overview
//! Audit entries and notification events are stamped with unix-epoch
//! millisecond timestamps. The pure evaluator never reads the clock; the
//! engine shell converts a host-supplied [`std::time::SystemTime`], and
//! audit queries filter on the resulting ordering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Unix-epoch millisecond timestamp carried by engine records.
///
/// # Invariants
/// - Serializes as a bare integer for stable audit payloads.
/// - Ordering follows the wall clock; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Converts a system time, saturating outside the representable range.
    ///
    /// Times before the unix epoch clamp to zero.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        let millis = time.duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis());
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn unix_millis(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
