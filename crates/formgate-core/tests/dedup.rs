// crates/formgate-core/tests/dedup.rs
// ============================================================================
// Module: Deduplication Policy Tests
// Description: Tests for the time-windowed duplicate-submission policy.
// Purpose: Ensure the window blocks repeats and releases after it elapses.
// Dependencies: formgate-core
// ============================================================================
//! ## Overview
//! Exercises `DedupPolicy` cutoff arithmetic and blocking decisions.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use formgate_core::DEFAULT_DEDUP_WINDOW_MS;
use formgate_core::DedupPolicy;
use formgate_core::Timestamp;

// ============================================================================
// SECTION: Window Arithmetic
// ============================================================================

/// Verifies the default policy uses the five-minute window.
#[test]
fn default_window_is_five_minutes() {
    assert_eq!(DedupPolicy::default().window_ms(), 5 * 60 * 1000);
    assert_eq!(DEFAULT_DEDUP_WINDOW_MS, 300_000);
}

/// Verifies the cutoff rewinds by exactly the window length.
#[test]
fn cutoff_rewinds_by_window() {
    let policy = DedupPolicy::new(60_000);
    let now = Timestamp::from_unix_millis(1_000_000);
    assert_eq!(policy.cutoff(now), Timestamp::from_unix_millis(940_000));
}

/// Verifies the cutoff saturates rather than wrapping near the epoch floor.
#[test]
fn cutoff_saturates_near_floor() {
    let policy = DedupPolicy::new(u64::MAX);
    let now = Timestamp::from_unix_millis(0);
    assert_eq!(policy.cutoff(now), Timestamp::from_unix_millis(i64::MIN));
}

// ============================================================================
// SECTION: Blocking Decisions
// ============================================================================

/// Verifies a prior submission inside the window blocks.
#[test]
fn prior_inside_window_blocks() {
    let policy = DedupPolicy::new(300_000);
    let now = Timestamp::from_unix_millis(1_000_000);
    let previous = Timestamp::from_unix_millis(900_000);
    assert!(policy.blocks(Some(previous), now));
}

/// Verifies a prior submission exactly at the cutoff still blocks.
#[test]
fn prior_at_cutoff_blocks() {
    let policy = DedupPolicy::new(300_000);
    let now = Timestamp::from_unix_millis(1_000_000);
    assert!(policy.blocks(Some(policy.cutoff(now)), now));
}

/// Verifies a prior submission older than the window does not block.
#[test]
fn prior_outside_window_allows() {
    let policy = DedupPolicy::new(300_000);
    let now = Timestamp::from_unix_millis(1_000_000);
    let previous = Timestamp::from_unix_millis(699_999);
    assert!(!policy.blocks(Some(previous), now));
}

/// Verifies the absence of a prior submission never blocks.
#[test]
fn no_prior_submission_allows() {
    let policy = DedupPolicy::default();
    assert!(!policy.blocks(None, Timestamp::from_unix_millis(1_000_000)));
}
