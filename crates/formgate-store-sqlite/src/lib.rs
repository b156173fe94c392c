// crates/formgate-store-sqlite/src/lib.rs
// ============================================================================
// Module: Formgate SQLite Store Library
// Description: Durable template and submission persistence backed by SQLite.
// Purpose: Expose the SQLite-backed store and its configuration.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! This crate implements the Formgate store interfaces on a single `SQLite`
//! database with WAL journaling and fail-closed schema versioning. One store
//! serves templates, submissions, and the service directory; every mutating
//! operation runs inside a transaction to narrow the read-then-write races
//! documented in the core.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteFormStore;
pub use store::SqliteJournalMode;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
