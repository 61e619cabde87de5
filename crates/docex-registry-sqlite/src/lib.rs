// crates/docex-registry-sqlite/src/lib.rs
// ============================================================================
// Module: Docex SQLite Registry
// Description: SQLite-backed tenant registry and isolation backend.
// Purpose: Persist the tenant registry inside the bootstrap boundary and
//          create per-tenant database-file boundaries idempotently.
// Dependencies: docex-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate provides the durable half of the isolation engine: a
//! [`SqliteTenantRegistry`] whose single `tenants` table lives only inside
//! the bootstrap isolation boundary, and a [`SqliteIsolationBackend`] that
//! materializes isolation boundaries as SQLite database files. Registry
//! loads fail closed on rows that no longer decode; uniqueness is enforced
//! by constraints, never by check-then-insert.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod backend;
mod registry;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use backend::SqliteIsolationBackend;
pub use registry::SqliteJournalMode;
pub use registry::SqliteRegistryConfig;
pub use registry::SqliteRegistryError;
pub use registry::SqliteSyncMode;
pub use registry::SqliteTenantRegistry;
