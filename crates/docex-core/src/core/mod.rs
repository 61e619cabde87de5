// crates/docex-core/src/core/mod.rs
// ============================================================================
// Module: Docex Core Domain
// Description: Identifiers, tenant records, and pure resolution functions.
// Purpose: Group the deterministic, I/O-free building blocks of the engine.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The `core` module holds the domain vocabulary of the isolation engine:
//! validated identifiers, the persisted tenant record shape, and the pure
//! resolvers that derive isolation boundaries and storage keys. None of the
//! functions here perform I/O or consult ambient state.

/// Validated identifiers and caller-supplied context.
pub mod identifiers;
/// Storage key path construction from identifiers and name hints.
pub mod path;
/// Object-storage prefix resolution and its version-keyed cache.
pub mod prefix;
/// Isolation boundary resolution from tenant id plus templates.
pub mod resolve;
/// Tenant record model and isolation boundary types.
pub mod tenant;
