// crates/docex-core/src/interfaces/mod.rs
// ============================================================================
// Module: Docex Interfaces
// Description: Backend-agnostic interfaces for registry and boundary storage.
// Purpose: Define the contract surfaces the runtime orchestration uses
//          without embedding backend-specific details.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the isolation engine integrates with persistent
//! storage without naming a backend. Implementations must be deterministic
//! where the contract requires it (`ensure_boundary` is create-if-not-exists
//! and safe to retry) and must fail closed on missing or invalid data.
//! Adding an isolation strategy means adding an [`IsolationBackend`]
//! implementation; call sites do not change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::TenantId;
use crate::core::tenant::IsolationBoundary;
use crate::core::tenant::Tenant;
use crate::core::tenant::TenantStatus;

// ============================================================================
// SECTION: Tenant Registry
// ============================================================================

/// Tenant registry errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `AlreadyExists` is an expected outcome of racing provisioning requests,
///   not a system fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A tenant row with the same identifier already exists.
    #[error("tenant already exists: {tenant_id}")]
    AlreadyExists {
        /// Conflicting tenant identifier.
        tenant_id: String,
    },
    /// No tenant row matches the identifier.
    #[error("tenant not found: {tenant_id}")]
    NotFound {
        /// Missing tenant identifier.
        tenant_id: String,
    },
    /// Registry I/O error.
    #[error("registry io error: {0}")]
    Io(String),
    /// Registry database error.
    #[error("registry db error: {0}")]
    Db(String),
    /// Registry row failed integrity decoding.
    #[error("registry corruption: {0}")]
    Corrupt(String),
    /// Invalid registry input or state.
    #[error("registry invalid data: {0}")]
    Invalid(String),
}

/// Filter for tenant listing.
///
/// # Invariants
/// - `None` fields match everything; the system row is excluded unless
///   explicitly requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantFilter {
    /// Restrict results to a lifecycle status.
    pub status: Option<TenantStatus>,
    /// Include the bootstrap (system) row in results.
    pub include_system: bool,
}

/// Persistent record of provisioned tenants.
///
/// The registry table lives only inside the bootstrap isolation boundary; it
/// is global system state, never tenant-scoped data.
pub trait TenantRegistry {
    /// Inserts a tenant row atomically.
    ///
    /// Duplicate identifiers must surface as [`RegistryError::AlreadyExists`]
    /// via a uniqueness constraint, never a pre-check-then-insert race.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on conflict or storage failure.
    fn insert(&self, tenant: &Tenant) -> Result<(), RegistryError>;

    /// Fetches a tenant row by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown identifiers; disabled
    /// tenants are returned with their stored status for the caller to
    /// interpret.
    fn get(&self, tenant_id: &TenantId) -> Result<Tenant, RegistryError>;

    /// Lists tenant rows matching a filter, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on storage failure.
    fn list(&self, filter: &TenantFilter) -> Result<Vec<Tenant>, RegistryError>;

    /// Updates a tenant's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no row matches.
    fn set_status(&self, tenant_id: &TenantId, status: TenantStatus) -> Result<(), RegistryError>;

    /// Verifies the registry can serve queries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the backing store is unreachable.
    fn readiness(&self) -> Result<(), RegistryError>;
}

// ============================================================================
// SECTION: Isolation Backend
// ============================================================================

/// Isolation boundary storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// Boundary storage I/O error.
    #[error("boundary io error: {0}")]
    Io(String),
    /// Boundary database error.
    #[error("boundary db error: {0}")]
    Db(String),
    /// Boundary reference was structurally invalid.
    #[error("boundary invalid: {0}")]
    Invalid(String),
}

/// Physical isolation boundary storage.
///
/// Implementations create schemas or database files plus the fixed per-tenant
/// table set. The tenant registry table is deliberately excluded from that
/// set: it exists only inside the bootstrap boundary.
pub trait IsolationBackend {
    /// Creates the boundary and its table set if absent.
    ///
    /// Idempotent: repeated calls for the same boundary succeed without
    /// modifying existing data, which makes partial provisioning retryable.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] on storage failure.
    fn ensure_boundary(&self, boundary: &IsolationBoundary) -> Result<(), BoundaryError>;

    /// Reports whether the boundary already exists.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when existence cannot be determined.
    fn boundary_exists(&self, boundary: &IsolationBoundary) -> Result<bool, BoundaryError>;

    /// Verifies the backend can reach its storage.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] when storage is unreachable.
    fn readiness(&self) -> Result<(), BoundaryError>;
}
