// crates/docex-core/src/runtime/bootstrap.rs
// ============================================================================
// Module: Docex Bootstrap Manager
// Description: One-time, idempotent creation of the system tenant.
// Purpose: Bring up the bootstrap isolation boundary, the tenant registry,
//          and the single system tenant row.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! Bootstrap runs a fixed sequence of individually idempotent steps: verify
//! storage connectivity, ensure the bootstrap boundary exists, and insert the
//! system tenant row if absent. Any step may fail transiently; re-running
//! [`initialize`] is always safe and completes whatever remains. A second run
//! against an initialized system is a no-op success, never an error.
//!
//! The bootstrap boundary name is a configured literal, not a template
//! substitution, so the system tenant is never address-derived like business
//! tenants are.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::TenantId;
use crate::core::resolve::system_boundary;
use crate::core::tenant::Tenant;
use crate::core::tenant::TenancySettings;
use crate::core::tenant::TenantStatus;
use crate::interfaces::BoundaryError;
use crate::interfaces::IsolationBackend;
use crate::interfaces::RegistryError;
use crate::interfaces::TenantRegistry;
use crate::runtime::unix_millis;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Bootstrap errors.
///
/// # Invariants
/// - Every failure leaves the system in a state where re-running
///   [`initialize`] is safe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// Storage connectivity check failed.
    #[error("bootstrap connectivity check failed: {0}")]
    Connectivity(String),
    /// Bootstrap boundary creation failed.
    #[error("bootstrap boundary creation failed: {0}")]
    Boundary(#[from] BoundaryError),
    /// System tenant registration failed.
    #[error("system tenant registration failed: {0}")]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The system tenant row was created by this run.
    Initialized,
    /// The system tenant row already existed; nothing changed.
    AlreadyInitialized,
}

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Initializes the system tenant and its isolation boundary.
///
/// Steps, in order, each individually idempotent:
/// 1. Verify registry and backend connectivity.
/// 2. Ensure the bootstrap boundary exists (create-if-not-exists).
/// 3. Insert the system tenant row if absent.
///
/// # Errors
///
/// Returns [`BootstrapError`] when any step fails; re-running is safe and
/// completes the remaining steps.
pub fn initialize<R: TenantRegistry, B: IsolationBackend>(
    registry: &R,
    backend: &B,
    tenancy: &TenancySettings,
) -> Result<BootstrapOutcome, BootstrapError> {
    backend.readiness().map_err(|err| BootstrapError::Connectivity(err.to_string()))?;
    registry.readiness().map_err(|err| BootstrapError::Connectivity(err.to_string()))?;

    let boundary = system_boundary(tenancy);
    backend.ensure_boundary(&boundary)?;

    let system_id = TenantId::system();
    match registry.get(&system_id) {
        Ok(existing) if existing.is_system => return Ok(BootstrapOutcome::AlreadyInitialized),
        Ok(_) => {
            return Err(BootstrapError::Registry(RegistryError::Corrupt(
                "system tenant row exists without is_system flag".to_string(),
            )));
        }
        Err(RegistryError::NotFound {
            ..
        }) => {}
        Err(err) => return Err(BootstrapError::Registry(err)),
    }

    let row = Tenant {
        tenant_id: system_id,
        display_name: "Docex System".to_string(),
        is_system: true,
        isolation_kind: tenancy.strategy,
        isolation_ref: boundary.reference(),
        created_by: "bootstrap".to_string(),
        created_at: unix_millis(),
        status: TenantStatus::Active,
    };
    match registry.insert(&row) {
        // A concurrent bootstrap won the insert; the outcome is the same.
        Err(RegistryError::AlreadyExists {
            ..
        }) => Ok(BootstrapOutcome::AlreadyInitialized),
        Err(err) => Err(BootstrapError::Registry(err)),
        Ok(()) => Ok(BootstrapOutcome::Initialized),
    }
}
