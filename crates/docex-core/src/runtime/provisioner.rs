// crates/docex-core/src/runtime/provisioner.rs
// ============================================================================
// Module: Docex Tenant Provisioner
// Description: Stepwise creation of business tenant isolation boundaries.
// Purpose: Validate, resolve, physically create, and register new tenants
//          with idempotent, retry-safe steps.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! Provisioning walks a fixed state machine: `Requested -> ValidatingId ->
//! ComputingBoundary -> CreatingBoundary -> Registering -> Active`, with
//! failure reachable from any state. The flow is deliberately not wrapped in
//! a distributed transaction; boundary creation and registry insertion may
//! live in different storage systems. Correctness comes from idempotency:
//! boundary creation is create-if-not-exists and the registry's uniqueness
//! constraint picks exactly one winner among same-id racers. A failure after
//! the boundary exists but before registration surfaces as a distinguishable
//! partial-provisioning error so operators know a retry is safe and expected
//! to complete.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Instant;

use thiserror::Error;

use crate::core::identifiers::TenantId;
use crate::core::identifiers::TenantIdError;
use crate::core::resolve::ResolveError;
use crate::core::resolve::resolve_boundary;
use crate::core::tenant::Tenant;
use crate::core::tenant::TenancySettings;
use crate::core::tenant::TenantStatus;
use crate::interfaces::BoundaryError;
use crate::interfaces::IsolationBackend;
use crate::interfaces::RegistryError;
use crate::interfaces::TenantRegistry;
use crate::runtime::unix_millis;

// ============================================================================
// SECTION: State Machine
// ============================================================================

/// Provisioning state machine positions.
///
/// # Invariants
/// - States advance strictly forward; `Failed` is represented by the error
///   type carrying the state that was active when the failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// Request accepted, nothing validated yet.
    Requested,
    /// Identifier shape and reservation checks.
    ValidatingId,
    /// Deterministic boundary resolution.
    ComputingBoundary,
    /// Physical boundary creation.
    CreatingBoundary,
    /// Registry row insertion.
    Registering,
    /// Tenant fully provisioned.
    Active,
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Requested => "requested",
            Self::ValidatingId => "validating_id",
            Self::ComputingBoundary => "computing_boundary",
            Self::CreatingBoundary => "creating_boundary",
            Self::Registering => "registering",
            Self::Active => "active",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provisioning errors.
///
/// # Invariants
/// - `AlreadyExists` is an expected outcome of concurrent same-id requests.
/// - `Partial` means the physical boundary exists but registration did not
///   complete; retrying the same request is safe and will finish the flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// Requested identifier matches the reserved system pattern.
    #[error("tenant id is reserved for the system tenant: {tenant_id}")]
    ReservedTenantId {
        /// Rejected identifier.
        tenant_id: String,
    },
    /// Requested identifier failed shape validation.
    #[error("invalid tenant id: {0}")]
    InvalidTenantId(#[from] TenantIdError),
    /// A tenant with this identifier already exists.
    #[error("tenant already exists: {tenant_id}")]
    AlreadyExists {
        /// Conflicting identifier.
        tenant_id: String,
    },
    /// Boundary resolution failed (configuration error).
    #[error("boundary resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    /// Physical boundary creation failed before anything was registered.
    #[error("boundary creation failed: {0}")]
    Boundary(#[from] BoundaryError),
    /// Registry failure unrelated to the uniqueness conflict.
    #[error("registry operation failed in state {state}: {source}")]
    Registry {
        /// State active when the failure occurred.
        state: ProvisioningState,
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
    /// Boundary exists but registration did not complete; retry to finish.
    #[error("partial provisioning for {tenant_id} in state {state}: {reason}; retry is safe")]
    Partial {
        /// Tenant identifier being provisioned.
        tenant_id: String,
        /// State active when the failure occurred.
        state: ProvisioningState,
        /// Failure description.
        reason: String,
    },
    /// Caller-supplied deadline expired before the boundary was created.
    #[error("provisioning deadline exceeded in state {state}")]
    DeadlineExceeded {
        /// State active when the deadline expired.
        state: ProvisioningState,
    },
}

// ============================================================================
// SECTION: Request
// ============================================================================

/// Inputs for creating a business tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTenantRequest {
    /// Requested tenant identifier (validated during provisioning).
    pub tenant_id: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Operator or principal requesting creation.
    pub created_by: String,
}

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Orchestrates business tenant creation.
///
/// # Invariants
/// - Holds no mutable state between calls; safe for concurrent use across
///   distinct tenant identifiers.
/// - Same-id races resolve through the registry's uniqueness constraint,
///   never an application-level check-then-act.
pub struct TenantProvisioner<'a, R: TenantRegistry, B: IsolationBackend> {
    /// Tenant registry receiving the final row.
    registry: &'a R,
    /// Backend creating physical boundaries.
    backend: &'a B,
    /// Validated tenancy settings.
    tenancy: &'a TenancySettings,
}

impl<'a, R: TenantRegistry, B: IsolationBackend> TenantProvisioner<'a, R, B> {
    /// Creates a provisioner over the given registry and backend.
    #[must_use]
    pub const fn new(registry: &'a R, backend: &'a B, tenancy: &'a TenancySettings) -> Self {
        Self {
            registry,
            backend,
            tenancy,
        }
    }

    /// Creates a business tenant, honoring an optional deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] describing the failing state; see the
    /// variant docs for which failures are retryable.
    pub fn create_tenant(
        &self,
        request: &CreateTenantRequest,
        deadline: Option<Instant>,
    ) -> Result<Tenant, ProvisionError> {
        check_deadline(deadline, ProvisioningState::Requested)?;

        // ValidatingId
        let tenant_id = validate_tenant_id(&request.tenant_id)?;
        // Advisory pre-check only; the insert below is the race decider.
        match self.registry.get(&tenant_id) {
            Ok(_) => {
                return Err(ProvisionError::AlreadyExists {
                    tenant_id: tenant_id.as_str().to_string(),
                });
            }
            Err(RegistryError::NotFound {
                ..
            }) => {}
            Err(err) => {
                return Err(ProvisionError::Registry {
                    state: ProvisioningState::ValidatingId,
                    source: err,
                });
            }
        }
        check_deadline(deadline, ProvisioningState::ValidatingId)?;

        // ComputingBoundary
        let boundary = resolve_boundary(&tenant_id, self.tenancy)?;
        check_deadline(deadline, ProvisioningState::ComputingBoundary)?;

        // CreatingBoundary
        self.backend.ensure_boundary(&boundary)?;
        if deadline.is_some_and(|limit| Instant::now() >= limit) {
            // The boundary now exists; report a retryable partial state
            // instead of a plain deadline error.
            return Err(ProvisionError::Partial {
                tenant_id: tenant_id.as_str().to_string(),
                state: ProvisioningState::CreatingBoundary,
                reason: "deadline exceeded after boundary creation".to_string(),
            });
        }

        // Registering
        let row = Tenant {
            tenant_id: tenant_id.clone(),
            display_name: request.display_name.clone(),
            is_system: false,
            isolation_kind: self.tenancy.strategy,
            isolation_ref: boundary.reference(),
            created_by: request.created_by.clone(),
            created_at: unix_millis(),
            status: TenantStatus::Active,
        };
        match self.registry.insert(&row) {
            Ok(()) => Ok(row),
            Err(RegistryError::AlreadyExists {
                ..
            }) => Err(ProvisionError::AlreadyExists {
                tenant_id: tenant_id.as_str().to_string(),
            }),
            Err(err) => Err(ProvisionError::Partial {
                tenant_id: tenant_id.as_str().to_string(),
                state: ProvisioningState::Registering,
                reason: err.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates identifier shape and rejects the reserved sentinel.
fn validate_tenant_id(raw: &str) -> Result<TenantId, ProvisionError> {
    let tenant_id = TenantId::parse(raw)?;
    if tenant_id.is_system() {
        return Err(ProvisionError::ReservedTenantId {
            tenant_id: raw.to_string(),
        });
    }
    Ok(tenant_id)
}

/// Fails with `DeadlineExceeded` when the deadline has passed.
fn check_deadline(
    deadline: Option<Instant>,
    state: ProvisioningState,
) -> Result<(), ProvisionError> {
    if deadline.is_some_and(|limit| Instant::now() >= limit) {
        Err(ProvisionError::DeadlineExceeded {
            state,
        })
    } else {
        Ok(())
    }
}
