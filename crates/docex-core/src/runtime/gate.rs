// crates/docex-core/src/runtime/gate.rs
// ============================================================================
// Module: Docex Runtime Gate
// Description: Per-request tenant context validation and resolution.
// Purpose: Refuse any tenant-scoped operation lacking a valid, non-system
//          tenant context when multi-tenancy is enabled.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! The gate sits in front of every storage- or database-accessing code path.
//! With multi-tenancy disabled it passes through; with it enabled, a missing
//! tenant context is a hard failure that never defaults to the bootstrap
//! tenant, the system sentinel is forbidden for business operations, and
//! unknown or disabled tenants are rejected with distinct errors. There is no
//! implicit tenant inference from environment variables, globals, or
//! last-used caches; the context arrives as an explicit parameter.
//!
//! Authorization also recomputes the tenant's isolation boundary and compares
//! it against the stored audit reference. A mismatch means the registry row
//! and the live configuration disagree; the gate fails closed rather than
//! guessing which side is right.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::TenantId;
use crate::core::identifiers::TenantIdError;
use crate::core::identifiers::UserContext;
use crate::core::prefix::StoragePrefixConfig;
use crate::core::prefix::resolve_storage_prefix;
use crate::core::resolve::ResolveError;
use crate::core::resolve::resolve_boundary;
use crate::core::tenant::IsolationBoundary;
use crate::core::tenant::TenancySettings;
use crate::core::tenant::TenantStatus;
use crate::interfaces::RegistryError;
use crate::interfaces::TenantRegistry;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Runtime gate errors.
///
/// # Invariants
/// - All variants are hard failures; the gate never degrades to a default
///   tenant or best-effort mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Multi-tenancy is enabled but the context carries no tenant id.
    #[error("tenant context required: operation carries no tenant id")]
    ContextRequired,
    /// The context names the reserved system tenant.
    #[error("system tenant may not serve business operations")]
    SystemTenantForbidden,
    /// The context's tenant id failed shape validation.
    #[error("invalid tenant id in context: {0}")]
    InvalidTenantId(#[from] TenantIdError),
    /// No registered tenant matches the context.
    #[error("tenant not found: {tenant_id}")]
    NotFound {
        /// Unknown tenant identifier.
        tenant_id: String,
    },
    /// The tenant exists but is disabled.
    #[error("tenant disabled: {tenant_id}")]
    Disabled {
        /// Disabled tenant identifier.
        tenant_id: String,
    },
    /// Stored isolation reference disagrees with a fresh recomputation.
    #[error("isolation reference mismatch for {tenant_id}: stored {stored}, computed {computed}")]
    Corrupt {
        /// Affected tenant identifier.
        tenant_id: String,
        /// Reference stored on the registry row.
        stored: String,
        /// Freshly recomputed reference.
        computed: String,
    },
    /// Boundary or prefix resolution failed (configuration error).
    #[error("resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    /// Registry lookup failed.
    #[error("registry lookup failed: {0}")]
    Registry(RegistryError),
}

// ============================================================================
// SECTION: Resolved Tenant
// ============================================================================

/// Fully validated tenant context returned by the gate.
///
/// # Invariants
/// - `boundary` and `storage_prefix` are recomputed per authorization, never
///   carried over from a previous request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTenant {
    /// Validated tenant identifier.
    pub tenant_id: TenantId,
    /// Recomputed isolation boundary for database access.
    pub boundary: IsolationBoundary,
    /// Recomputed object-storage key prefix.
    pub storage_prefix: String,
}

/// Gate outcome for an authorized operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantAccess {
    /// Multi-tenancy disabled; no tenant scoping applies.
    SingleTenant,
    /// Operation scoped to a validated tenant.
    Scoped(ResolvedTenant),
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Per-request tenant validation gate.
///
/// # Invariants
/// - Reads the registry on every authorization; callers may cache the result
///   within a single request but not across requests.
pub struct RuntimeGate<'a, R: TenantRegistry> {
    /// Registry consulted for tenant existence and status.
    registry: &'a R,
    /// Validated tenancy settings.
    tenancy: &'a TenancySettings,
    /// Validated storage prefix configuration.
    prefix: &'a StoragePrefixConfig,
}

impl<'a, R: TenantRegistry> RuntimeGate<'a, R> {
    /// Creates a gate over the given registry and configuration.
    #[must_use]
    pub const fn new(
        registry: &'a R,
        tenancy: &'a TenancySettings,
        prefix: &'a StoragePrefixConfig,
    ) -> Self {
        Self {
            registry,
            tenancy,
            prefix,
        }
    }

    /// Authorizes a tenant-scoped operation.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the context is missing, forbidden,
    /// unknown, disabled, or inconsistent with configuration.
    pub fn authorize(&self, ctx: &UserContext) -> Result<TenantAccess, GateError> {
        if !self.tenancy.enabled {
            return Ok(TenantAccess::SingleTenant);
        }
        let Some(raw_tenant_id) = ctx.tenant_id.as_deref() else {
            return Err(GateError::ContextRequired);
        };
        let tenant_id = TenantId::parse(raw_tenant_id)?;
        if tenant_id.is_system() {
            return Err(GateError::SystemTenantForbidden);
        }
        let record = self.registry.get(&tenant_id).map_err(|err| match err {
            RegistryError::NotFound {
                tenant_id,
            } => GateError::NotFound {
                tenant_id,
            },
            other => GateError::Registry(other),
        })?;
        if record.status == TenantStatus::Disabled {
            return Err(GateError::Disabled {
                tenant_id: tenant_id.as_str().to_string(),
            });
        }
        let boundary = resolve_boundary(&tenant_id, self.tenancy)?;
        let computed = boundary.reference();
        if computed != record.isolation_ref {
            return Err(GateError::Corrupt {
                tenant_id: tenant_id.as_str().to_string(),
                stored: record.isolation_ref,
                computed,
            });
        }
        let storage_prefix = resolve_storage_prefix(self.prefix, &tenant_id)?;
        Ok(TenantAccess::Scoped(ResolvedTenant {
            tenant_id,
            boundary,
            storage_prefix,
        }))
    }
}
