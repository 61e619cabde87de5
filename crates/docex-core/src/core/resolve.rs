// crates/docex-core/src/core/resolve.rs
// ============================================================================
// Module: Docex Boundary Resolution
// Description: Deterministic isolation boundary resolution from templates.
// Purpose: Map a tenant identifier plus a configured template onto a schema
//          name or database file path without I/O or ambient state.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Boundary resolution is pure string substitution: a template containing the
//! `{tenant_id}` placeholder exactly once is combined with a validated tenant
//! identifier. Zero or multiple placeholder occurrences is a configuration
//! error and is never silently tolerated. Identical inputs always produce
//! identical outputs across calls and process restarts; there is no
//! randomness, no clock, and no filesystem access here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::core::identifiers::TenantId;
use crate::core::identifiers::TenantIdError;
use crate::core::tenant::IsolationBoundary;
use crate::core::tenant::IsolationStrategy;
use crate::core::tenant::TenancySettings;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder token substituted with the tenant identifier.
pub const TENANT_ID_PLACEHOLDER: &str = "{tenant_id}";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Boundary resolution errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Template errors indicate misconfiguration and are fatal to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Template did not contain the placeholder exactly once.
    #[error(
        "template must contain `{TENANT_ID_PLACEHOLDER}` exactly once, found {occurrences}: \
         {template}"
    )]
    InvalidTemplate {
        /// Offending template string.
        template: String,
        /// Number of placeholder occurrences found.
        occurrences: usize,
    },
    /// Tenant identifier failed defensive re-validation.
    #[error("invalid tenant id: {0}")]
    InvalidTenantId(#[from] TenantIdError),
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Validates that `template` carries the placeholder exactly once.
fn validate_template(template: &str) -> Result<(), ResolveError> {
    let occurrences = template.matches(TENANT_ID_PLACEHOLDER).count();
    if occurrences == 1 {
        Ok(())
    } else {
        Err(ResolveError::InvalidTemplate {
            template: template.to_string(),
            occurrences,
        })
    }
}

/// Substitutes the tenant identifier into a validated template.
///
/// The identifier is re-validated defensively even though callers are
/// expected to hold an already-parsed [`TenantId`].
fn substitute(tenant_id: &TenantId, template: &str) -> Result<String, ResolveError> {
    validate_template(template)?;
    TenantId::parse(tenant_id.as_str())?;
    Ok(template.replace(TENANT_ID_PLACEHOLDER, tenant_id.as_str()))
}

/// Resolves the relational schema name for a tenant.
///
/// # Errors
///
/// Returns [`ResolveError`] when the template is malformed or the tenant
/// identifier fails re-validation.
pub fn resolve_schema_name(tenant_id: &TenantId, template: &str) -> Result<String, ResolveError> {
    substitute(tenant_id, template)
}

/// Resolves the embedded database file path for a tenant.
///
/// # Errors
///
/// Returns [`ResolveError`] when the template is malformed or the tenant
/// identifier fails re-validation.
pub fn resolve_database_path(
    tenant_id: &TenantId,
    template: &str,
) -> Result<PathBuf, ResolveError> {
    substitute(tenant_id, template).map(PathBuf::from)
}

/// Resolves the isolation boundary for a tenant under the configured strategy.
///
/// # Errors
///
/// Returns [`ResolveError`] when the selected template is malformed or the
/// tenant identifier fails re-validation.
pub fn resolve_boundary(
    tenant_id: &TenantId,
    tenancy: &TenancySettings,
) -> Result<IsolationBoundary, ResolveError> {
    match tenancy.strategy {
        IsolationStrategy::Schema => {
            resolve_schema_name(tenant_id, &tenancy.schema_template).map(IsolationBoundary::Schema)
        }
        IsolationStrategy::DatabaseFile => {
            resolve_database_path(tenant_id, &tenancy.database_path_template)
                .map(IsolationBoundary::DatabaseFile)
        }
    }
}

/// Returns the bootstrap tenant's fixed boundary.
///
/// The bootstrap boundary is a configured literal, never a template
/// substitution, so the system tenant's address can never collide with a
/// business tenant's derived boundary.
#[must_use]
pub fn system_boundary(tenancy: &TenancySettings) -> IsolationBoundary {
    match tenancy.strategy {
        IsolationStrategy::Schema => IsolationBoundary::Schema(tenancy.system_boundary.clone()),
        IsolationStrategy::DatabaseFile => {
            IsolationBoundary::DatabaseFile(PathBuf::from(&tenancy.system_boundary))
        }
    }
}
