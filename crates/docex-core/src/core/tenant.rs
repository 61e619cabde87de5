// crates/docex-core/src/core/tenant.rs
// ============================================================================
// Module: Docex Tenant Model
// Description: Tenant records, lifecycle status, and isolation boundaries.
// Purpose: Define the persisted tenant shape and the transient boundary type
//          shared by resolvers, registry, and runtime orchestration.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Tenant`] is the persisted record of a provisioned isolation boundary.
//! The boundary itself ([`IsolationBoundary`]) is transient: it is recomputed
//! from the tenant identifier plus configuration on every use and never
//! cached across process restarts. The stored `isolation_ref` column exists
//! for audit only and must always equal a fresh recomputation; a mismatch is
//! a corruption signal, not a resolvable state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TenantId;

// ============================================================================
// SECTION: Isolation Strategy
// ============================================================================

/// Physical isolation mechanism selected by configuration.
///
/// # Invariants
/// - Values map 1:1 to their configuration labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IsolationStrategy {
    /// One relational schema per tenant.
    #[default]
    Schema,
    /// One embedded database file per tenant.
    DatabaseFile,
}

impl IsolationStrategy {
    /// Returns the stable storage label for the strategy.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::DatabaseFile => "database_file",
        }
    }

    /// Parses a stored strategy label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "schema" => Some(Self::Schema),
            "database_file" => Some(Self::DatabaseFile),
            _ => None,
        }
    }
}

impl fmt::Display for IsolationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Isolation Boundary
// ============================================================================

/// Concrete isolation boundary computed for a tenant.
///
/// # Invariants
/// - Transient: recomputed on demand, never persisted as its own record or
///   passed across process boundaries as a cached value.
/// - [`IsolationBoundary::reference`] is the canonical audit string stored
///   redundantly on the tenant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationBoundary {
    /// Relational schema name.
    Schema(String),
    /// Embedded database file path.
    DatabaseFile(PathBuf),
}

impl IsolationBoundary {
    /// Returns the isolation strategy this boundary belongs to.
    #[must_use]
    pub const fn strategy(&self) -> IsolationStrategy {
        match self {
            Self::Schema(_) => IsolationStrategy::Schema,
            Self::DatabaseFile(_) => IsolationStrategy::DatabaseFile,
        }
    }

    /// Returns the canonical audit reference for the boundary.
    #[must_use]
    pub fn reference(&self) -> String {
        match self {
            Self::Schema(name) => name.clone(),
            Self::DatabaseFile(path) => path.display().to_string(),
        }
    }
}

// ============================================================================
// SECTION: Tenant Status
// ============================================================================

/// Tenant lifecycle status.
///
/// # Invariants
/// - The only supported transition is `Active -> Disabled`; physical
///   deletion is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    /// Tenant accepts reads and writes.
    #[default]
    Active,
    /// Tenant is soft-disabled; the gate rejects all operations.
    Disabled,
}

impl TenantStatus {
    /// Returns the stable storage label for the status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }

    /// Parses a stored status label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "active" => Some(Self::Active),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Tenant Record
// ============================================================================

/// Persisted tenant registry record.
///
/// # Invariants
/// - Exactly one row carries `is_system = true`; its identifier is the
///   reserved sentinel no business tenant may use.
/// - `isolation_ref` is re-derivable from `tenant_id` plus configuration and
///   stored for audit only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Immutable, unique tenant identifier.
    pub tenant_id: TenantId,
    /// Human-readable label; mutable.
    pub display_name: String,
    /// True only for the bootstrap tenant row.
    pub is_system: bool,
    /// Isolation mechanism the tenant was provisioned under.
    pub isolation_kind: IsolationStrategy,
    /// Resolved boundary reference stored redundantly for audit.
    pub isolation_ref: String,
    /// Operator or principal that requested creation.
    pub created_by: String,
    /// Creation timestamp in unix milliseconds.
    pub created_at: i64,
    /// Lifecycle status.
    pub status: TenantStatus,
}

// ============================================================================
// SECTION: Tenancy Settings
// ============================================================================

/// Default bootstrap boundary literal.
pub const DEFAULT_SYSTEM_BOUNDARY: &str = "docex_system";

/// Validated tenancy settings consumed by resolvers and runtime components.
///
/// # Invariants
/// - Templates contain the `{tenant_id}` placeholder exactly once; this is
///   enforced at configuration load time and re-checked defensively by the
///   resolvers.
/// - `system_boundary` is a fixed literal, never template-derived, so the
///   bootstrap boundary can never collide with a business tenant's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenancySettings {
    /// Whether multi-tenancy is enforced by the runtime gate.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Selected isolation strategy.
    #[serde(default)]
    pub strategy: IsolationStrategy,
    /// Schema name template, e.g. `tenant_{tenant_id}`.
    #[serde(default = "default_schema_template")]
    pub schema_template: String,
    /// Database file path template, e.g. `storage/tenant_{tenant_id}/docex.db`.
    #[serde(default = "default_database_path_template")]
    pub database_path_template: String,
    /// Bootstrap boundary literal (schema name or directory name).
    #[serde(default = "default_system_boundary")]
    pub system_boundary: String,
}

/// Returns the default multi-tenancy flag.
const fn default_enabled() -> bool {
    true
}

/// Returns the default schema template.
fn default_schema_template() -> String {
    "tenant_{tenant_id}".to_string()
}

/// Returns the default database path template.
fn default_database_path_template() -> String {
    "storage/tenant_{tenant_id}/docex.db".to_string()
}

/// Returns the default bootstrap boundary literal.
fn default_system_boundary() -> String {
    DEFAULT_SYSTEM_BOUNDARY.to_string()
}

impl Default for TenancySettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            strategy: IsolationStrategy::default(),
            schema_template: default_schema_template(),
            database_path_template: default_database_path_template(),
            system_boundary: default_system_boundary(),
        }
    }
}
