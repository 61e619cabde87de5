// crates/docex-core/src/lib.rs
// ============================================================================
// Module: Docex Core
// Description: Tenant isolation domain model, resolvers, and runtime gates.
// Purpose: Provide deterministic isolation-boundary resolution and the
//          orchestration primitives built on top of it.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! `docex-core` is the pure heart of the Docex tenant isolation engine. It
//! defines validated identifiers, the tenant record model, deterministic
//! resolvers that map a tenant identifier plus configuration onto a concrete
//! isolation boundary or storage key, backend-agnostic registry interfaces,
//! and the runtime orchestration (bootstrap, provisioning, request gating).
//!
//! Everything in this crate is deterministic and free of I/O; persistence is
//! delegated to [`interfaces`] implementations. Security posture: tenant
//! identifiers and user contexts are untrusted inputs and are validated at
//! every entry point; missing or invalid tenant context always fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::identifiers::BasketId;
pub use crate::core::identifiers::DocumentId;
pub use crate::core::identifiers::MAX_TENANT_ID_LENGTH;
pub use crate::core::identifiers::SYSTEM_TENANT_ID;
pub use crate::core::identifiers::TenantId;
pub use crate::core::identifiers::TenantIdError;
pub use crate::core::identifiers::UserContext;
pub use crate::core::path::PathError;
pub use crate::core::path::build_basket_path;
pub use crate::core::path::build_document_path;
pub use crate::core::path::sanitize_slug;
pub use crate::core::prefix::PrefixCache;
pub use crate::core::prefix::StoragePrefixConfig;
pub use crate::core::prefix::resolve_storage_prefix;
pub use crate::core::resolve::ResolveError;
pub use crate::core::resolve::TENANT_ID_PLACEHOLDER;
pub use crate::core::resolve::resolve_boundary;
pub use crate::core::resolve::resolve_database_path;
pub use crate::core::resolve::resolve_schema_name;
pub use crate::core::resolve::system_boundary;
pub use crate::core::tenant::DEFAULT_SYSTEM_BOUNDARY;
pub use crate::core::tenant::IsolationBoundary;
pub use crate::core::tenant::IsolationStrategy;
pub use crate::core::tenant::TenancySettings;
pub use crate::core::tenant::Tenant;
pub use crate::core::tenant::TenantStatus;
pub use crate::interfaces::BoundaryError;
pub use crate::interfaces::IsolationBackend;
pub use crate::interfaces::RegistryError;
pub use crate::interfaces::TenantFilter;
pub use crate::interfaces::TenantRegistry;
pub use crate::runtime::bootstrap::BootstrapError;
pub use crate::runtime::bootstrap::BootstrapOutcome;
pub use crate::runtime::bootstrap::initialize;
pub use crate::runtime::gate::GateError;
pub use crate::runtime::gate::ResolvedTenant;
pub use crate::runtime::gate::RuntimeGate;
pub use crate::runtime::gate::TenantAccess;
pub use crate::runtime::provisioner::CreateTenantRequest;
pub use crate::runtime::provisioner::ProvisionError;
pub use crate::runtime::provisioner::ProvisioningState;
pub use crate::runtime::provisioner::TenantProvisioner;
