// crates/docex-core/tests/gate.rs
// ============================================================================
// Module: Runtime Gate Tests
// Description: Verifies fail-closed tenant context validation.
// ============================================================================
//! ## Overview
//! Ensures the runtime gate refuses missing, forbidden, unknown, disabled,
//! and inconsistent tenant contexts, and resolves a full scoped context for
//! valid ones.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use docex_core::GateError;
use docex_core::IsolationBoundary;
use docex_core::RegistryError;
use docex_core::RuntimeGate;
use docex_core::StoragePrefixConfig;
use docex_core::TenancySettings;
use docex_core::Tenant;
use docex_core::TenantAccess;
use docex_core::TenantFilter;
use docex_core::TenantId;
use docex_core::TenantRegistry;
use docex_core::TenantStatus;
use docex_core::UserContext;
use docex_core::resolve_boundary;
use docex_core::system_boundary;

/// In-memory registry used to drive the gate without a database.
#[derive(Default)]
struct MemoryRegistry {
    rows: Mutex<BTreeMap<String, Tenant>>,
}

impl MemoryRegistry {
    fn with_rows(rows: impl IntoIterator<Item = Tenant>) -> Self {
        let registry = Self::default();
        {
            let mut guard = registry.rows.lock().expect("lock");
            for row in rows {
                guard.insert(row.tenant_id.as_str().to_string(), row);
            }
        }
        registry
    }
}

impl TenantRegistry for MemoryRegistry {
    fn insert(&self, tenant: &Tenant) -> Result<(), RegistryError> {
        let mut guard = self.rows.lock().expect("lock");
        if guard.contains_key(tenant.tenant_id.as_str()) {
            return Err(RegistryError::AlreadyExists {
                tenant_id: tenant.tenant_id.as_str().to_string(),
            });
        }
        guard.insert(tenant.tenant_id.as_str().to_string(), tenant.clone());
        Ok(())
    }

    fn get(&self, tenant_id: &TenantId) -> Result<Tenant, RegistryError> {
        let guard = self.rows.lock().expect("lock");
        guard.get(tenant_id.as_str()).cloned().ok_or_else(|| RegistryError::NotFound {
            tenant_id: tenant_id.as_str().to_string(),
        })
    }

    fn list(&self, filter: &TenantFilter) -> Result<Vec<Tenant>, RegistryError> {
        let guard = self.rows.lock().expect("lock");
        Ok(guard
            .values()
            .filter(|row| filter.include_system || !row.is_system)
            .filter(|row| filter.status.is_none_or(|status| row.status == status))
            .cloned()
            .collect())
    }

    fn set_status(&self, tenant_id: &TenantId, status: TenantStatus) -> Result<(), RegistryError> {
        let mut guard = self.rows.lock().expect("lock");
        let row = guard.get_mut(tenant_id.as_str()).ok_or_else(|| RegistryError::NotFound {
            tenant_id: tenant_id.as_str().to_string(),
        })?;
        row.status = status;
        Ok(())
    }

    fn readiness(&self) -> Result<(), RegistryError> {
        Ok(())
    }
}

/// Builds a registry row consistent with the given settings.
fn provisioned_row(raw_id: &str, settings: &TenancySettings, status: TenantStatus) -> Tenant {
    let tenant_id = TenantId::parse(raw_id).expect("valid id");
    let boundary = resolve_boundary(&tenant_id, settings).expect("resolves");
    Tenant {
        tenant_id,
        display_name: raw_id.to_string(),
        is_system: false,
        isolation_kind: settings.strategy,
        isolation_ref: boundary.reference(),
        created_by: "test".to_string(),
        created_at: 0,
        status,
    }
}

#[test]
fn disabled_tenancy_passes_through_without_a_tenant() {
    let settings = TenancySettings {
        enabled: false,
        ..TenancySettings::default()
    };
    let prefix = StoragePrefixConfig::default();
    let registry = MemoryRegistry::default();
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext {
        user_id: "user-1".to_string(),
        tenant_id: None,
        roles: Vec::new(),
    };
    assert_eq!(gate.authorize(&ctx).expect("authorized"), TenantAccess::SingleTenant);
}

#[test]
fn missing_tenant_context_is_rejected_not_defaulted() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry =
        MemoryRegistry::with_rows([provisioned_row("acme", &settings, TenantStatus::Active)]);
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext {
        user_id: "user-1".to_string(),
        tenant_id: None,
        roles: Vec::new(),
    };
    assert_eq!(gate.authorize(&ctx).unwrap_err(), GateError::ContextRequired);
}

#[test]
fn system_sentinel_is_forbidden_for_business_operations() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry = MemoryRegistry::default();
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", TenantId::system().as_str());
    assert_eq!(gate.authorize(&ctx).unwrap_err(), GateError::SystemTenantForbidden);
}

#[test]
fn malformed_tenant_ids_fail_shape_validation() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry = MemoryRegistry::default();
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", "../escape");
    assert!(matches!(gate.authorize(&ctx).unwrap_err(), GateError::InvalidTenantId(_)));
}

#[test]
fn unknown_tenants_are_rejected() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry = MemoryRegistry::default();
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", "ghost");
    assert_eq!(
        gate.authorize(&ctx).unwrap_err(),
        GateError::NotFound {
            tenant_id: "ghost".to_string(),
        }
    );
}

#[test]
fn disabled_tenants_are_rejected() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry =
        MemoryRegistry::with_rows([provisioned_row("acme", &settings, TenantStatus::Disabled)]);
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", "acme");
    assert_eq!(
        gate.authorize(&ctx).unwrap_err(),
        GateError::Disabled {
            tenant_id: "acme".to_string(),
        }
    );
}

#[test]
fn stored_reference_mismatch_fails_closed() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let mut row = provisioned_row("acme", &settings, TenantStatus::Active);
    row.isolation_ref = "tenant_other".to_string();
    let registry = MemoryRegistry::with_rows([row]);
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", "acme");
    assert_eq!(
        gate.authorize(&ctx).unwrap_err(),
        GateError::Corrupt {
            tenant_id: "acme".to_string(),
            stored: "tenant_other".to_string(),
            computed: "tenant_acme".to_string(),
        }
    );
}

#[test]
fn valid_context_resolves_a_full_scoped_tenant() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry =
        MemoryRegistry::with_rows([provisioned_row("acme", &settings, TenantStatus::Active)]);
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", "acme");
    let TenantAccess::Scoped(resolved) = gate.authorize(&ctx).expect("authorized") else {
        panic!("expected scoped access");
    };
    assert_eq!(resolved.tenant_id.as_str(), "acme");
    assert_eq!(resolved.boundary, IsolationBoundary::Schema("tenant_acme".to_string()));
    assert_eq!(resolved.storage_prefix, "docex/dev/tenant_acme/");
}

#[test]
fn scoped_boundary_never_equals_the_bootstrap_boundary() {
    let settings = TenancySettings::default();
    let prefix = StoragePrefixConfig::default();
    let registry =
        MemoryRegistry::with_rows([provisioned_row("acme", &settings, TenantStatus::Active)]);
    let gate = RuntimeGate::new(&registry, &settings, &prefix);

    let ctx = UserContext::for_tenant("user-1", "acme");
    let TenantAccess::Scoped(resolved) = gate.authorize(&ctx).expect("authorized") else {
        panic!("expected scoped access");
    };
    assert_ne!(resolved.boundary, system_boundary(&settings));
}
