// crates/docex-core/tests/resolution.rs
// ============================================================================
// Module: Boundary Resolution Tests
// Description: Verifies deterministic boundary resolution behavior.
// ============================================================================
//! ## Overview
//! Ensures tenant identifier validation, template substitution, strategy
//! dispatch, and the fixed bootstrap boundary behave deterministically and
//! reject malformed inputs.

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

use std::path::PathBuf;

use docex_core::IsolationBoundary;
use docex_core::IsolationStrategy;
use docex_core::MAX_TENANT_ID_LENGTH;
use docex_core::ResolveError;
use docex_core::SYSTEM_TENANT_ID;
use docex_core::TenancySettings;
use docex_core::TenantId;
use docex_core::TenantIdError;
use docex_core::resolve_boundary;
use docex_core::resolve_database_path;
use docex_core::resolve_schema_name;
use docex_core::system_boundary;

#[test]
fn tenant_id_accepts_permitted_characters() {
    for raw in ["acme", "ACME-2", "tenant_01", "a", "A-b_9"] {
        let parsed = TenantId::parse(raw).expect("valid id");
        assert_eq!(parsed.as_str(), raw);
    }
}

#[test]
fn tenant_id_rejects_empty_overlong_and_invalid_characters() {
    assert_eq!(TenantId::parse("").unwrap_err(), TenantIdError::Empty);

    let overlong = "a".repeat(MAX_TENANT_ID_LENGTH + 1);
    assert_eq!(
        TenantId::parse(overlong.as_str()).unwrap_err(),
        TenantIdError::TooLong {
            actual: MAX_TENANT_ID_LENGTH + 1,
        }
    );

    for raw in ["a.b", "a/b", "a b", "a\\b", "..", "ac;me", "ac\u{e9}"] {
        assert!(
            matches!(TenantId::parse(raw), Err(TenantIdError::InvalidCharacter { .. })),
            "expected rejection for {raw:?}"
        );
    }
}

#[test]
fn tenant_id_at_length_bound_is_accepted() {
    let bound = "a".repeat(MAX_TENANT_ID_LENGTH);
    let parsed = TenantId::parse(bound.as_str()).expect("bound id");
    assert_eq!(parsed.as_str().len(), MAX_TENANT_ID_LENGTH);
}

#[test]
fn system_sentinel_is_recognized() {
    let system = TenantId::system();
    assert!(system.is_system());
    assert_eq!(system.as_str(), SYSTEM_TENANT_ID);

    let parsed = TenantId::parse(SYSTEM_TENANT_ID).expect("sentinel parses");
    assert!(parsed.is_system());

    let business = TenantId::parse("acme").expect("valid id");
    assert!(!business.is_system());
}

#[test]
fn schema_name_resolution_substitutes_tenant_id() {
    let tenant = TenantId::parse("acme").expect("valid id");
    let schema = resolve_schema_name(&tenant, "tenant_{tenant_id}").expect("resolves");
    assert_eq!(schema, "tenant_acme");
}

#[test]
fn database_path_resolution_substitutes_tenant_id() {
    let tenant = TenantId::parse("beta").expect("valid id");
    let path =
        resolve_database_path(&tenant, "storage/tenant_{tenant_id}/docex.db").expect("resolves");
    assert_eq!(path, PathBuf::from("storage/tenant_beta/docex.db"));
}

#[test]
fn resolution_is_deterministic_across_calls() {
    let tenant = TenantId::parse("acme-corp").expect("valid id");
    let first = resolve_schema_name(&tenant, "tenant_{tenant_id}").expect("resolves");
    let second = resolve_schema_name(&tenant, "tenant_{tenant_id}").expect("resolves");
    assert_eq!(first, second);
}

#[test]
fn template_without_placeholder_is_rejected() {
    let tenant = TenantId::parse("acme").expect("valid id");
    let error = resolve_schema_name(&tenant, "tenant_static").unwrap_err();
    assert_eq!(
        error,
        ResolveError::InvalidTemplate {
            template: "tenant_static".to_string(),
            occurrences: 0,
        }
    );
}

#[test]
fn template_with_repeated_placeholder_is_rejected() {
    let tenant = TenantId::parse("acme").expect("valid id");
    let error = resolve_schema_name(&tenant, "{tenant_id}_{tenant_id}").unwrap_err();
    assert_eq!(
        error,
        ResolveError::InvalidTemplate {
            template: "{tenant_id}_{tenant_id}".to_string(),
            occurrences: 2,
        }
    );
}

#[test]
fn boundary_resolution_follows_configured_strategy() {
    let tenant = TenantId::parse("acme").expect("valid id");

    let schema_settings = TenancySettings::default();
    let boundary = resolve_boundary(&tenant, &schema_settings).expect("resolves");
    assert_eq!(boundary, IsolationBoundary::Schema("tenant_acme".to_string()));
    assert_eq!(boundary.strategy(), IsolationStrategy::Schema);
    assert_eq!(boundary.reference(), "tenant_acme");

    let file_settings = TenancySettings {
        strategy: IsolationStrategy::DatabaseFile,
        ..TenancySettings::default()
    };
    let boundary = resolve_boundary(&tenant, &file_settings).expect("resolves");
    assert_eq!(
        boundary,
        IsolationBoundary::DatabaseFile(PathBuf::from("storage/tenant_acme/docex.db"))
    );
    assert_eq!(boundary.strategy(), IsolationStrategy::DatabaseFile);
}

#[test]
fn bootstrap_boundary_is_a_literal_not_a_template() {
    let settings = TenancySettings::default();
    let boundary = system_boundary(&settings);
    assert_eq!(boundary, IsolationBoundary::Schema("docex_system".to_string()));

    // Even a literal containing braces is taken verbatim.
    let odd = TenancySettings {
        system_boundary: "system_store".to_string(),
        strategy: IsolationStrategy::DatabaseFile,
        ..TenancySettings::default()
    };
    let boundary = system_boundary(&odd);
    assert_eq!(boundary, IsolationBoundary::DatabaseFile(PathBuf::from("system_store")));
}

#[test]
fn bootstrap_boundary_cannot_collide_with_business_boundaries() {
    let settings = TenancySettings::default();
    let bootstrap = system_boundary(&settings).reference();
    for raw in ["acme", "system", "docex", "docex-system"] {
        let tenant = TenantId::parse(raw).expect("valid id");
        let business = resolve_boundary(&tenant, &settings).expect("resolves").reference();
        assert_ne!(business, bootstrap);
    }
}
