// crates/docex-core/tests/path_builder.rs
// ============================================================================
// Module: Storage Path Builder Tests
// Description: Verifies prefix resolution, slug sanitization, and key layout.
// ============================================================================
//! ## Overview
//! Ensures storage prefixes and object keys are deterministic, tenant-scoped,
//! and bounded, and that the prefix cache honors explicit invalidation.

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

use docex_core::BasketId;
use docex_core::DocumentId;
use docex_core::PathError;
use docex_core::PrefixCache;
use docex_core::StoragePrefixConfig;
use docex_core::TenantId;
use docex_core::build_basket_path;
use docex_core::build_document_path;
use docex_core::resolve_storage_prefix;
use docex_core::sanitize_slug;

fn tenant(raw: &str) -> TenantId {
    TenantId::parse(raw).expect("valid tenant id")
}

#[test]
fn storage_prefix_layout_is_app_env_tenant() {
    let config = StoragePrefixConfig::default();
    let prefix = resolve_storage_prefix(&config, &tenant("acme")).expect("resolves");
    assert_eq!(prefix, "docex/dev/tenant_acme/");
}

#[test]
fn storage_prefix_reflects_configuration() {
    let config = StoragePrefixConfig {
        app_name: "vault".to_string(),
        environment: "prod".to_string(),
        tenant_segment_template: "t-{tenant_id}".to_string(),
    };
    let prefix = resolve_storage_prefix(&config, &tenant("beta")).expect("resolves");
    assert_eq!(prefix, "vault/prod/t-beta/");
}

#[test]
fn storage_prefix_rejects_malformed_segment_template() {
    let config = StoragePrefixConfig {
        tenant_segment_template: "tenants".to_string(),
        ..StoragePrefixConfig::default()
    };
    assert!(resolve_storage_prefix(&config, &tenant("acme")).is_err());
}

#[test]
fn slug_sanitization_lowercases_and_collapses_runs() {
    assert_eq!(sanitize_slug("Q3 Financial Report!"), "q3-financial-report");
    assert_eq!(sanitize_slug("Invoice  #42 / Final"), "invoice-42-final");
    assert_eq!(sanitize_slug("already-clean_name"), "already-clean_name");
}

#[test]
fn slug_sanitization_bounds_length_and_never_returns_empty() {
    let long = "x".repeat(200);
    let slug = sanitize_slug(&long);
    assert_eq!(slug.len(), 40);

    assert_eq!(sanitize_slug(""), "item");
    assert_eq!(sanitize_slug("!!! ??? ///"), "item");
    assert_eq!(sanitize_slug("\u{4f60}\u{597d}"), "item");
}

#[test]
fn slug_sanitization_strips_trailing_separators() {
    let slug = sanitize_slug("report ");
    assert_eq!(slug, "report");
    assert!(!sanitize_slug("a ".repeat(30).as_str()).ends_with('-'));
}

#[test]
fn basket_path_combines_prefix_slug_and_id_suffix() {
    let config = StoragePrefixConfig::default();
    let basket = BasketId::new("basket-12345678abcd");
    let path = build_basket_path(&config, &tenant("acme"), &basket, "Quarterly Reports")
        .expect("builds");
    assert_eq!(path, "docex/dev/tenant_acme/quarterly-reports_5678abcd/");
}

#[test]
fn document_path_nests_under_basket_path() {
    let config = StoragePrefixConfig::default();
    let basket = BasketId::new("basket-12345678abcd");
    let document = DocumentId::new("doc-00aa11bb22cc");
    let path = build_document_path(
        &config,
        &tenant("acme"),
        &basket,
        &document,
        "Quarterly Reports",
        "Q3 Summary",
        "pdf",
    )
    .expect("builds");
    assert_eq!(path, "docex/dev/tenant_acme/quarterly-reports_5678abcd/q3-summary_11bb22cc.pdf");
}

#[test]
fn path_construction_is_deterministic() {
    let config = StoragePrefixConfig::default();
    let basket = BasketId::new("basket-12345678abcd");
    let document = DocumentId::new("doc-00aa11bb22cc");
    let build = || {
        build_document_path(
            &config,
            &tenant("acme"),
            &basket,
            &document,
            "Reports",
            "Summary",
            "pdf",
        )
        .expect("builds")
    };
    assert_eq!(build(), build());
}

#[test]
fn short_identifiers_use_the_whole_id_as_suffix() {
    let config = StoragePrefixConfig::default();
    let basket = BasketId::new("b1");
    let path = build_basket_path(&config, &tenant("acme"), &basket, "Tiny").expect("builds");
    assert_eq!(path, "docex/dev/tenant_acme/tiny_b1/");
}

#[test]
fn empty_identifiers_are_rejected() {
    let config = StoragePrefixConfig::default();
    let error = build_basket_path(&config, &tenant("acme"), &BasketId::new(""), "Reports")
        .unwrap_err();
    assert_eq!(
        error,
        PathError::InvalidIdentifier {
            field: "basket_id",
        }
    );

    let error = build_document_path(
        &config,
        &tenant("acme"),
        &BasketId::new("basket-1"),
        &DocumentId::new(""),
        "Reports",
        "Summary",
        "pdf",
    )
    .unwrap_err();
    assert_eq!(
        error,
        PathError::InvalidIdentifier {
            field: "document_id",
        }
    );
}

#[test]
fn malformed_extensions_are_rejected() {
    let config = StoragePrefixConfig::default();
    for ext in ["", "t.xt", "p df", "x".repeat(17).as_str(), "pdf/"] {
        let result = build_document_path(
            &config,
            &tenant("acme"),
            &BasketId::new("basket-1"),
            &DocumentId::new("doc-1"),
            "Reports",
            "Summary",
            ext,
        );
        assert!(
            matches!(result, Err(PathError::InvalidExtension { .. })),
            "expected rejection for extension {ext:?}"
        );
    }
}

#[test]
fn distinct_tenants_never_share_a_prefix() {
    let config = StoragePrefixConfig::default();
    let prefix_a = resolve_storage_prefix(&config, &tenant("acme")).expect("resolves");
    let prefix_b = resolve_storage_prefix(&config, &tenant("beta")).expect("resolves");
    assert_ne!(prefix_a, prefix_b);
    assert!(!prefix_a.starts_with(&prefix_b));
    assert!(!prefix_b.starts_with(&prefix_a));
}

#[test]
fn prefix_cache_returns_stale_values_until_invalidated() {
    let cache = PrefixCache::new();
    let original = StoragePrefixConfig::default();
    let updated = StoragePrefixConfig {
        environment: "prod".to_string(),
        ..StoragePrefixConfig::default()
    };
    let id = tenant("acme");

    let first = cache.resolve(&original, &id).expect("resolves");
    assert_eq!(first, "docex/dev/tenant_acme/");

    // The cache keys on (version, tenant) only; a changed config without an
    // invalidation keeps serving the cached value.
    let stale = cache.resolve(&updated, &id).expect("resolves");
    assert_eq!(stale, first);

    cache.invalidate();
    let fresh = cache.resolve(&updated, &id).expect("resolves");
    assert_eq!(fresh, "docex/prod/tenant_acme/");
}
