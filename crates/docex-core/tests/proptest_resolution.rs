// crates/docex-core/tests/proptest_resolution.rs
// ============================================================================
// Module: Resolution Property-Based Tests
// Description: Property tests for resolver and sanitizer invariants.
// ============================================================================
//! Property-based tests covering identifier validation, slug bounds, and
//! resolution determinism across wide input ranges.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use docex_core::MAX_TENANT_ID_LENGTH;
use docex_core::StoragePrefixConfig;
use docex_core::TenantId;
use docex_core::resolve_schema_name;
use docex_core::resolve_storage_prefix;
use docex_core::sanitize_slug;
use proptest::prelude::*;

proptest! {
    #[test]
    fn tenant_id_parse_never_panics(raw in ".*") {
        let _ = TenantId::parse(raw.as_str());
    }

    #[test]
    fn accepted_tenant_ids_round_trip(raw in "[A-Za-z0-9_-]{1,63}") {
        let parsed = TenantId::parse(raw.as_str()).expect("within the accepted shape");
        prop_assert_eq!(parsed.as_str(), raw.as_str());
        prop_assert!(parsed.as_str().len() <= MAX_TENANT_ID_LENGTH);
    }

    #[test]
    fn sanitized_slugs_are_bounded_and_clean(name in ".*") {
        let slug = sanitize_slug(&name);
        prop_assert!(!slug.is_empty());
        prop_assert!(slug.len() <= 40);
        prop_assert!(!slug.ends_with('-'));
        let clean = slug.chars().all(|ch| {
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_'
        });
        prop_assert!(clean);
    }

    #[test]
    fn slug_sanitization_is_deterministic(name in ".*") {
        prop_assert_eq!(sanitize_slug(&name), sanitize_slug(&name));
    }

    #[test]
    fn schema_resolution_is_deterministic(raw in "[A-Za-z0-9_-]{1,63}") {
        let tenant = TenantId::parse(raw.as_str()).expect("valid id");
        let first = resolve_schema_name(&tenant, "tenant_{tenant_id}").expect("resolves");
        let second = resolve_schema_name(&tenant, "tenant_{tenant_id}").expect("resolves");
        prop_assert_eq!(first.as_str(), second.as_str());
        let expected = format!("tenant_{raw}");
        prop_assert_eq!(first.as_str(), expected.as_str());
    }

    #[test]
    fn storage_prefixes_are_slash_terminated_and_tenant_scoped(
        raw in "[A-Za-z0-9_-]{1,63}",
    ) {
        let tenant = TenantId::parse(raw.as_str()).expect("valid id");
        let prefix = resolve_storage_prefix(&StoragePrefixConfig::default(), &tenant)
            .expect("resolves");
        prop_assert!(prefix.ends_with('/'));
        prop_assert!(prefix.contains(raw.as_str()));
    }
}
