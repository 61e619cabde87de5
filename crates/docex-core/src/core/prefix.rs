// crates/docex-core/src/core/prefix.rs
// ============================================================================
// Module: Docex Storage Prefix Resolution
// Description: Object-storage key prefix resolution for tenants.
// Purpose: Derive the per-tenant storage prefix from validated configuration
//          and expose an explicitly invalidatable in-process cache.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The storage prefix places every tenant's objects under
//! `{app_name}/{environment}/tenant_{tenant_id}/`. The tenant segment comes
//! from a single-placeholder template so deployments can adjust the naming
//! without code changes. Resolution is pure; the optional [`PrefixCache`] is
//! keyed by `(config_version, tenant_id)` and nothing else, so bumping the
//! version on a configuration reload invalidates every cached entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TenantId;
use crate::core::resolve::ResolveError;
use crate::core::resolve::TENANT_ID_PLACEHOLDER;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Validated storage prefix configuration.
///
/// # Invariants
/// - `app_name` and `environment` are non-empty and contain no `/`.
/// - `tenant_segment_template` contains `{tenant_id}` exactly once; enforced
///   at configuration load and re-checked defensively on resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoragePrefixConfig {
    /// Application name forming the first key segment.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Environment prefix forming the second key segment.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Tenant segment template, e.g. `tenant_{tenant_id}`.
    #[serde(default = "default_tenant_segment_template")]
    pub tenant_segment_template: String,
}

/// Returns the default application name segment.
fn default_app_name() -> String {
    "docex".to_string()
}

/// Returns the default environment segment.
fn default_environment() -> String {
    "dev".to_string()
}

/// Returns the default tenant segment template.
fn default_tenant_segment_template() -> String {
    "tenant_{tenant_id}".to_string()
}

impl Default for StoragePrefixConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            environment: default_environment(),
            tenant_segment_template: default_tenant_segment_template(),
        }
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the object-storage key prefix for a tenant.
///
/// The result always ends with `/` so downstream path construction appends
/// segments without separator bookkeeping.
///
/// # Errors
///
/// Returns [`ResolveError`] when the tenant segment template is malformed or
/// the tenant identifier fails re-validation.
pub fn resolve_storage_prefix(
    config: &StoragePrefixConfig,
    tenant_id: &TenantId,
) -> Result<String, ResolveError> {
    let occurrences = config.tenant_segment_template.matches(TENANT_ID_PLACEHOLDER).count();
    if occurrences != 1 {
        return Err(ResolveError::InvalidTemplate {
            template: config.tenant_segment_template.clone(),
            occurrences,
        });
    }
    TenantId::parse(tenant_id.as_str())?;
    let tenant_segment =
        config.tenant_segment_template.replace(TENANT_ID_PLACEHOLDER, tenant_id.as_str());
    Ok(format!("{}/{}/{}/", config.app_name, config.environment, tenant_segment))
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// In-process prefix cache keyed by configuration version and tenant.
///
/// # Invariants
/// - Entries are keyed by `(config_version, tenant_id)` only.
/// - [`PrefixCache::invalidate`] bumps the version, orphaning all prior
///   entries; stale keys are dropped eagerly.
#[derive(Debug, Default)]
pub struct PrefixCache {
    /// Current configuration version; bumped on invalidation.
    version: Mutex<u64>,
    /// Cached prefixes keyed by `(version, tenant_id)`.
    entries: Mutex<HashMap<(u64, TenantId), String>>,
}

impl PrefixCache {
    /// Creates an empty cache at version zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every cached entry by bumping the configuration version.
    pub fn invalidate(&self) {
        if let Ok(mut version) = self.version.lock() {
            *version = version.saturating_add(1);
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Resolves a prefix through the cache.
    ///
    /// On a miss the prefix is computed via [`resolve_storage_prefix`] and
    /// stored under the current version.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] from the underlying resolution on a miss.
    pub fn resolve(
        &self,
        config: &StoragePrefixConfig,
        tenant_id: &TenantId,
    ) -> Result<String, ResolveError> {
        let version = self.version.lock().map_or(0, |guard| *guard);
        let key = (version, tenant_id.clone());
        if let Ok(entries) = self.entries.lock()
            && let Some(prefix) = entries.get(&key)
        {
            return Ok(prefix.clone());
        }
        let prefix = resolve_storage_prefix(config, tenant_id)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, prefix.clone());
        }
        Ok(prefix)
    }
}
