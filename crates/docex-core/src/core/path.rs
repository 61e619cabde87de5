// crates/docex-core/src/core/path.rs
// ============================================================================
// Module: Docex Path Builder
// Description: Deterministic storage key construction for baskets/documents.
// Purpose: Compose the tenant storage prefix with sanitized name hints and
//          identifier suffixes into stable object keys.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Storage keys are recomputed from identifiers plus live configuration on
//! every call rather than trusted from a possibly-stale stored value. Given
//! identical inputs and configuration the output is byte-identical. Name
//! hints are reduced to bounded slugs for human readability; uniqueness is
//! carried by the identifier suffix, never by the slug.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::BasketId;
use crate::core::identifiers::DocumentId;
use crate::core::identifiers::TenantId;
use crate::core::prefix::StoragePrefixConfig;
use crate::core::prefix::resolve_storage_prefix;
use crate::core::resolve::ResolveError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum slug length in bytes after sanitization.
const MAX_SLUG_LENGTH: usize = 40;
/// Identifier suffix length used to guarantee key uniqueness.
const ID_SUFFIX_LENGTH: usize = 8;
/// Maximum accepted file extension length in bytes.
const MAX_EXTENSION_LENGTH: usize = 16;
/// Slug used when a name hint sanitizes to nothing.
const EMPTY_SLUG: &str = "item";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Path construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A required identifier was empty.
    #[error("invalid identifier: {field} must not be empty")]
    InvalidIdentifier {
        /// Name of the offending identifier field.
        field: &'static str,
    },
    /// File extension was empty, overlong, or non-alphanumeric.
    #[error("invalid file extension: {extension:?}")]
    InvalidExtension {
        /// Offending extension string.
        extension: String,
    },
    /// Prefix resolution failed.
    #[error("prefix resolution failed: {0}")]
    Prefix(#[from] ResolveError),
}

// ============================================================================
// SECTION: Sanitization
// ============================================================================

/// Reduces a human-readable name hint to a bounded slug.
///
/// Permitted characters are `[a-z0-9_-]` after lowercasing; every other run
/// of characters collapses to a single `-`. The result is truncated to
/// [`MAX_SLUG_LENGTH`] bytes and never empty.
#[must_use]
pub fn sanitize_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len().min(MAX_SLUG_LENGTH));
    let mut pending_separator = false;
    for ch in name.chars() {
        let lowered = ch.to_ascii_lowercase();
        if lowered.is_ascii_alphanumeric() || lowered == '-' || lowered == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(lowered);
        } else {
            pending_separator = true;
        }
        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }
    slug.truncate(MAX_SLUG_LENGTH);
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns the trailing identifier suffix carrying key uniqueness.
fn id_suffix(id: &str) -> &str {
    let boundary = id
        .char_indices()
        .rev()
        .take(ID_SUFFIX_LENGTH)
        .last()
        .map_or(0, |(index, _)| index);
    &id[boundary ..]
}

/// Validates a file extension.
fn validate_extension(ext: &str) -> Result<(), PathError> {
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LENGTH
        && ext.chars().all(|ch| ch.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(PathError::InvalidExtension {
            extension: ext.to_string(),
        })
    }
}

/// Requires a non-empty identifier value.
fn require_non_empty(value: &str, field: &'static str) -> Result<(), PathError> {
    if value.is_empty() {
        Err(PathError::InvalidIdentifier {
            field,
        })
    } else {
        Ok(())
    }
}

// ============================================================================
// SECTION: Path Construction
// ============================================================================

/// Builds the storage key prefix for a basket.
///
/// Layout: `{prefix}{basket_slug}_{basket_id_suffix}/`.
///
/// # Errors
///
/// Returns [`PathError`] when the basket identifier is empty or prefix
/// resolution fails.
pub fn build_basket_path(
    config: &StoragePrefixConfig,
    tenant_id: &TenantId,
    basket_id: &BasketId,
    basket_name: &str,
) -> Result<String, PathError> {
    require_non_empty(basket_id.as_str(), "basket_id")?;
    let prefix = resolve_storage_prefix(config, tenant_id)?;
    let slug = sanitize_slug(basket_name);
    let suffix = id_suffix(basket_id.as_str());
    Ok(format!("{prefix}{slug}_{suffix}/"))
}

/// Builds the full storage key for a document.
///
/// Layout:
/// `{prefix}{basket_slug}_{basket_id_suffix}/{document_slug}_{document_id_suffix}.{ext}`.
///
/// # Errors
///
/// Returns [`PathError`] when an identifier is empty, the extension is
/// invalid, or prefix resolution fails.
pub fn build_document_path(
    config: &StoragePrefixConfig,
    tenant_id: &TenantId,
    basket_id: &BasketId,
    document_id: &DocumentId,
    basket_name: &str,
    document_name: &str,
    ext: &str,
) -> Result<String, PathError> {
    require_non_empty(document_id.as_str(), "document_id")?;
    validate_extension(ext)?;
    let basket_path = build_basket_path(config, tenant_id, basket_id, basket_name)?;
    let slug = sanitize_slug(document_name);
    let suffix = id_suffix(document_id.as_str());
    Ok(format!("{basket_path}{slug}_{suffix}.{ext}"))
}
