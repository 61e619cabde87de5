// crates/docex-core/src/core/identifiers.rs
// ============================================================================
// Module: Docex Identifiers
// Description: Canonical identifiers for tenants, baskets, and documents.
// Purpose: Provide strongly typed, serializable identifiers with validation
//          enforced at construction boundaries.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout the Docex
//! isolation engine. Tenant identifiers carry a restricted character set and
//! length bound enforced at construction; basket and document identifiers are
//! opaque strings validated only where they enter path construction.
//!
//! Security posture: identifier strings arrive from untrusted callers and
//! must pass through [`TenantId::parse`] before reaching any resolver.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted tenant identifier length in bytes.
pub const MAX_TENANT_ID_LENGTH: usize = 63;

/// Reserved identifier of the bootstrap (system) tenant.
///
/// No business tenant may use this value; the runtime gate rejects it and
/// the provisioner refuses to create it.
pub const SYSTEM_TENANT_ID: &str = "_docex_system_";

// ============================================================================
// SECTION: Tenant Identifier
// ============================================================================

/// Tenant identifier validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TenantIdError {
    /// Tenant identifier was empty.
    #[error("tenant id must not be empty")]
    Empty,
    /// Tenant identifier exceeded the length bound.
    #[error("tenant id exceeds {MAX_TENANT_ID_LENGTH} bytes: {actual} bytes")]
    TooLong {
        /// Actual identifier length in bytes.
        actual: usize,
    },
    /// Tenant identifier contained a character outside `[A-Za-z0-9_-]`.
    #[error("tenant id contains invalid character: {character:?}")]
    InvalidCharacter {
        /// First offending character.
        character: char,
    },
}

/// Validated tenant identifier.
///
/// # Invariants
/// - Non-empty, at most [`MAX_TENANT_ID_LENGTH`] bytes.
/// - Characters restricted to `[A-Za-z0-9_-]`.
/// - Constructed only through [`TenantId::parse`] or [`TenantId::system`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Parses and validates a tenant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TenantIdError`] when the identifier is empty, too long, or
    /// contains a character outside the permitted set.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TenantIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TenantIdError::Empty);
        }
        if raw.len() > MAX_TENANT_ID_LENGTH {
            return Err(TenantIdError::TooLong {
                actual: raw.len(),
            });
        }
        if let Some(character) =
            raw.chars().find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
        {
            return Err(TenantIdError::InvalidCharacter {
                character,
            });
        }
        Ok(Self(raw))
    }

    /// Returns the reserved bootstrap (system) tenant identifier.
    #[must_use]
    pub fn system() -> Self {
        Self(SYSTEM_TENANT_ID.to_string())
    }

    /// Returns true when this identifier is the reserved system sentinel.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_TENANT_ID
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for TenantId {
    type Error = TenantIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

// ============================================================================
// SECTION: Basket and Document Identifiers
// ============================================================================

/// Basket identifier within a tenant.
///
/// # Invariants
/// - Opaque UTF-8 string; validated for non-emptiness at path build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketId(String);

impl BasketId {
    /// Creates a new basket identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BasketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BasketId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BasketId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Document identifier within a basket.
///
/// # Invariants
/// - Opaque UTF-8 string; validated for non-emptiness at path build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new document identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: User Context
// ============================================================================

/// Caller-supplied request context consumed by the runtime gate.
///
/// # Invariants
/// - Contents are untrusted; `tenant_id` is re-validated by the gate before
///   any resolver sees it.
/// - The engine never issues or verifies these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Authenticated user identifier (opaque to the engine).
    pub user_id: String,
    /// Tenant identifier claimed by the caller, if any.
    pub tenant_id: Option<String>,
    /// Role labels carried for downstream authorization layers.
    pub roles: Vec<String>,
}

impl UserContext {
    /// Creates a context scoped to a tenant.
    #[must_use]
    pub fn for_tenant(user_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: Some(tenant_id.into()),
            roles: Vec::new(),
        }
    }
}
