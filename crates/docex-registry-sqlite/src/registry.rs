// crates/docex-registry-sqlite/src/registry.rs
// ============================================================================
// Module: SQLite Tenant Registry
// Description: Durable TenantRegistry backed by SQLite.
// Purpose: Persist tenant rows inside the bootstrap boundary with
//          constraint-enforced uniqueness and fail-closed row decoding.
// Dependencies: docex-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! The registry is a single `tenants` table plus a `store_meta` version row,
//! created inside the bootstrap boundary's database file. A partial unique
//! index guarantees at most one system row at the storage layer, mirroring
//! the registry invariant. Duplicate inserts surface as constraint
//! violations mapped to [`RegistryError::AlreadyExists`]; rows that fail to
//! decode surface as corruption, never as silently skipped entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use docex_core::IsolationBoundary;
use docex_core::IsolationStrategy;
use docex_core::RegistryError;
use docex_core::Tenant;
use docex_core::TenantFilter;
use docex_core::TenantId;
use docex_core::TenantRegistry;
use docex_core::TenantStatus;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

use crate::backend::boundary_file_path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the registry.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` registry and isolation backend.
///
/// # Invariants
/// - `data_dir` is the root under which every boundary file is created.
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteRegistryConfig {
    /// Root directory for registry and boundary storage.
    pub data_dir: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` registry errors.
///
/// # Invariants
/// - Error messages avoid embedding raw row payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteRegistryError {
    /// Registry I/O error.
    #[error("sqlite registry io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite registry db error: {0}")]
    Db(String),
    /// Registry schema version mismatch.
    #[error("sqlite registry version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid registry data or configuration.
    #[error("sqlite registry invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteRegistryError> for RegistryError {
    fn from(error: SqliteRegistryError) -> Self {
        match error {
            SqliteRegistryError::Io(message) => Self::Io(message),
            SqliteRegistryError::Db(message) => Self::Db(message),
            SqliteRegistryError::VersionMismatch(message) | SqliteRegistryError::Invalid(message) => {
                Self::Invalid(message)
            }
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// `SQLite`-backed tenant registry.
///
/// # Invariants
/// - The `tenants` table exists only inside the bootstrap boundary database;
///   business boundaries never carry it.
/// - `SQLite` connection access is serialized through a mutex.
/// - At most one row has `is_system = 1`, enforced by a partial unique index.
#[derive(Debug)]
pub struct SqliteTenantRegistry {
    /// Shared connection guarded by a mutex.
    connection: Mutex<Connection>,
}

impl SqliteTenantRegistry {
    /// Opens the registry inside the bootstrap boundary database.
    ///
    /// Creates the registry table set if absent; an existing database with an
    /// unsupported schema version is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteRegistryError`] when the database cannot be opened or
    /// initialized.
    pub fn open(
        config: &SqliteRegistryConfig,
        bootstrap_boundary: &IsolationBoundary,
    ) -> Result<Self, SqliteRegistryError> {
        let path = boundary_file_path(&config.data_dir, bootstrap_boundary)
            .map_err(|err| SqliteRegistryError::Invalid(err.to_string()))?;
        validate_registry_path(&path)?;
        ensure_parent_dir(&path)?;
        let mut connection = open_connection(&path, config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Runs a closure against the locked connection.
    fn with_connection<T>(
        &self,
        operation: impl FnOnce(&Connection) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| RegistryError::Io("registry mutex poisoned".to_string()))?;
        operation(&guard)
    }
}

impl TenantRegistry for SqliteTenantRegistry {
    fn insert(&self, tenant: &Tenant) -> Result<(), RegistryError> {
        self.with_connection(|connection| {
            let mut stmt = connection
                .prepare_cached(
                    "INSERT INTO tenants (
                        tenant_id,
                        display_name,
                        is_system,
                        isolation_kind,
                        isolation_ref,
                        created_by,
                        created_at,
                        status
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            let result = stmt.execute(params![
                tenant.tenant_id.as_str(),
                tenant.display_name.as_str(),
                i64::from(tenant.is_system),
                tenant.isolation_kind.label(),
                tenant.isolation_ref.as_str(),
                tenant.created_by.as_str(),
                tenant.created_at,
                tenant.status.label(),
            ]);
            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(RegistryError::AlreadyExists {
                        tenant_id: tenant.tenant_id.as_str().to_string(),
                    })
                }
                Err(err) => Err(RegistryError::Db(err.to_string())),
            }
        })
    }

    fn get(&self, tenant_id: &TenantId) -> Result<Tenant, RegistryError> {
        self.with_connection(|connection| {
            let mut stmt = connection
                .prepare_cached(
                    "SELECT tenant_id, display_name, is_system, isolation_kind, isolation_ref,
                            created_by, created_at, status
                     FROM tenants WHERE tenant_id = ?1",
                )
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            let row = stmt
                .query_row(params![tenant_id.as_str()], decode_row)
                .optional()
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            match row {
                Some(decoded) => decoded,
                None => Err(RegistryError::NotFound {
                    tenant_id: tenant_id.as_str().to_string(),
                }),
            }
        })
    }

    fn list(&self, filter: &TenantFilter) -> Result<Vec<Tenant>, RegistryError> {
        self.with_connection(|connection| {
            let mut stmt = connection
                .prepare_cached(
                    "SELECT tenant_id, display_name, is_system, isolation_kind, isolation_ref,
                            created_by, created_at, status
                     FROM tenants
                     WHERE (?1 OR is_system = 0)
                       AND (?2 IS NULL OR status = ?2)
                     ORDER BY tenant_id",
                )
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            let status_label = filter.status.map(TenantStatus::label);
            let rows = stmt
                .query_map(params![filter.include_system, status_label], decode_row)
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            let mut tenants = Vec::new();
            for row in rows {
                tenants.push(row.map_err(|err| RegistryError::Db(err.to_string()))??);
            }
            Ok(tenants)
        })
    }

    fn set_status(&self, tenant_id: &TenantId, status: TenantStatus) -> Result<(), RegistryError> {
        self.with_connection(|connection| {
            let mut stmt = connection
                .prepare_cached("UPDATE tenants SET status = ?2 WHERE tenant_id = ?1")
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            let updated = stmt
                .execute(params![tenant_id.as_str(), status.label()])
                .map_err(|err| RegistryError::Db(err.to_string()))?;
            if updated == 0 {
                Err(RegistryError::NotFound {
                    tenant_id: tenant_id.as_str().to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn readiness(&self) -> Result<(), RegistryError> {
        self.with_connection(|connection| {
            connection
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|err| RegistryError::Db(err.to_string()))
        })
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Decodes a tenant row, deferring integrity failures to the caller.
///
/// The inner result keeps `rusqlite` column errors separate from domain
/// decoding failures so corruption is reported as such.
fn decode_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Tenant, RegistryError>> {
    let tenant_id: String = row.get(0)?;
    let display_name: String = row.get(1)?;
    let is_system: i64 = row.get(2)?;
    let isolation_kind: String = row.get(3)?;
    let isolation_ref: String = row.get(4)?;
    let created_by: String = row.get(5)?;
    let created_at: i64 = row.get(6)?;
    let status: String = row.get(7)?;
    Ok(build_tenant(
        tenant_id,
        display_name,
        is_system,
        isolation_kind,
        isolation_ref,
        created_by,
        created_at,
        status,
    ))
}

/// Builds a [`Tenant`] from stored column values, failing closed on rows
/// that no longer decode.
#[allow(clippy::too_many_arguments, reason = "Column list mirrors the table shape.")]
fn build_tenant(
    tenant_id: String,
    display_name: String,
    is_system: i64,
    isolation_kind: String,
    isolation_ref: String,
    created_by: String,
    created_at: i64,
    status: String,
) -> Result<Tenant, RegistryError> {
    let tenant_id = TenantId::parse(tenant_id)
        .map_err(|err| RegistryError::Corrupt(format!("stored tenant id invalid: {err}")))?;
    let isolation_kind = IsolationStrategy::from_label(&isolation_kind).ok_or_else(|| {
        RegistryError::Corrupt(format!("unknown isolation kind: {isolation_kind}"))
    })?;
    let status = TenantStatus::from_label(&status)
        .ok_or_else(|| RegistryError::Corrupt(format!("unknown tenant status: {status}")))?;
    Ok(Tenant {
        tenant_id,
        display_name,
        is_system: is_system != 0,
        isolation_kind,
        isolation_ref,
        created_by,
        created_at,
        status,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the registry exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteRegistryError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteRegistryError::Io(
            "registry path missing parent directory".to_string(),
        ));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteRegistryError::Io(err.to_string()))
}

/// Validates registry paths for safety limits.
fn validate_registry_path(path: &Path) -> Result<(), SqliteRegistryError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteRegistryError::Invalid(
            "registry path must not be empty".to_string(),
        ));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteRegistryError::Invalid(
            "registry path exceeds length limit".to_string(),
        ));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteRegistryError::Invalid(
                "registry path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteRegistryError::Invalid(
            "registry path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(
    path: &Path,
    config: &SqliteRegistryConfig,
) -> Result<Connection, SqliteRegistryError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(path, flags)
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the registry schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteRegistryError> {
    let tx = connection.transaction().map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS tenants (
                    tenant_id TEXT NOT NULL PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    is_system INTEGER NOT NULL DEFAULT 0,
                    isolation_kind TEXT NOT NULL,
                    isolation_ref TEXT NOT NULL,
                    created_by TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    status TEXT NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_tenants_single_system
                    ON tenants (is_system) WHERE is_system = 1;
                CREATE INDEX IF NOT EXISTS idx_tenants_status
                    ON tenants (status, tenant_id);",
            )
            .map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteRegistryError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteRegistryError::Db(err.to_string()))?;
    Ok(())
}
