// crates/docex-registry-sqlite/src/backend.rs
// ============================================================================
// Module: SQLite Isolation Backend
// Description: Physical boundary creation as SQLite database files.
// Purpose: Materialize schema-name and database-file boundaries under one
//          data directory with idempotent create-if-not-exists semantics.
// Dependencies: docex-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! `SQLite` has no `CREATE SCHEMA`; the engine-local analog of a relational
//! schema is a named database file. A [`docex_core::IsolationBoundary`] maps
//! onto the data directory as `<data_dir>/<schema_name>.db` for the schema
//! strategy and `<data_dir>/<relative_path>` for the database-file strategy.
//! Boundary creation installs the fixed per-tenant table set: baskets,
//! documents, and a boundary meta row. The tenant registry table is
//! deliberately absent from that set: it is global system state living only
//! in the bootstrap boundary.
//!
//! Every operation here is idempotent, which is what makes partial
//! provisioning retryable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use docex_core::BoundaryError;
use docex_core::IsolationBackend;
use docex_core::IsolationBoundary;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::registry::SqliteRegistryConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Boundary table-set version recorded in each boundary database.
const BOUNDARY_VERSION: i64 = 1;
/// Maximum accepted schema name length in bytes.
const MAX_SCHEMA_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Boundary Path Mapping
// ============================================================================

/// Maps an isolation boundary onto a database file path under `data_dir`.
///
/// Schema boundaries become `<data_dir>/<name>.db`; database-file boundaries
/// are joined relative to `data_dir`. Absolute paths and parent-directory
/// components are rejected so no boundary can escape the data directory.
///
/// # Errors
///
/// Returns [`BoundaryError::Invalid`] for unsafe names or paths.
pub(crate) fn boundary_file_path(
    data_dir: &Path,
    boundary: &IsolationBoundary,
) -> Result<PathBuf, BoundaryError> {
    match boundary {
        IsolationBoundary::Schema(name) => {
            validate_schema_name(name)?;
            Ok(data_dir.join(format!("{name}.db")))
        }
        IsolationBoundary::DatabaseFile(path) => {
            validate_relative_path(path)?;
            Ok(data_dir.join(path))
        }
    }
}

/// Validates a schema name for the file-backed schema analog.
fn validate_schema_name(name: &str) -> Result<(), BoundaryError> {
    if name.is_empty() {
        return Err(BoundaryError::Invalid("schema name must not be empty".to_string()));
    }
    if name.len() > MAX_SCHEMA_NAME_LENGTH {
        return Err(BoundaryError::Invalid("schema name exceeds length limit".to_string()));
    }
    if let Some(character) =
        name.chars().find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
    {
        return Err(BoundaryError::Invalid(format!(
            "schema name contains invalid character: {character:?}"
        )));
    }
    Ok(())
}

/// Validates a database-file boundary path stays inside the data directory.
fn validate_relative_path(path: &Path) -> Result<(), BoundaryError> {
    if path.as_os_str().is_empty() {
        return Err(BoundaryError::Invalid("boundary path must not be empty".to_string()));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::ParentDir => {
                return Err(BoundaryError::Invalid(
                    "boundary path must not contain parent components".to_string(),
                ));
            }
            _ => {
                return Err(BoundaryError::Invalid(
                    "boundary path must be relative".to_string(),
                ));
            }
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// `SQLite`-backed isolation boundary storage.
///
/// # Invariants
/// - All boundaries live under the configured data directory.
/// - `ensure_boundary` is idempotent; existing data is never modified.
pub struct SqliteIsolationBackend {
    /// Root directory for boundary storage.
    data_dir: PathBuf,
    /// Busy timeout in milliseconds for boundary connections.
    busy_timeout_ms: u64,
}

impl SqliteIsolationBackend {
    /// Creates a backend rooted at the configured data directory.
    #[must_use]
    pub fn new(config: &SqliteRegistryConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            busy_timeout_ms: config.busy_timeout_ms,
        }
    }

    /// Returns the database file path a boundary maps onto.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Invalid`] for unsafe names or paths.
    pub fn database_path(&self, boundary: &IsolationBoundary) -> Result<PathBuf, BoundaryError> {
        boundary_file_path(&self.data_dir, boundary)
    }

    /// Opens a boundary database connection.
    fn open_boundary(&self, path: &Path) -> Result<Connection, BoundaryError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(path, flags)
            .map_err(|err| BoundaryError::Db(err.to_string()))?;
        // Timeout first so concurrent creators wait instead of failing busy.
        connection
            .busy_timeout(std::time::Duration::from_millis(self.busy_timeout_ms))
            .map_err(|err| BoundaryError::Db(err.to_string()))?;
        connection
            .execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = wal;")
            .map_err(|err| BoundaryError::Db(err.to_string()))?;
        Ok(connection)
    }
}

impl IsolationBackend for SqliteIsolationBackend {
    fn ensure_boundary(&self, boundary: &IsolationBoundary) -> Result<(), BoundaryError> {
        let path = boundary_file_path(&self.data_dir, boundary)?;
        let Some(parent) = path.parent() else {
            return Err(BoundaryError::Io("boundary path missing parent directory".to_string()));
        };
        std::fs::create_dir_all(parent).map_err(|err| BoundaryError::Io(err.to_string()))?;
        let mut connection = self.open_boundary(&path)?;
        initialize_boundary(&mut connection)
    }

    fn boundary_exists(&self, boundary: &IsolationBoundary) -> Result<bool, BoundaryError> {
        let path = boundary_file_path(&self.data_dir, boundary)?;
        Ok(path.is_file())
    }

    fn readiness(&self) -> Result<(), BoundaryError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|err| BoundaryError::Io(err.to_string()))
    }
}

// ============================================================================
// SECTION: Boundary Schema
// ============================================================================

/// Creates the fixed per-tenant table set if absent.
///
/// The set is frozen at the version of the provisioner that ran; there are
/// no runtime migrations for already-provisioned boundaries. The tenant
/// registry table is intentionally not part of this set.
fn initialize_boundary(connection: &mut Connection) -> Result<(), BoundaryError> {
    let tx = connection.transaction().map_err(|err| BoundaryError::Db(err.to_string()))?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS boundary_meta (version INTEGER NOT NULL);
        CREATE TABLE IF NOT EXISTS baskets (
            basket_id TEXT NOT NULL PRIMARY KEY,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS documents (
            document_id TEXT NOT NULL PRIMARY KEY,
            basket_id TEXT NOT NULL,
            name TEXT NOT NULL,
            extension TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (basket_id) REFERENCES baskets(basket_id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_documents_basket
            ON documents (basket_id, document_id);",
    )
    .map_err(|err| BoundaryError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM boundary_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| BoundaryError::Db(err.to_string()))?;
    if version.is_none() {
        tx.execute("INSERT INTO boundary_meta (version) VALUES (?1)", params![BOUNDARY_VERSION])
            .map_err(|err| BoundaryError::Db(err.to_string()))?;
    }
    tx.commit().map_err(|err| BoundaryError::Db(err.to_string()))?;
    Ok(())
}
