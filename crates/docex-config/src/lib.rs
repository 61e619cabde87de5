// crates/docex-config/src/lib.rs
// ============================================================================
// Module: Docex Configuration
// Description: Canonical configuration model with strict load validation.
// Purpose: Load and validate engine configuration so template and naming
//          errors are fatal at startup, never deferred to first resolution.
// Dependencies: docex-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is a validated struct with named fields, not a dynamic
//! dictionary. Loading guards the file path, size, and encoding before
//! parsing strict TOML (unknown fields rejected), then validates every
//! template and naming rule. A configuration that would fail on first
//! resolution fails here instead.
//!
//! Security posture: configuration files are untrusted input; limits are
//! enforced before the parser sees any bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use docex_core::StoragePrefixConfig;
use docex_core::TENANT_ID_PLACEHOLDER;
use docex_core::TenancySettings;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted configuration file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1024 * 1024;
/// Maximum length of a single config path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total config path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default configuration file name resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docex.toml";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - All variants are fatal at startup and never recovered silently.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file path failed safety limits.
    #[error("config path invalid: {0}")]
    Path(String),
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file contents failed structural parsing.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config values failed semantic validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Registry Config
// ============================================================================

/// Registry database location settings.
///
/// # Invariants
/// - `data_dir` is the root under which the bootstrap boundary and all
///   database-file boundaries are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Root directory for registry and boundary storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Busy timeout in milliseconds for registry connections.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Returns the default data directory.
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Returns the default busy timeout for registry connections.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Canonical Docex engine configuration.
///
/// # Invariants
/// - Always validated before use; [`DocexConfig::load`] never returns an
///   unvalidated instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocexConfig {
    /// Object-storage prefix settings.
    #[serde(default)]
    pub storage: StoragePrefixConfig,
    /// Multi-tenancy and isolation settings.
    #[serde(default)]
    pub tenancy: TenancySettings,
    /// Registry database settings.
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl DocexConfig {
    /// Loads configuration from a TOML file, or defaults when `path` is
    /// `None` and no default file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path fails safety limits, the file
    /// cannot be read or parsed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads and parses a specific configuration file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_config_path(path)?;
        let metadata = std::fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Path(format!(
                "config file exceeds size limit: {} bytes (max {MAX_CONFIG_BYTES})",
                metadata.len()
            )));
        }
        let bytes = std::fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Parse("config file must be utf-8".to_string()))?;
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates every semantic rule of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_key_segment("storage.app_name", &self.storage.app_name)?;
        validate_key_segment("storage.environment", &self.storage.environment)?;
        validate_template(
            "storage.tenant_segment_template",
            &self.storage.tenant_segment_template,
        )?;
        validate_template("tenancy.schema_template", &self.tenancy.schema_template)?;
        validate_template(
            "tenancy.database_path_template",
            &self.tenancy.database_path_template,
        )?;
        validate_system_boundary(&self.tenancy.system_boundary)?;
        if self.registry.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "registry.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Validates config file paths for safety limits.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Path("config path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Path("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Path("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a storage key segment (non-empty, no separators or whitespace).
fn validate_key_segment(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if let Some(character) =
        value.chars().find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        return Err(ConfigError::Invalid(format!(
            "{field} contains invalid character: {character:?}"
        )));
    }
    Ok(())
}

/// Validates that a template carries the placeholder exactly once.
fn validate_template(field: &str, template: &str) -> Result<(), ConfigError> {
    let occurrences = template.matches(TENANT_ID_PLACEHOLDER).count();
    if occurrences == 1 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must contain `{TENANT_ID_PLACEHOLDER}` exactly once, found {occurrences}"
        )))
    }
}

/// Validates the bootstrap boundary literal.
///
/// The literal must never carry a template placeholder; a templated system
/// boundary would reintroduce the address-collision risk the fixed literal
/// exists to eliminate.
fn validate_system_boundary(value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(
            "tenancy.system_boundary must not be empty".to_string(),
        ));
    }
    if value.contains(TENANT_ID_PLACEHOLDER) {
        return Err(ConfigError::Invalid(
            "tenancy.system_boundary must be a literal, not a template".to_string(),
        ));
    }
    Ok(())
}
