// crates/docex-cli/src/main.rs
// ============================================================================
// Module: Docex CLI Entry Point
// Description: Command dispatcher for bootstrap, tenant, and resolver tasks.
// Purpose: Provide an operator CLI with distinct exit codes per error kind
//          so automation can react differently to each.
// Dependencies: clap, docex-config, docex-core, docex-registry-sqlite,
//               serde, serde_json
// ============================================================================

//! ## Overview
//! The `docex` CLI wires the configuration loader, the SQLite registry, and
//! the core runtime together: `init` runs the idempotent bootstrap,
//! `tenant create|list|show|disable|check` manage and probe the registry,
//! and `resolve boundary|prefix|path` expose the pure resolvers for operator
//! dry-runs. Error kinds map to distinct process exit codes; conflicts and
//! not-found outcomes are expected results, not faults.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use docex_config::ConfigError;
use docex_config::DocexConfig;
use docex_core::BasketId;
use docex_core::BootstrapOutcome;
use docex_core::CreateTenantRequest;
use docex_core::DocumentId;
use docex_core::GateError;
use docex_core::ProvisionError;
use docex_core::RegistryError;
use docex_core::RuntimeGate;
use docex_core::Tenant;
use docex_core::TenantAccess;
use docex_core::TenantFilter;
use docex_core::TenantId;
use docex_core::TenantIdError;
use docex_core::TenantProvisioner;
use docex_core::TenantRegistry;
use docex_core::TenantStatus;
use docex_core::UserContext;
use docex_core::build_document_path;
use docex_core::initialize;
use docex_core::resolve_boundary;
use docex_core::resolve_storage_prefix;
use docex_core::system_boundary;
use docex_registry_sqlite::SqliteIsolationBackend;
use docex_registry_sqlite::SqliteJournalMode;
use docex_registry_sqlite::SqliteRegistryConfig;
use docex_registry_sqlite::SqliteSyncMode;
use docex_registry_sqlite::SqliteTenantRegistry;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit code for unexpected failures.
const EXIT_FAILURE: u8 = 1;
/// Exit code when a tenant already exists.
const EXIT_ALREADY_EXISTS: u8 = 10;
/// Exit code when a tenant is not found.
const EXIT_NOT_FOUND: u8 = 11;
/// Exit code for reserved or forbidden tenant identifiers.
const EXIT_FORBIDDEN: u8 = 12;
/// Exit code when a tenant is disabled.
const EXIT_DISABLED: u8 = 13;
/// Exit code for retryable partial provisioning.
const EXIT_PARTIAL: u8 = 14;
/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 15;
/// Exit code for input validation errors.
const EXIT_VALIDATION: u8 = 16;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Docex tenant isolation engine CLI.
#[derive(Parser, Debug)]
#[command(name = "docex", version, about = "Docex tenant isolation engine")]
struct Cli {
    /// Path to the configuration file (defaults to `docex.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the system tenant and registry (idempotent).
    Init,
    /// Tenant registry management.
    Tenant {
        /// Tenant subcommand to execute.
        #[command(subcommand)]
        command: TenantCommands,
    },
    /// Dry-run the deterministic resolvers.
    Resolve {
        /// Resolver subcommand to execute.
        #[command(subcommand)]
        command: ResolveCommands,
    },
}

/// Tenant registry subcommands.
#[derive(Subcommand, Debug)]
enum TenantCommands {
    /// Provision a new business tenant.
    Create(TenantCreateCommand),
    /// List registered tenants.
    List(TenantListCommand),
    /// Show a single tenant.
    Show(TenantShowCommand),
    /// Soft-disable a tenant.
    Disable(TenantDisableCommand),
    /// Run the runtime gate against a tenant context.
    Check(TenantCheckCommand),
}

/// Arguments for `tenant create`.
#[derive(Args, Debug)]
struct TenantCreateCommand {
    /// Tenant identifier (alphanumeric, `-`, `_`).
    #[arg(long)]
    tenant_id: String,
    /// Human-readable display name.
    #[arg(long)]
    display_name: String,
    /// Operator or principal requesting creation.
    #[arg(long)]
    created_by: String,
}

/// Arguments for `tenant list`.
#[derive(Args, Debug)]
struct TenantListCommand {
    /// Restrict results to a lifecycle status.
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    /// Include the bootstrap (system) row.
    #[arg(long)]
    include_system: bool,
    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Arguments for `tenant show`.
#[derive(Args, Debug)]
struct TenantShowCommand {
    /// Tenant identifier to show.
    tenant_id: String,
    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Arguments for `tenant disable`.
#[derive(Args, Debug)]
struct TenantDisableCommand {
    /// Tenant identifier to disable.
    tenant_id: String,
}

/// Arguments for `tenant check`.
#[derive(Args, Debug)]
struct TenantCheckCommand {
    /// Tenant identifier to validate through the gate.
    tenant_id: String,
}

/// Resolver dry-run subcommands.
#[derive(Subcommand, Debug)]
enum ResolveCommands {
    /// Resolve the isolation boundary for a tenant.
    Boundary(ResolveBoundaryCommand),
    /// Resolve the object-storage prefix for a tenant.
    Prefix(ResolvePrefixCommand),
    /// Build a full document storage key.
    Path(ResolvePathCommand),
}

/// Arguments for `resolve boundary`.
#[derive(Args, Debug)]
struct ResolveBoundaryCommand {
    /// Tenant identifier to resolve.
    #[arg(long)]
    tenant_id: String,
}

/// Arguments for `resolve prefix`.
#[derive(Args, Debug)]
struct ResolvePrefixCommand {
    /// Tenant identifier to resolve.
    #[arg(long)]
    tenant_id: String,
}

/// Arguments for `resolve path`.
#[derive(Args, Debug)]
struct ResolvePathCommand {
    /// Tenant identifier to resolve.
    #[arg(long)]
    tenant_id: String,
    /// Basket identifier.
    #[arg(long)]
    basket_id: String,
    /// Document identifier.
    #[arg(long)]
    document_id: String,
    /// Human-readable basket name hint.
    #[arg(long, default_value = "")]
    basket_name: String,
    /// Human-readable document name hint.
    #[arg(long, default_value = "")]
    document_name: String,
    /// File extension without the leading dot.
    #[arg(long)]
    ext: String,
}

/// Lifecycle status filter argument.
#[derive(ValueEnum, Debug, Clone, Copy)]
enum StatusArg {
    /// Active tenants only.
    Active,
    /// Disabled tenants only.
    Disabled,
}

impl From<StatusArg> for TenantStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Active => Self::Active,
            StatusArg::Disabled => Self::Disabled,
        }
    }
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// CLI error carrying a message and its mapped exit code.
#[derive(Debug)]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Process exit code for this error kind.
    code: u8,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String, code: u8) -> Self {
        Self {
            message,
            code,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::new(error.to_string(), EXIT_CONFIG)
    }
}

impl From<TenantIdError> for CliError {
    fn from(error: TenantIdError) -> Self {
        Self::new(error.to_string(), EXIT_VALIDATION)
    }
}

impl From<ProvisionError> for CliError {
    fn from(error: ProvisionError) -> Self {
        let code = provision_exit_code(&error);
        Self::new(error.to_string(), code)
    }
}

impl From<RegistryError> for CliError {
    fn from(error: RegistryError) -> Self {
        let code = registry_exit_code(&error);
        Self::new(error.to_string(), code)
    }
}

/// Maps provisioning errors to exit codes.
const fn provision_exit_code(error: &ProvisionError) -> u8 {
    match error {
        ProvisionError::AlreadyExists {
            ..
        } => EXIT_ALREADY_EXISTS,
        ProvisionError::ReservedTenantId {
            ..
        } => EXIT_FORBIDDEN,
        ProvisionError::InvalidTenantId(_) => EXIT_VALIDATION,
        ProvisionError::Resolve(_) => EXIT_CONFIG,
        ProvisionError::Partial {
            ..
        } => EXIT_PARTIAL,
        ProvisionError::Boundary(_)
        | ProvisionError::Registry {
            ..
        }
        | ProvisionError::DeadlineExceeded {
            ..
        } => EXIT_FAILURE,
    }
}

/// Maps runtime gate errors to exit codes.
const fn gate_exit_code(error: &GateError) -> u8 {
    match error {
        GateError::ContextRequired | GateError::InvalidTenantId(_) => EXIT_VALIDATION,
        GateError::SystemTenantForbidden => EXIT_FORBIDDEN,
        GateError::NotFound {
            ..
        } => EXIT_NOT_FOUND,
        GateError::Disabled {
            ..
        } => EXIT_DISABLED,
        GateError::Resolve(_) => EXIT_CONFIG,
        GateError::Corrupt {
            ..
        }
        | GateError::Registry(_) => EXIT_FAILURE,
    }
}

/// Maps registry errors to exit codes.
const fn registry_exit_code(error: &RegistryError) -> u8 {
    match error {
        RegistryError::AlreadyExists {
            ..
        } => EXIT_ALREADY_EXISTS,
        RegistryError::NotFound {
            ..
        } => EXIT_NOT_FOUND,
        RegistryError::Io(_)
        | RegistryError::Db(_)
        | RegistryError::Corrupt(_)
        | RegistryError::Invalid(_) => EXIT_FAILURE,
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.message, err.code),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = DocexConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Init => command_init(&config),
        Commands::Tenant {
            command,
        } => command_tenant(&config, command),
        Commands::Resolve {
            command,
        } => command_resolve(&config, command),
    }
}

// ============================================================================
// SECTION: Storage Wiring
// ============================================================================

/// Builds the SQLite registry configuration from loaded settings.
fn registry_config(config: &DocexConfig) -> SqliteRegistryConfig {
    SqliteRegistryConfig {
        data_dir: config.registry.data_dir.clone(),
        busy_timeout_ms: config.registry.busy_timeout_ms,
        journal_mode: SqliteJournalMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    }
}

/// Opens the registry inside the bootstrap boundary.
fn open_registry(config: &DocexConfig) -> CliResult<SqliteTenantRegistry> {
    let sqlite = registry_config(config);
    let boundary = system_boundary(&config.tenancy);
    SqliteTenantRegistry::open(&sqlite, &boundary)
        .map_err(|err| CliError::new(err.to_string(), EXIT_FAILURE))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs the idempotent system bootstrap.
fn command_init(config: &DocexConfig) -> CliResult<ExitCode> {
    let registry = open_registry(config)?;
    let backend = SqliteIsolationBackend::new(&registry_config(config));
    let outcome = initialize(&registry, &backend, &config.tenancy)
        .map_err(|err| CliError::new(err.to_string(), EXIT_FAILURE))?;
    let message = match outcome {
        BootstrapOutcome::Initialized => "system tenant initialized",
        BootstrapOutcome::AlreadyInitialized => "system tenant already initialized",
    };
    write_stdout_line(message)?;
    Ok(ExitCode::SUCCESS)
}

/// Dispatches tenant subcommands.
fn command_tenant(config: &DocexConfig, command: TenantCommands) -> CliResult<ExitCode> {
    match command {
        TenantCommands::Create(command) => command_tenant_create(config, &command),
        TenantCommands::List(command) => command_tenant_list(config, &command),
        TenantCommands::Show(command) => command_tenant_show(config, &command),
        TenantCommands::Disable(command) => command_tenant_disable(config, &command),
        TenantCommands::Check(command) => command_tenant_check(config, &command),
    }
}

/// Provisions a new business tenant.
fn command_tenant_create(config: &DocexConfig, command: &TenantCreateCommand) -> CliResult<ExitCode> {
    let registry = open_registry(config)?;
    let backend = SqliteIsolationBackend::new(&registry_config(config));
    let provisioner = TenantProvisioner::new(&registry, &backend, &config.tenancy);
    let request = CreateTenantRequest {
        tenant_id: command.tenant_id.clone(),
        display_name: command.display_name.clone(),
        created_by: command.created_by.clone(),
    };
    let tenant = provisioner.create_tenant(&request, None)?;
    write_stdout_line(&format!(
        "tenant {} provisioned ({} -> {})",
        tenant.tenant_id, tenant.isolation_kind, tenant.isolation_ref
    ))?;
    Ok(ExitCode::SUCCESS)
}

/// Lists registered tenants.
fn command_tenant_list(config: &DocexConfig, command: &TenantListCommand) -> CliResult<ExitCode> {
    let registry = open_registry(config)?;
    let filter = TenantFilter {
        status: command.status.map(TenantStatus::from),
        include_system: command.include_system,
    };
    let tenants = registry.list(&filter)?;
    if command.json {
        write_stdout_line(&to_json(&tenants)?)?;
    } else {
        for tenant in &tenants {
            write_stdout_line(&format_tenant_line(tenant))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Shows a single tenant.
fn command_tenant_show(config: &DocexConfig, command: &TenantShowCommand) -> CliResult<ExitCode> {
    let registry = open_registry(config)?;
    let tenant_id = TenantId::parse(command.tenant_id.as_str())?;
    let tenant = registry.get(&tenant_id)?;
    if command.json {
        write_stdout_line(&to_json(&tenant)?)?;
    } else {
        write_stdout_line(&format_tenant_line(&tenant))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Soft-disables a tenant.
fn command_tenant_disable(
    config: &DocexConfig,
    command: &TenantDisableCommand,
) -> CliResult<ExitCode> {
    let registry = open_registry(config)?;
    let tenant_id = TenantId::parse(command.tenant_id.as_str())?;
    if tenant_id.is_system() {
        return Err(CliError::new(
            "system tenant may not be disabled".to_string(),
            EXIT_FORBIDDEN,
        ));
    }
    registry.set_status(&tenant_id, TenantStatus::Disabled)?;
    write_stdout_line(&format!("tenant {tenant_id} disabled"))?;
    Ok(ExitCode::SUCCESS)
}

/// Validates a tenant context through the runtime gate.
fn command_tenant_check(config: &DocexConfig, command: &TenantCheckCommand) -> CliResult<ExitCode> {
    let registry = open_registry(config)?;
    let gate = RuntimeGate::new(&registry, &config.tenancy, &config.storage);
    let ctx = UserContext::for_tenant("docex-cli", command.tenant_id.as_str());
    match gate.authorize(&ctx) {
        Ok(TenantAccess::SingleTenant) => {
            write_stdout_line("multi-tenancy disabled; no tenant scoping applies")?;
        }
        Ok(TenantAccess::Scoped(resolved)) => {
            write_stdout_line(&format!(
                "tenant {} ok ({} -> {})",
                resolved.tenant_id,
                resolved.boundary.reference(),
                resolved.storage_prefix
            ))?;
        }
        Err(error) => {
            let code = gate_exit_code(&error);
            return Err(CliError::new(error.to_string(), code));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Dispatches resolver dry-run subcommands.
fn command_resolve(config: &DocexConfig, command: ResolveCommands) -> CliResult<ExitCode> {
    match command {
        ResolveCommands::Boundary(command) => {
            let tenant_id = TenantId::parse(command.tenant_id.as_str())?;
            let boundary = resolve_boundary(&tenant_id, &config.tenancy)
                .map_err(|err| CliError::new(err.to_string(), EXIT_CONFIG))?;
            write_stdout_line(&boundary.reference())?;
        }
        ResolveCommands::Prefix(command) => {
            let tenant_id = TenantId::parse(command.tenant_id.as_str())?;
            let prefix = resolve_storage_prefix(&config.storage, &tenant_id)
                .map_err(|err| CliError::new(err.to_string(), EXIT_CONFIG))?;
            write_stdout_line(&prefix)?;
        }
        ResolveCommands::Path(command) => {
            let tenant_id = TenantId::parse(command.tenant_id.as_str())?;
            let path = build_document_path(
                &config.storage,
                &tenant_id,
                &BasketId::new(command.basket_id.as_str()),
                &DocumentId::new(command.document_id.as_str()),
                &command.basket_name,
                &command.document_name,
                &command.ext,
            )
            .map_err(|err| CliError::new(err.to_string(), EXIT_VALIDATION))?;
            write_stdout_line(&path)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Formats a tenant as a single text line.
fn format_tenant_line(tenant: &Tenant) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        tenant.tenant_id,
        tenant.status,
        tenant.isolation_kind,
        tenant.isolation_ref,
        tenant.display_name
    )
}

/// Serializes a value as pretty JSON.
fn to_json<T: serde::Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("json encoding failed: {err}"), EXIT_FAILURE))
}

/// Writes a line to stdout through a checked writer.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}"), EXIT_FAILURE))
}

/// Writes a line to stderr, ignoring secondary failures.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns its exit code.
fn emit_error(message: &str, code: u8) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(code)
}
