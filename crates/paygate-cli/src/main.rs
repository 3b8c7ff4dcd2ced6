// crates/paygate-cli/src/main.rs
// ============================================================================
// Module: Paygate CLI Entry Point
// Description: Command dispatcher for identifier resolution and reconciliation.
// Purpose: Give operators a safe, scriptable front end to the gateway.
// Dependencies: clap, paygate-config, paygate-core, paygate-http, serde, thiserror
// ============================================================================

//! ## Overview
//! The `paygate` binary normalizes identifiers offline and, with a config
//! file, resolves, inspects, cancels, and reconciles payments against the
//! gateway. Results are JSON on stdout; failures go to stderr with a non-zero
//! exit code. Gateway response bodies are echoed on failure so operators can
//! see exactly what the gateway said.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use paygate_cli::t;
use paygate_config::PaygateConfig;
use paygate_config::config_toml_example;
use paygate_core::CandidateGenerator;
use paygate_core::CandidateSet;
use paygate_core::InMemoryMappingStore;
use paygate_core::LocalOrder;
use paygate_core::MappingStore;
use paygate_core::OrderReference;
use paygate_core::PaymentId;
use paygate_core::PaymentStatus;
use paygate_core::ReconcileError;
use paygate_core::ReconciliationEngine;
use paygate_core::ResolveRequest;
use paygate_core::is_normalized;
use paygate_core::normalize;
use paygate_http::HttpGateway;
use paygate_store_sqlite::SqliteMappingStore;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default number of mappings listed by `mapping list`.
const DEFAULT_MAPPING_LIST_LIMIT: usize = 50;
/// Exit code returned by `reconcile --fail-on-drift` when drift is found.
const DRIFT_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "paygate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to paygate.toml or `PAYGATE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a raw identifier to the gateway format (offline).
    Normalize(NormalizeCommand),
    /// List the candidates that would be probed for a raw identifier (offline).
    Candidates(CandidatesCommand),
    /// Resolve a raw identifier to a gateway-confirmed payment id.
    Resolve(TargetArgs),
    /// Fetch the gateway record for a raw identifier.
    Status(TargetArgs),
    /// Cancel a payment, fully or partially.
    Cancel(CancelCommand),
    /// Compare a local order with the gateway record.
    Reconcile(ReconcileCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Identifier-mapping cache utilities.
    Mapping {
        /// Selected mapping subcommand.
        #[command(subcommand)]
        command: MappingCommand,
    },
}

/// Arguments for `normalize`.
#[derive(Args, Debug)]
struct NormalizeCommand {
    /// Raw identifier as stored locally.
    #[arg(value_name = "RAW")]
    raw: String,
}

/// Arguments for `candidates`.
#[derive(Args, Debug)]
struct CandidatesCommand {
    /// Raw identifier; omit to see the missing-identifier fallback.
    #[arg(value_name = "RAW")]
    raw: Option<String>,
}

/// Identifies the payment to operate on.
#[derive(Args, Debug, Clone, Default)]
struct TargetArgs {
    /// Locally stored payment identifier.
    #[arg(long, value_name = "RAW")]
    raw: Option<String>,
    /// Merchant order reference used as a lookup fallback.
    #[arg(long = "order", value_name = "ORDER_REF")]
    order: Option<String>,
}

/// Arguments for `cancel`.
#[derive(Args, Debug)]
struct CancelCommand {
    /// Payment to cancel.
    #[command(flatten)]
    target: TargetArgs,
    /// Already-confirmed gateway payment id; skips resolution.
    #[arg(long, value_name = "PAYMENT_ID", conflicts_with_all = ["raw", "order"])]
    payment_id: Option<String>,
    /// Cancellation reason sent to the gateway.
    #[arg(long, value_name = "TEXT")]
    reason: Option<String>,
    /// Partial cancel amount in minor units; omit to cancel the balance.
    #[arg(long, value_name = "AMOUNT")]
    amount: Option<u64>,
}

/// Arguments for `reconcile`.
#[derive(Args, Debug)]
struct ReconcileCommand {
    /// Payment to reconcile.
    #[command(flatten)]
    target: TargetArgs,
    /// Status recorded locally.
    #[arg(long, value_name = "STATUS", value_parser = parse_status)]
    local_status: PaymentStatus,
    /// Amount recorded locally, in minor units.
    #[arg(long, value_name = "AMOUNT")]
    local_amount: u64,
    /// Exit with status 2 when the local order has drifted.
    #[arg(long, action = ArgAction::SetTrue)]
    fail_on_drift: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the config file.
    Validate,
    /// Print an annotated example config.
    Example,
}

/// Mapping cache subcommands.
#[derive(Subcommand, Debug)]
enum MappingCommand {
    /// List cached mappings, most recent first.
    List {
        /// Maximum number of entries to print.
        #[arg(long, default_value_t = DEFAULT_MAPPING_LIST_LIMIT)]
        limit: usize,
    },
    /// Remove the cached mapping for a raw identifier.
    Forget {
        /// Raw identifier whose mapping should be dropped.
        #[arg(value_name = "RAW")]
        raw: String,
    },
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Output of `normalize`.
#[derive(Debug, Serialize)]
struct NormalizeOutput<'a> {
    /// Input as given.
    raw: &'a str,
    /// Normalized payment id.
    normalized: String,
    /// Whether the input already conformed.
    conformant: bool,
}

/// Output of `candidates`.
#[derive(Debug, Serialize)]
struct CandidatesOutput<'a> {
    /// Input as given.
    raw: Option<&'a str>,
    /// Candidates in probe order.
    candidates: CandidateSet,
}

/// Output of `mapping forget`.
#[derive(Debug, Serialize)]
struct ForgetOutput<'a> {
    /// Raw identifier.
    raw_identifier: &'a str,
    /// Whether a mapping was removed.
    removed: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Engine wired to the HTTP gateway and the configured cache.
type CliEngine = ReconciliationEngine<HttpGateway, Box<dyn MappingStore>>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config_path = cli.config.as_deref();
    match command {
        Commands::Normalize(command) => command_normalize(&command),
        Commands::Candidates(command) => command_candidates(&command),
        Commands::Resolve(target) => command_resolve(config_path, &target),
        Commands::Status(target) => command_status(config_path, &target),
        Commands::Cancel(command) => command_cancel(config_path, &command),
        Commands::Reconcile(command) => command_reconcile(config_path, &command),
        Commands::Config {
            command,
        } => command_config(config_path, &command),
        Commands::Mapping {
            command,
        } => command_mapping(config_path, &command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Offline Commands
// ============================================================================

/// Executes `normalize`.
fn command_normalize(command: &NormalizeCommand) -> CliResult<ExitCode> {
    let output = NormalizeOutput {
        raw: &command.raw,
        normalized: normalize(&command.raw).to_string(),
        conformant: is_normalized(&command.raw),
    };
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `candidates`.
fn command_candidates(command: &CandidatesCommand) -> CliResult<ExitCode> {
    let raw = command.raw.as_deref();
    let output = CandidatesOutput {
        raw,
        candidates: CandidateGenerator::new().generate(raw),
    };
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Gateway Commands
// ============================================================================

/// Executes `resolve`.
fn command_resolve(config_path: Option<&Path>, target: &TargetArgs) -> CliResult<ExitCode> {
    let engine = build_engine(config_path)?;
    let resolution = engine
        .resolve(&target_request(target))
        .map_err(|err| operation_failure(&t!("operation.resolve"), &err))?;
    write_json(&resolution)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `status`.
fn command_status(config_path: Option<&Path>, target: &TargetArgs) -> CliResult<ExitCode> {
    let engine = build_engine(config_path)?;
    let record = engine
        .status(&target_request(target))
        .map_err(|err| operation_failure(&t!("operation.status"), &err))?;
    write_json(&record)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `cancel`.
fn command_cancel(config_path: Option<&Path>, command: &CancelCommand) -> CliResult<ExitCode> {
    let engine = build_engine(config_path)?;
    let reason = command.reason.as_deref();
    let result = match &command.payment_id {
        Some(payment_id) => {
            engine.cancel(&PaymentId::new(payment_id.trim()), reason, command.amount)
        }
        None => engine.resolve_and_cancel(&target_request(&command.target), reason, command.amount),
    }
    .map_err(|err| operation_failure(&t!("operation.cancel"), &err))?;
    write_json(&result)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `reconcile`.
fn command_reconcile(
    config_path: Option<&Path>,
    command: &ReconcileCommand,
) -> CliResult<ExitCode> {
    let engine = build_engine(config_path)?;
    let order = LocalOrder {
        raw_identifier: command.target.raw.clone(),
        order_reference: command.target.order.as_deref().map(OrderReference::from),
        status: command.local_status,
        amount: command.local_amount,
    };
    let report = engine
        .reconcile(&order)
        .map_err(|err| operation_failure(&t!("operation.reconcile"), &err))?;
    write_json(&report)?;
    if command.fail_on_drift && !report.is_in_sync() {
        write_stderr_line(&t!("reconcile.drift", count = report.drifts.len()))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::from(DRIFT_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds a resolve request from target arguments.
fn target_request(target: &TargetArgs) -> ResolveRequest {
    let mut request = ResolveRequest::default();
    request.raw_identifier.clone_from(&target.raw);
    if let Some(order) = target.order.as_deref().map(str::trim).filter(|order| !order.is_empty()) {
        request = request.with_order_reference(order);
    }
    request
}

/// Formats an engine failure, appending the gateway body when present.
fn operation_failure(operation: &str, error: &ReconcileError) -> CliError {
    let mut message =
        t!("operation.failed", operation = operation, kind = error.kind(), error = error);
    if error.is_already_cancelled() {
        message.push('\n');
        message.push_str(&t!("cancel.already_cancelled"));
    }
    if let Some(body) = error.gateway_body().filter(|body| !body.trim().is_empty()) {
        message.push('\n');
        message.push_str(&t!("gateway.response_body", body = body));
    }
    CliError::new(message)
}

/// Loads config and wires the gateway, cache, and audit sink into an engine.
fn build_engine(config_path: Option<&Path>) -> CliResult<CliEngine> {
    let config = load_config(config_path)?;
    let http = config
        .http_gateway_config()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let gateway = HttpGateway::new(http)
        .map_err(|err| CliError::new(t!("gateway.init_failed", error = err)))?;
    let store: Box<dyn MappingStore> = match config.cache.sqlite_config() {
        Some(sqlite) => Box::new(
            SqliteMappingStore::new(sqlite)
                .map_err(|err| CliError::new(t!("cache.open_failed", error = err)))?,
        ),
        None => Box::new(InMemoryMappingStore::new()),
    };
    let audit = config
        .audit
        .build_sink()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    Ok(ReconciliationEngine::new(gateway, store, config.engine_config()).with_audit(audit))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(config_path: Option<&Path>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let _config = load_config(config_path)?;
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates the config file.
fn load_config(config_path: Option<&Path>) -> CliResult<PaygateConfig> {
    PaygateConfig::load(config_path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Mapping Commands
// ============================================================================

/// Dispatches mapping subcommands.
fn command_mapping(config_path: Option<&Path>, command: &MappingCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let Some(sqlite) = config.cache.sqlite_config() else {
        return Err(CliError::new(t!("cache.sqlite_required")));
    };
    let store = SqliteMappingStore::new(sqlite)
        .map_err(|err| CliError::new(t!("cache.open_failed", error = err)))?;
    match command {
        MappingCommand::List {
            limit,
        } => {
            let entries = store
                .entries(*limit)
                .map_err(|err| CliError::new(t!("mapping.list_failed", error = err)))?;
            write_json(&entries)?;
        }
        MappingCommand::Forget {
            raw,
        } => {
            let raw = raw.trim();
            let removed = store.remove(raw).map_err(|err| {
                CliError::new(t!("mapping.forget_failed", raw = raw, error = err))
            })?;
            write_json(&ForgetOutput {
                raw_identifier: raw,
                removed,
            })?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

/// Parses a payment status label for clap.
fn parse_status(value: &str) -> Result<PaymentStatus, String> {
    PaymentStatus::parse(value).ok_or_else(|| t!("input.status_invalid", value = value))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes pretty JSON to stdout followed by a newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
