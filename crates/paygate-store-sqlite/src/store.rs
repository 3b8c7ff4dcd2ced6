// crates/paygate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Mapping Store
// Description: Durable MappingStore backed by SQLite.
// Purpose: Cache confirmed payment ids across process restarts.
// Dependencies: paygate-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`MappingStore`] using `SQLite`. Each raw
//! identifier maps to exactly one confirmed payment id; writes are
//! idempotent upserts where the last writer wins. Stored rows are validated
//! on read and fail closed on corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use paygate_core::MappingStore;
use paygate_core::PaymentId;
use paygate_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum raw identifier size accepted by the store.
pub const MAX_RAW_IDENTIFIER_BYTES: usize = 512;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
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

/// Configuration for the `SQLite` mapping store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteMappingStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteMappingStoreConfig {
    /// Creates a configuration with default pragmas for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row failed validation.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps a rusqlite error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Stored mapping row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    /// Raw identifier as stored locally.
    pub raw_identifier: String,
    /// Confirmed gateway payment id.
    pub payment_id: PaymentId,
    /// When the mapping was last confirmed (milliseconds since epoch).
    pub resolved_at_ms: i64,
}

/// `SQLite`-backed identifier-mapping store.
///
/// # Invariants
/// - `SQLite` connection access is serialized through a mutex.
/// - At most one payment id is stored per raw identifier.
#[derive(Clone)]
pub struct SqliteMappingStore {
    /// Store configuration.
    config: SqliteMappingStoreConfig,
    /// Shared connection.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteMappingStore {
    /// Opens an `SQLite`-backed mapping store, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteMappingStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteMappingStoreConfig {
        &self.config
    }

    /// Returns up to `limit` mappings, most recently confirmed first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or a row is corrupt.
    pub fn entries(&self, limit: usize) -> Result<Vec<MappingEntry>, SqliteStoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT raw_identifier, payment_id, resolved_at FROM payment_id_mappings
                 ORDER BY resolved_at DESC, raw_identifier ASC LIMIT ?1",
            )
            .map_err(db_error)?;
        let rows = statement
            .query_map(params![limit], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })
            .map_err(db_error)?;
        let mut entries = Vec::new();
        for row in rows {
            let (raw_identifier, payment_id, resolved_at_ms) = row.map_err(db_error)?;
            entries.push(MappingEntry {
                payment_id: validated_payment_id(&raw_identifier, payment_id)?,
                raw_identifier,
                resolved_at_ms,
            });
        }
        Ok(entries)
    }

    /// Deletes the mapping for `raw`. Returns true when a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn remove(&self, raw: &str) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let removed = guard
            .execute("DELETE FROM payment_id_mappings WHERE raw_identifier = ?1", params![raw])
            .map_err(db_error)?;
        Ok(removed > 0)
    }

    /// Looks up the mapping for `raw`.
    fn lookup_row(&self, raw: &str) -> Result<Option<PaymentId>, SqliteStoreError> {
        let guard = self.lock()?;
        let stored: Option<String> = guard
            .query_row(
                "SELECT payment_id FROM payment_id_mappings WHERE raw_identifier = ?1",
                params![raw],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        drop(guard);
        stored.map(|payment_id| validated_payment_id(raw, payment_id)).transpose()
    }

    /// Inserts or replaces the mapping for `raw`.
    fn upsert_row(&self, raw: &str, payment_id: &PaymentId) -> Result<(), SqliteStoreError> {
        validate_raw_identifier(raw)?;
        if payment_id.as_str().trim().is_empty() {
            return Err(SqliteStoreError::Invalid("payment id must be non-empty".to_string()));
        }
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO payment_id_mappings (raw_identifier, payment_id, resolved_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(raw_identifier) DO UPDATE SET
                    payment_id = excluded.payment_id,
                    resolved_at = excluded.resolved_at",
                params![raw, payment_id.as_str(), now_millis()],
            )
            .map_err(db_error)?;
        Ok(())
    }

    /// Acquires the connection lock.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("sqlite connection mutex poisoned".to_string()))
    }
}

impl MappingStore for SqliteMappingStore {
    fn lookup(&self, raw: &str) -> Result<Option<PaymentId>, StoreError> {
        self.lookup_row(raw).map_err(StoreError::from)
    }

    fn upsert(&self, raw: &str, payment_id: &PaymentId) -> Result<(), StoreError> {
        self.upsert_row(raw, payment_id).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects empty or oversized raw identifiers.
fn validate_raw_identifier(raw: &str) -> Result<(), SqliteStoreError> {
    if raw.is_empty() {
        return Err(SqliteStoreError::Invalid("raw identifier must be non-empty".to_string()));
    }
    if raw.len() > MAX_RAW_IDENTIFIER_BYTES {
        return Err(SqliteStoreError::Invalid(format!(
            "raw identifier exceeds {MAX_RAW_IDENTIFIER_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Validates a stored payment id.
fn validated_payment_id(raw: &str, stored: String) -> Result<PaymentId, SqliteStoreError> {
    if stored.trim().is_empty() {
        return Err(SqliteStoreError::Corrupt(format!("empty payment id stored for {raw}")));
    }
    Ok(PaymentId::new(stored))
}

/// Returns the current Unix time in milliseconds, saturating at `i64::MAX`.
fn now_millis() -> i64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    i64::try_from(millis).unwrap_or(i64::MAX)
}

/// Creates the parent directory of the database file when missing.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteMappingStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteMappingStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS payment_id_mappings (
                    raw_identifier TEXT PRIMARY KEY NOT NULL,
                    payment_id TEXT NOT NULL,
                    resolved_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_payment_id_mappings_resolved_at
                    ON payment_id_mappings (resolved_at);",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}
