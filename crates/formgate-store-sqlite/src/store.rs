// crates/formgate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Form Store
// Description: Durable TemplateStore, SubmissionStore, and ServiceDirectory.
// Purpose: Persist templates and submissions with fail-closed schema checks.
// Dependencies: formgate-core, rusqlite, serde, serde_json, thiserror, uuid
// ============================================================================

//! ## Overview
//! This module implements the Formgate store interfaces on `SQLite`. Template
//! field lists and submission payloads are stored as JSON snapshots alongside
//! indexed columns for the dedup and listing queries. Database contents are
//! untrusted on load and fail closed on schema mismatches. Record identifiers
//! are UUIDv4 values minted here; the core stays free of randomness.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use formgate_core::FieldSpec;
use formgate_core::FormSubmission;
use formgate_core::FormTemplate;
use formgate_core::NewSubmission;
use formgate_core::NewTemplate;
use formgate_core::Pagination;
use formgate_core::ResponseMap;
use formgate_core::ServiceDirectory;
use formgate_core::ServiceId;
use formgate_core::SortOrder;
use formgate_core::StoreError;
use formgate_core::SubmissionFilter;
use formgate_core::SubmissionId;
use formgate_core::SubmissionIdentity;
use formgate_core::SubmissionMetadata;
use formgate_core::SubmissionPage;
use formgate_core::SubmissionStore;
use formgate_core::TemplateFilter;
use formgate_core::TemplateId;
use formgate_core::TemplateStore;
use formgate_core::TemplateVersion;
use formgate_core::Timestamp;
use formgate_core::DirectoryError;
use formgate_core::UserId;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

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

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
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

/// Configuration for the `SQLite` form store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
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

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed form store serving templates, submissions, and the
/// service directory from one database.
#[derive(Debug, Clone)]
pub struct SqliteFormStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteFormStore {
    /// Opens an `SQLite`-backed form store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Registers a service identifier for directory lookups.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn register_service(&self, service_id: &ServiceId, name: &str) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO services (service_id, name) VALUES (?1, ?2) ON CONFLICT(service_id) \
                 DO UPDATE SET name = excluded.name",
                params![service_id.as_str(), name],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Acquires the connection guard.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

#[async_trait]
impl TemplateStore for SqliteFormStore {
    async fn find(&self, id: &TemplateId) -> Result<Option<FormTemplate>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT template_id, name, description, service_id, fields_json, version, active, \
                 created_at, updated_at FROM form_templates WHERE template_id = ?1",
                params![id.as_str()],
                template_from_row,
            )
            .optional()
            .map_err(|err| StoreError::Store(err.to_string()))?
            .transpose()
            .map_err(StoreError::from)
    }

    async fn list(&self, filter: TemplateFilter) -> Result<Vec<FormTemplate>, StoreError> {
        let guard = self.lock()?;
        let mut sql = String::from(
            "SELECT template_id, name, description, service_id, fields_json, version, active, \
             created_at, updated_at FROM form_templates",
        );
        let mut bindings: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(active) = filter.active {
            sql.push_str(" WHERE active = ?1");
            bindings.push(Box::new(i64::from(active)));
        }
        sql.push_str(" ORDER BY created_at DESC, template_id DESC");

        let mut statement =
            guard.prepare(&sql).map_err(|err| StoreError::Store(err.to_string()))?;
        let params_refs: Vec<&dyn ToSql> = bindings.iter().map(Box::as_ref).collect();
        let rows = statement
            .query_map(params_refs.as_slice(), template_from_row)
            .map_err(|err| StoreError::Store(err.to_string()))?;

        let mut templates = Vec::new();
        for row in rows {
            let parsed = row.map_err(|err| StoreError::Store(err.to_string()))?;
            templates.push(parsed?);
        }
        Ok(templates)
    }

    async fn create(
        &self,
        template: NewTemplate,
        now: Timestamp,
    ) -> Result<FormTemplate, StoreError> {
        let record = FormTemplate {
            id: TemplateId::new(Uuid::new_v4().to_string()),
            name: template.name,
            description: template.description,
            service_id: template.service_id,
            fields: template.fields,
            version: template.version,
            active: template.active,
            created_at: now,
            updated_at: now,
        };
        let fields_json = encode_json(&record.fields)?;

        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| StoreError::Store(err.to_string()))?;
        tx.execute(
            "INSERT INTO form_templates (template_id, name, description, service_id, fields_json, \
             version, active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.as_str(),
                record.name,
                record.description,
                record.service_id.as_ref().map(ServiceId::as_str),
                fields_json,
                i64::from(record.version.get()),
                i64::from(record.active),
                record.created_at.as_unix_millis(),
                record.updated_at.as_unix_millis(),
            ],
        )
        .map_err(|err| StoreError::Store(err.to_string()))?;
        tx.commit().map_err(|err| StoreError::Store(err.to_string()))?;
        drop(guard);
        Ok(record)
    }

    async fn update(&self, template: &FormTemplate) -> Result<FormTemplate, StoreError> {
        let fields_json = encode_json(&template.fields)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| StoreError::Store(err.to_string()))?;
        let updated = tx
            .execute(
                "UPDATE form_templates SET name = ?2, description = ?3, service_id = ?4, \
                 fields_json = ?5, version = ?6, active = ?7, updated_at = ?8 WHERE template_id = \
                 ?1",
                params![
                    template.id.as_str(),
                    template.name,
                    template.description,
                    template.service_id.as_ref().map(ServiceId::as_str),
                    fields_json,
                    i64::from(template.version.get()),
                    i64::from(template.active),
                    template.updated_at.as_unix_millis(),
                ],
            )
            .map_err(|err| StoreError::Store(err.to_string()))?;
        if updated == 0 {
            return Err(StoreError::Invalid(format!("unknown template: {}", template.id)));
        }
        tx.commit().map_err(|err| StoreError::Store(err.to_string()))?;
        drop(guard);
        Ok(template.clone())
    }

    async fn count_submissions(&self, id: &TemplateId) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row(
                "SELECT COUNT(*) FROM form_submissions WHERE template_id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| StoreError::Store(err.to_string()))?;
        u64::try_from(count)
            .map_err(|_| StoreError::Invalid("negative submission count".to_string()))
    }
}

#[async_trait]
impl SubmissionStore for SqliteFormStore {
    async fn find_recent(
        &self,
        template_id: &TemplateId,
        identity: &SubmissionIdentity,
        since: Timestamp,
    ) -> Result<Option<FormSubmission>, StoreError> {
        let guard = self.lock()?;
        let (column, value) = match identity {
            SubmissionIdentity::User(user_id) => ("user_id", user_id.as_str()),
            SubmissionIdentity::Guest(email) => ("email", email.as_str()),
        };
        let sql = format!(
            "SELECT submission_id, template_id, template_version, user_id, email, responses_json, \
             metadata_json, created_at FROM form_submissions WHERE template_id = ?1 AND {column} = \
             ?2 AND created_at >= ?3 ORDER BY created_at DESC LIMIT 1"
        );
        guard
            .query_row(
                &sql,
                params![template_id.as_str(), value, since.as_unix_millis()],
                submission_from_row,
            )
            .optional()
            .map_err(|err| StoreError::Store(err.to_string()))?
            .transpose()
            .map_err(StoreError::from)
    }

    async fn create(
        &self,
        submission: NewSubmission,
        now: Timestamp,
    ) -> Result<FormSubmission, StoreError> {
        let record = FormSubmission {
            id: SubmissionId::new(Uuid::new_v4().to_string()),
            template_id: submission.template_id,
            template_version: submission.template_version,
            user_id: submission.user_id,
            email: submission.email,
            responses: submission.responses,
            metadata: submission.metadata,
            created_at: now,
        };
        let responses_json = encode_json(&record.responses)?;
        let metadata_json = encode_json(&record.metadata)?;

        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| StoreError::Store(err.to_string()))?;
        tx.execute(
            "INSERT INTO form_submissions (submission_id, template_id, template_version, user_id, \
             email, responses_json, metadata_json, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
             ?7, ?8)",
            params![
                record.id.as_str(),
                record.template_id.as_str(),
                i64::from(record.template_version.get()),
                record.user_id.as_ref().map(UserId::as_str),
                record.email,
                responses_json,
                metadata_json,
                record.created_at.as_unix_millis(),
            ],
        )
        .map_err(|err| StoreError::Store(err.to_string()))?;
        tx.commit().map_err(|err| StoreError::Store(err.to_string()))?;
        drop(guard);
        Ok(record)
    }

    async fn list(
        &self,
        filter: &SubmissionFilter,
        pagination: &Pagination,
    ) -> Result<SubmissionPage, StoreError> {
        let guard = self.lock()?;

        let mut clauses: Vec<String> = Vec::new();
        let mut bindings: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(template_id) = &filter.template_id {
            bindings.push(Box::new(template_id.as_str().to_string()));
            clauses.push(format!("template_id = ?{}", bindings.len()));
        }
        if let Some(needle) = &filter.email_contains {
            bindings.push(Box::new(format!("%{}%", escape_like(needle))));
            // LIKE is case-insensitive for ASCII in SQLite, matching the
            // case-insensitive contains filter of the in-memory store.
            clauses.push(format!("email LIKE ?{} ESCAPE '\\'", bindings.len()));
        }
        if let Some(from) = filter.date_from {
            bindings.push(Box::new(from.as_unix_millis()));
            clauses.push(format!("created_at >= ?{}", bindings.len()));
        }
        if let Some(to) = filter.date_to {
            bindings.push(Box::new(to.as_unix_millis()));
            clauses.push(format!("created_at <= ?{}", bindings.len()));
        }
        let where_clause =
            if clauses.is_empty() { String::new() } else { format!(" WHERE {}", clauses.join(" AND ")) };

        let count_sql = format!("SELECT COUNT(*) FROM form_submissions{where_clause}");
        let params_refs: Vec<&dyn ToSql> = bindings.iter().map(Box::as_ref).collect();
        let total: i64 = guard
            .query_row(&count_sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(|err| StoreError::Store(err.to_string()))?;
        let total =
            u64::try_from(total).map_err(|_| StoreError::Invalid("negative count".to_string()))?;

        let direction = match pagination.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let list_sql = format!(
            "SELECT submission_id, template_id, template_version, user_id, email, responses_json, \
             metadata_json, created_at FROM form_submissions{where_clause} ORDER BY created_at \
             {direction}, submission_id {direction} LIMIT {} OFFSET {}",
            pagination.limit,
            pagination.skip()
        );
        let mut statement =
            guard.prepare(&list_sql).map_err(|err| StoreError::Store(err.to_string()))?;
        let rows = statement
            .query_map(params_refs.as_slice(), submission_from_row)
            .map_err(|err| StoreError::Store(err.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            let parsed = row.map_err(|err| StoreError::Store(err.to_string()))?;
            items.push(parsed?);
        }
        Ok(SubmissionPage::new(items, pagination, total))
    }

    async fn get(&self, id: &SubmissionId) -> Result<Option<FormSubmission>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT submission_id, template_id, template_version, user_id, email, \
                 responses_json, metadata_json, created_at FROM form_submissions WHERE \
                 submission_id = ?1",
                params![id.as_str()],
                submission_from_row,
            )
            .optional()
            .map_err(|err| StoreError::Store(err.to_string()))?
            .transpose()
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl ServiceDirectory for SqliteFormStore {
    async fn exists(&self, service_id: &ServiceId) -> Result<bool, DirectoryError> {
        let guard =
            self.lock().map_err(|err| DirectoryError::Lookup(err.to_string()))?;
        let found: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM services WHERE service_id = ?1",
                params![service_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| DirectoryError::Lookup(err.to_string()))?;
        Ok(found.is_some())
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Intermediate template row used before JSON decoding.
type TemplateRow = (String, String, Option<String>, Option<String>, String, i64, i64, i64, i64);

/// Decodes a template row; JSON decoding is deferred past the rusqlite layer.
fn template_from_row(row: &Row<'_>) -> rusqlite::Result<Result<FormTemplate, SqliteStoreError>> {
    let raw: TemplateRow = (
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    );
    Ok(decode_template(raw))
}

/// Builds a template record from raw column values.
fn decode_template(raw: TemplateRow) -> Result<FormTemplate, SqliteStoreError> {
    let (id, name, description, service_id, fields_json, version, active, created_at, updated_at) =
        raw;
    let fields: Vec<FieldSpec> = serde_json::from_str(&fields_json)
        .map_err(|err| SqliteStoreError::Invalid(format!("fields_json for {id}: {err}")))?;
    let version = u32::try_from(version)
        .map_err(|_| SqliteStoreError::Invalid(format!("version out of range for {id}")))?;
    Ok(FormTemplate {
        id: TemplateId::new(id),
        name,
        description,
        service_id: service_id.map(ServiceId::new),
        fields,
        version: TemplateVersion::new(version),
        active: active != 0,
        created_at: Timestamp::from_unix_millis(created_at),
        updated_at: Timestamp::from_unix_millis(updated_at),
    })
}

/// Intermediate submission row used before JSON decoding.
type SubmissionRow = (String, String, i64, Option<String>, Option<String>, String, String, i64);

/// Decodes a submission row; JSON decoding is deferred past the rusqlite layer.
fn submission_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<Result<FormSubmission, SqliteStoreError>> {
    let raw: SubmissionRow = (
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    );
    Ok(decode_submission(raw))
}

/// Builds a submission record from raw column values.
fn decode_submission(raw: SubmissionRow) -> Result<FormSubmission, SqliteStoreError> {
    let (id, template_id, version, user_id, email, responses_json, metadata_json, created_at) = raw;
    let responses: ResponseMap = serde_json::from_str(&responses_json)
        .map_err(|err| SqliteStoreError::Invalid(format!("responses_json for {id}: {err}")))?;
    let metadata: SubmissionMetadata = serde_json::from_str(&metadata_json)
        .map_err(|err| SqliteStoreError::Invalid(format!("metadata_json for {id}: {err}")))?;
    let version = u32::try_from(version)
        .map_err(|_| SqliteStoreError::Invalid(format!("template_version out of range for {id}")))?;
    Ok(FormSubmission {
        id: SubmissionId::new(id),
        template_id: TemplateId::new(template_id),
        template_version: TemplateVersion::new(version),
        user_id: user_id.map(UserId::new),
        email,
        responses,
        metadata,
        created_at: Timestamp::from_unix_millis(created_at),
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a value into a JSON column.
fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|err| StoreError::Invalid(err.to_string()))
}

/// Escapes LIKE wildcards in a user-supplied needle.
fn escape_like(needle: &str) -> String {
    needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS form_templates (
                    template_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    service_id TEXT,
                    fields_json TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    active INTEGER NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS form_submissions (
                    submission_id TEXT PRIMARY KEY,
                    template_id TEXT NOT NULL,
                    template_version INTEGER NOT NULL,
                    user_id TEXT,
                    email TEXT,
                    responses_json TEXT NOT NULL,
                    metadata_json TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    FOREIGN KEY (template_id) REFERENCES form_templates(template_id)
                );
                CREATE INDEX IF NOT EXISTS idx_form_submissions_user_window
                    ON form_submissions (template_id, user_id, created_at);
                CREATE INDEX IF NOT EXISTS idx_form_submissions_email_window
                    ON form_submissions (template_id, email, created_at);
                CREATE TABLE IF NOT EXISTS services (
                    service_id TEXT PRIMARY KEY,
                    name TEXT NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
