// crates/formgate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Formgate Interfaces
// Description: Backend-agnostic interfaces for storage, directory, and abuse checks.
// Purpose: Define the contract surfaces used by the Formgate engine.
// Dependencies: crate::core, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Formgate integrates with external systems without
//! embedding backend-specific details. Durable state lives behind the store
//! traits; anti-abuse verification and notification delivery participate only
//! through the narrow outcome types defined here. All calls are asynchronous
//! and may suspend the calling task while awaiting I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::FieldSpec;
use crate::core::FormSubmission;
use crate::core::FormTemplate;
use crate::core::NewSubmission;
use crate::core::ServiceId;
use crate::core::SubmissionId;
use crate::core::SubmissionIdentity;
use crate::core::TemplateId;
use crate::core::TemplateVersion;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Default page size for submission listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Maximum page size for submission listings.
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

/// Clamped page/limit pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Page size, clamped to [`MAX_PAGE_LIMIT`].
    pub limit: u32,
    /// Sort direction over creation time.
    #[serde(default)]
    pub order: SortOrder,
}

impl Pagination {
    /// Builds a pagination input from raw query values, clamping to bounds.
    #[must_use]
    pub fn from_raw(page: Option<u32>, limit: Option<u32>, order: SortOrder) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            order,
        }
    }

    /// Returns the number of records to skip.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page as u64).saturating_sub(1).saturating_mul(self.limit as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::from_raw(None, None, SortOrder::Desc)
    }
}

/// One page of submissions plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPage {
    /// Page items in the requested order.
    pub items: Vec<FormSubmission>,
    /// 1-based page number served.
    pub page: u32,
    /// Page size served.
    pub limit: u32,
    /// Total matching records.
    pub total: u64,
    /// Total pages (at least 1).
    pub total_pages: u64,
}

impl SubmissionPage {
    /// Builds a page from items and the total match count.
    #[must_use]
    pub fn new(items: Vec<FormSubmission>, pagination: &Pagination, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(pagination.limit).max(1)).max(1);
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages,
        }
    }
}

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Filter for template listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFilter {
    /// Restrict to templates with a matching active flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Filter for submission listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFilter {
    /// Restrict to one template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    /// Case-insensitive email substring match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_contains: Option<String>,
    /// Inclusive lower bound on creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<Timestamp>,
    /// Inclusive upper bound on creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<Timestamp>,
}

// ============================================================================
// SECTION: Store Inputs
// ============================================================================

/// Validated template content handed to [`TemplateStore::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    /// Display name, already trimmed.
    pub name: String,
    /// Optional description, already trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional service reference, already resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    /// Normalized field specifications.
    pub fields: Vec<FieldSpec>,
    /// Initial version (always 1 for creation).
    pub version: TemplateVersion,
    /// Whether the template starts active.
    pub active: bool,
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Store errors shared by template and submission stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("form store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("form store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("form store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("form store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("form store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Template Store
// ============================================================================

/// Durable store for form templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Finds a template by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn find(&self, id: &TemplateId) -> Result<Option<FormTemplate>, StoreError>;

    /// Lists templates matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing fails.
    async fn list(&self, filter: TemplateFilter) -> Result<Vec<FormTemplate>, StoreError>;

    /// Persists a new template and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    async fn create(
        &self,
        template: NewTemplate,
        now: Timestamp,
    ) -> Result<FormTemplate, StoreError>;

    /// Persists a full template snapshot and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the template is absent.
    async fn update(&self, template: &FormTemplate) -> Result<FormTemplate, StoreError>;

    /// Counts submissions referencing the template.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the count fails.
    async fn count_submissions(&self, id: &TemplateId) -> Result<u64, StoreError>;
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Durable store for form submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Finds the most recent submission for the template and identity at or
    /// after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn find_recent(
        &self,
        template_id: &TemplateId,
        identity: &SubmissionIdentity,
        since: Timestamp,
    ) -> Result<Option<FormSubmission>, StoreError>;

    /// Persists a new submission and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    async fn create(
        &self,
        submission: NewSubmission,
        now: Timestamp,
    ) -> Result<FormSubmission, StoreError>;

    /// Lists submissions matching the filter with pagination.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing fails.
    async fn list(
        &self,
        filter: &SubmissionFilter,
        pagination: &Pagination,
    ) -> Result<SubmissionPage, StoreError>;

    /// Finds a submission by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get(&self, id: &SubmissionId) -> Result<Option<FormSubmission>, StoreError>;
}

// ============================================================================
// SECTION: Service Directory
// ============================================================================

/// Service directory lookup errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Directory lookup failed.
    #[error("service directory error: {0}")]
    Lookup(String),
}

/// Directory of external service entities templates may reference.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Returns true when the service identifier resolves.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    async fn exists(&self, service_id: &ServiceId) -> Result<bool, DirectoryError>;
}

// ============================================================================
// SECTION: Anti-Abuse Verifier
// ============================================================================

/// Outcome of an anti-abuse verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntiAbuseOutcome {
    /// Whether the submission is allowed to proceed.
    pub accepted: bool,
    /// Verifier score in [0, 1].
    pub score: f64,
    /// Optional verifier action label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl AntiAbuseOutcome {
    /// Outcome for verifiers running in bypass mode.
    #[must_use]
    pub fn bypass() -> Self {
        Self {
            accepted: true,
            score: 1.0,
            action: Some("bypass".to_string()),
        }
    }

    /// Rejection outcome with a zero score.
    #[must_use]
    pub const fn rejected() -> Self {
        Self {
            accepted: false,
            score: 0.0,
            action: None,
        }
    }
}

/// Anti-abuse verifier consulted once per public submission.
///
/// Verification is a decision input, never a process failure: transport
/// errors and timeouts must be mapped to a rejected outcome by the
/// implementation.
#[async_trait]
pub trait AntiAbuseVerifier: Send + Sync {
    /// Verifies a submission token for the given client address.
    async fn verify(&self, token: &str, client_ip: Option<&str>) -> AntiAbuseOutcome;
}

// ============================================================================
// SECTION: Notification Sender
// ============================================================================

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Delivery failed.
    #[error("notification send failed: {0}")]
    Send(String),
}

/// Per-audience delivery flags for a submission notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    /// Whether the visitor confirmation was sent.
    pub visitor_sent: bool,
    /// Whether the administrator alert was sent.
    pub admin_sent: bool,
}

/// Best-effort notification sender invoked after a submission is stored.
///
/// Failures are logged by the engine and reported as unsent flags; they never
/// roll back the submission.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends submission notifications and reports per-audience outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails outright.
    async fn notify(
        &self,
        submission: &FormSubmission,
        template: &FormTemplate,
    ) -> Result<NotificationOutcome, NotificationError>;
}
